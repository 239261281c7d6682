//! Inactivity watchdog
//!
//! Guards against a stalled or disconnected host: if no command is
//! accepted for [`TIMEOUT_DELAY_MS`], the engine resets every channel to
//! its compiled-in default so outputs cannot be left in an unintended
//! state indefinitely.

/// Silence tolerated before the watchdog fires, in milliseconds
pub const TIMEOUT_DELAY_MS: u64 = 1500;

/// Tracks time since the last accepted command
///
/// Level-triggered against wall-clock time. Firing refreshes the window,
/// so continued silence fires once per [`TIMEOUT_DELAY_MS`], not on every
/// poll.
#[derive(Debug, Clone)]
pub struct ActivityWatchdog {
    last_activity_ms: u64,
}

impl ActivityWatchdog {
    /// Create a watchdog with the activity clock starting at `now_ms`
    pub fn new(now_ms: u64) -> Self {
        Self {
            last_activity_ms: now_ms,
        }
    }

    /// Record an accepted command
    pub fn record_activity(&mut self, now_ms: u64) {
        self.last_activity_ms = now_ms;
    }

    /// Check for expiry
    ///
    /// Returns true exactly when the silence window has elapsed; the
    /// window is then refreshed to suppress repeated firing.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        if now_ms.saturating_sub(self.last_activity_ms) >= TIMEOUT_DELAY_MS {
            self.last_activity_ms = now_ms;
            true
        } else {
            false
        }
    }
}
