//! Multiplexer engine
//!
//! Owns the mutable per-channel state, the receive buffer, and the
//! inactivity watchdog. Consumes bytes from the transport, interprets
//! terminator-delimited commands, drives the relay outputs through a
//! [`RelayDriver`], and raises the dirty flag for the reporting layer.
//!
//! All state lives in one explicitly constructed instance; the engine is
//! driven from a single control loop and never blocks.

use polyplex_protocol::{Command, CommandError, LineReader, CHANNEL_COUNT};

use crate::registry;
use crate::traits::RelayDriver;
use crate::watchdog::ActivityWatchdog;

/// Channel state machine and command dispatcher
#[derive(Debug, Clone)]
pub struct Multiplexer {
    /// Current boolean state per channel
    states: [bool; CHANNEL_COUNT],
    /// Receive-side frame accumulator
    reader: LineReader,
    /// Host inactivity tracking
    watchdog: ActivityWatchdog,
    /// Any channel changed since the reporting layer last acknowledged
    dirty: bool,
}

impl Multiplexer {
    /// Create an engine with every channel at its compiled-in default
    ///
    /// `now_ms` seeds the activity clock so the watchdog window starts
    /// at construction, not at the epoch.
    pub fn new(now_ms: u64) -> Self {
        Self {
            states: registry::default_states(),
            reader: LineReader::new(),
            watchdog: ActivityWatchdog::new(now_ms),
            dirty: false,
        }
    }

    /// Assert every channel's current state once
    ///
    /// Boot-time synchronization: the outputs come up in an arbitrary
    /// level until driven, so the caller runs this once after hardware
    /// init. Leaves the dirty flag untouched.
    pub fn apply_all<D: RelayDriver>(&self, driver: &mut D) {
        let pins = registry::pins();
        for (index, &on) in self.states.iter().enumerate() {
            driver.set_state(pins[index], on);
        }
    }

    /// Feed one byte from the transport
    ///
    /// Non-blocking and bounded: either the byte is buffered, or a
    /// terminator completes a frame which is parsed and dispatched in
    /// one step. Returns the accepted command (so the control loop can
    /// react to [`Command::Query`]), `Ok(None)` while a frame is still
    /// accumulating, or the protocol error for a rejected frame.
    ///
    /// Only accepted frames refresh the watchdog's activity clock.
    pub fn on_byte<D: RelayDriver>(
        &mut self,
        byte: u8,
        now_ms: u64,
        driver: &mut D,
    ) -> Result<Option<Command>, CommandError> {
        let line = match self.reader.feed(byte)? {
            Some(line) => line,
            None => return Ok(None),
        };

        let command = Command::parse(line.as_bytes())?;
        self.dispatch(command, driver)?;
        self.watchdog.record_activity(now_ms);

        Ok(Some(command))
    }

    /// Apply a parsed command to the channel state
    ///
    /// Enable and Disable mutate one channel; Hold and Query mutate
    /// nothing (Hold is the host's keepalive, Query's report is the
    /// caller's side of the contract); Reset restores the default table.
    pub fn dispatch<D: RelayDriver>(
        &mut self,
        command: Command,
        driver: &mut D,
    ) -> Result<(), CommandError> {
        match command {
            Command::Enable(channel) => self.set_channel(channel, true, driver),
            Command::Disable(channel) => self.set_channel(channel, false, driver),
            Command::Hold(_) => Ok(()),
            Command::Query => Ok(()),
            Command::Reset => {
                self.reset_to_defaults(driver);
                Ok(())
            }
        }
    }

    /// Periodic watchdog check
    ///
    /// Call at least as often as the timeout resolution. When the host
    /// has been silent past the timeout this performs the same effect as
    /// a Reset command and returns true, once per silence window.
    pub fn tick<D: RelayDriver>(&mut self, now_ms: u64, driver: &mut D) -> bool {
        if self.watchdog.poll(now_ms) {
            self.reset_to_defaults(driver);
            true
        } else {
            false
        }
    }

    /// Return and clear the dirty flag in one step
    pub fn consume_dirty(&mut self) -> bool {
        let dirty = self.dirty;
        self.dirty = false;
        dirty
    }

    /// Snapshot of all channel states, indexed by channel
    pub fn states(&self) -> &[bool; CHANNEL_COUNT] {
        &self.states
    }

    fn set_channel<D: RelayDriver>(
        &mut self,
        channel: u8,
        on: bool,
        driver: &mut D,
    ) -> Result<(), CommandError> {
        let pin = registry::pin_for(channel).map_err(|_| CommandError::InvalidChannel)?;
        self.apply(usize::from(channel), pin, on, driver);
        Ok(())
    }

    fn reset_to_defaults<D: RelayDriver>(&mut self, driver: &mut D) {
        let pins = registry::pins();
        let defaults = registry::default_states();
        for index in 0..CHANNEL_COUNT {
            self.apply(index, pins[index], defaults[index], driver);
        }
    }

    /// Set one channel, driving the pin only on an actual change
    fn apply<D: RelayDriver>(&mut self, index: usize, pin: u8, on: bool, driver: &mut D) {
        if self.states[index] != on {
            self.states[index] = on;
            driver.set_state(pin, on);
            self.dirty = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heapless::Vec;

    /// Recording fake for the pin-assert boundary
    struct FakeRelay {
        calls: Vec<(u8, bool), 64>,
    }

    impl FakeRelay {
        fn new() -> Self {
            Self { calls: Vec::new() }
        }

        fn clear(&mut self) {
            self.calls.clear();
        }
    }

    impl RelayDriver for FakeRelay {
        fn set_state(&mut self, pin: u8, on: bool) {
            let _ = self.calls.push((pin, on));
        }
    }

    /// Feed a whole frame, returning the result of the terminating byte
    fn send(
        mux: &mut Multiplexer,
        relay: &mut FakeRelay,
        frame: &[u8],
        now_ms: u64,
    ) -> Result<Option<Command>, CommandError> {
        let mut last = Ok(None);
        for &byte in frame {
            last = mux.on_byte(byte, now_ms, relay);
        }
        last
    }

    #[test]
    fn test_boot_state_is_default_table() {
        let mux = Multiplexer::new(0);
        assert_eq!(mux.states(), &registry::default_states());
    }

    #[test]
    fn test_enable_and_disable_every_channel() {
        let mut mux = Multiplexer::new(0);
        let mut relay = FakeRelay::new();

        for channel in 0..CHANNEL_COUNT as u8 {
            let cmd = send(&mut mux, &mut relay, &Command::Enable(channel).encode(), 0);
            assert_eq!(cmd, Ok(Some(Command::Enable(channel))));
            assert!(mux.states()[usize::from(channel)]);
        }

        for channel in 0..CHANNEL_COUNT as u8 {
            send(&mut mux, &mut relay, &Command::Disable(channel).encode(), 0).unwrap();
            assert!(!mux.states()[usize::from(channel)]);
        }
    }

    #[test]
    fn test_enable_drives_mapped_pin() {
        let mut mux = Multiplexer::new(0);
        let mut relay = FakeRelay::new();

        send(&mut mux, &mut relay, b"E0\n", 0).unwrap();
        assert_eq!(&relay.calls[..], &[(14, true)]);

        relay.clear();
        send(&mut mux, &mut relay, b"D0\n", 0).unwrap();
        assert_eq!(&relay.calls[..], &[(14, false)]);
    }

    #[test]
    fn test_hold_never_changes_state() {
        let mut mux = Multiplexer::new(0);
        let mut relay = FakeRelay::new();

        // Against the default (off) value and against an enabled one
        let before = *mux.states();
        send(&mut mux, &mut relay, b"P3\n", 0).unwrap();
        assert_eq!(mux.states(), &before);
        assert!(relay.calls.is_empty());
        assert!(!mux.consume_dirty());

        send(&mut mux, &mut relay, b"E3\n", 0).unwrap();
        relay.clear();
        mux.consume_dirty();

        send(&mut mux, &mut relay, b"P3\n", 0).unwrap();
        assert!(mux.states()[3]);
        assert!(relay.calls.is_empty());
        assert!(!mux.consume_dirty());
    }

    #[test]
    fn test_idempotent_enable_single_assert() {
        let mut mux = Multiplexer::new(0);
        let mut relay = FakeRelay::new();

        send(&mut mux, &mut relay, b"E5\n", 0).unwrap();
        send(&mut mux, &mut relay, b"E5\n", 0).unwrap();

        // Exactly one hardware call; the second command is a no-op
        assert_eq!(relay.calls.len(), 1);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut mux = Multiplexer::new(0);
        let mut relay = FakeRelay::new();

        send(&mut mux, &mut relay, b"E0\n", 0).unwrap();
        send(&mut mux, &mut relay, b"E1\n", 0).unwrap();
        send(&mut mux, &mut relay, b"D11\n", 0).unwrap();

        send(&mut mux, &mut relay, b"R\n", 0).unwrap();
        assert_eq!(mux.states(), &registry::default_states());
    }

    #[test]
    fn test_reset_only_drives_changed_channels() {
        let mut mux = Multiplexer::new(0);
        let mut relay = FakeRelay::new();

        send(&mut mux, &mut relay, b"E0\n", 0).unwrap();
        relay.clear();

        send(&mut mux, &mut relay, b"R\n", 0).unwrap();
        // Only channel 0 differed from its default
        assert_eq!(&relay.calls[..], &[(14, false)]);
    }

    #[test]
    fn test_unknown_command_leaves_state_unchanged() {
        let mut mux = Multiplexer::new(0);
        let mut relay = FakeRelay::new();

        let before = *mux.states();
        assert_eq!(
            send(&mut mux, &mut relay, b"Z\n", 0),
            Err(CommandError::UnknownCommand)
        );
        assert_eq!(mux.states(), &before);
        assert!(relay.calls.is_empty());
        assert!(!mux.consume_dirty());
    }

    #[test]
    fn test_invalid_channel_discards_single_command() {
        let mut mux = Multiplexer::new(0);
        let mut relay = FakeRelay::new();

        assert_eq!(
            send(&mut mux, &mut relay, b"E16\n", 0),
            Err(CommandError::InvalidChannel)
        );
        assert_eq!(mux.states(), &registry::default_states());

        // Other channels are unaffected and the next command works
        send(&mut mux, &mut relay, b"E2\n", 0).unwrap();
        assert!(mux.states()[2]);
    }

    #[test]
    fn test_overflow_recovers_to_next_frame() {
        let mut mux = Multiplexer::new(0);
        let mut relay = FakeRelay::new();

        let mut saw_overflow = false;
        for _ in 0..400 {
            if mux.on_byte(b'x', 0, &mut relay) == Err(CommandError::BufferOverflow) {
                saw_overflow = true;
            }
        }
        assert!(saw_overflow);
        assert_eq!(mux.states(), &registry::default_states());

        // Terminate the oversized frame, then a clean command applies
        mux.on_byte(b'\n', 0, &mut relay).unwrap();
        send(&mut mux, &mut relay, b"E7\n", 0).unwrap();
        assert!(mux.states()[7]);
    }

    #[test]
    fn test_query_mutates_nothing() {
        let mut mux = Multiplexer::new(0);
        let mut relay = FakeRelay::new();

        let before = *mux.states();
        let cmd = send(&mut mux, &mut relay, b"Q\n", 0);
        assert_eq!(cmd, Ok(Some(Command::Query)));
        assert_eq!(mux.states(), &before);
        assert!(relay.calls.is_empty());
        assert!(!mux.consume_dirty());
    }

    #[test]
    fn test_watchdog_resets_once_per_silence_window() {
        use crate::watchdog::TIMEOUT_DELAY_MS;

        let mut mux = Multiplexer::new(0);
        let mut relay = FakeRelay::new();

        send(&mut mux, &mut relay, b"E0\n", 100).unwrap();
        relay.clear();
        mux.consume_dirty();

        // Not yet expired
        assert!(!mux.tick(100 + TIMEOUT_DELAY_MS - 1, &mut relay));
        assert!(mux.states()[0]);

        // Expired: same observable effect as Reset, exactly once
        assert!(mux.tick(100 + TIMEOUT_DELAY_MS, &mut relay));
        assert_eq!(mux.states(), &registry::default_states());
        assert_eq!(&relay.calls[..], &[(14, false)]);
        assert!(mux.consume_dirty());

        // Continued silence does not refire within the same window
        relay.clear();
        assert!(!mux.tick(100 + TIMEOUT_DELAY_MS + 200, &mut relay));
        assert!(relay.calls.is_empty());
    }

    #[test]
    fn test_accepted_commands_defer_watchdog() {
        use crate::watchdog::TIMEOUT_DELAY_MS;

        let mut mux = Multiplexer::new(0);
        let mut relay = FakeRelay::new();

        // A keepalive at t=1000 pushes the window out
        send(&mut mux, &mut relay, b"P0\n", 1000).unwrap();
        assert!(!mux.tick(TIMEOUT_DELAY_MS, &mut relay));
        assert!(!mux.tick(1000 + TIMEOUT_DELAY_MS - 1, &mut relay));
        assert!(mux.tick(1000 + TIMEOUT_DELAY_MS, &mut relay));
    }

    #[test]
    fn test_rejected_frames_do_not_defer_watchdog() {
        use crate::watchdog::TIMEOUT_DELAY_MS;

        let mut mux = Multiplexer::new(0);
        let mut relay = FakeRelay::new();

        // Garbage at t=1400 is not an accepted command
        let _ = send(&mut mux, &mut relay, b"Z\n", 1400);
        assert!(mux.tick(TIMEOUT_DELAY_MS, &mut relay));
    }

    #[test]
    fn test_apply_all_drives_every_pin_without_dirty() {
        let mux = Multiplexer::new(0);
        let mut relay = FakeRelay::new();

        mux.apply_all(&mut relay);
        assert_eq!(relay.calls.len(), CHANNEL_COUNT);

        let pins = registry::pins();
        let defaults = registry::default_states();
        for (index, &(pin, on)) in relay.calls.iter().enumerate() {
            assert_eq!(pin, pins[index]);
            assert_eq!(on, defaults[index]);
        }
    }

    #[test]
    fn test_host_session_scenario() {
        // Defaults: [F,F,F,F,F,F,F,F,F,F,F,T,T,F,T,F]
        let mut mux = Multiplexer::new(0);
        let mut relay = FakeRelay::new();

        send(&mut mux, &mut relay, b"E0\n", 0).unwrap();
        assert!(mux.states()[0]);
        assert!(mux.consume_dirty());
        assert!(!mux.consume_dirty());

        send(&mut mux, &mut relay, b"D11\n", 0).unwrap();
        assert!(!mux.states()[11]);
        assert!(mux.consume_dirty());

        send(&mut mux, &mut relay, b"R\n", 0).unwrap();
        assert_eq!(mux.states(), &registry::default_states());
        assert!(mux.consume_dirty());
        assert!(!mux.consume_dirty());
    }
}
