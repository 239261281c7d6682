//! Relay driver trait
//!
//! The pin-assert boundary: the engine decides *what* level a pin should
//! carry, an implementation of this trait performs the actual drive.

/// Driver for the relay output pins
///
/// Implementations are assumed synchronous and non-failing. The engine
/// only calls this when a channel's logical state actually changes, so
/// implementations need no change detection of their own.
pub trait RelayDriver {
    /// Drive the given physical pin to the given level
    fn set_state(&mut self, pin: u8, on: bool);
}
