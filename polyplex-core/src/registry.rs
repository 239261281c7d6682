//! Channel registry
//!
//! Static mapping from the sixteen logical channel indices to physical
//! drive pins, plus the compiled-in default state per channel. The tables
//! are fixed at build time; there is no runtime configuration surface.

use polyplex_protocol::CHANNEL_COUNT;

/// Physical drive pin per channel.
///
/// Channels 0-7 are the first relay bank, 8-15 the second. The board
/// routes two contacts per relay position, which is why the pin numbers
/// are not contiguous.
const CHANNEL_PINS: [u8; CHANNEL_COUNT] = [
    14, 15, 16, 17, 18, 19, 12, 13, // bank 1
    4, 5, 6, 7, 8, 9, 10, 11, // bank 2
];

/// Power-on state per channel.
///
/// A handful of channels default to closed so the attached instruments
/// see a defined signal path before the host connects.
const DEFAULT_STATES: [bool; CHANNEL_COUNT] = [
    false, false, false, false, false, false, false, false, // bank 1
    false, false, false, true, true, false, true, false, // bank 2
];

/// Errors from registry lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegistryError {
    /// Channel index outside [0, 16)
    OutOfRange,
}

/// Look up the physical drive pin for a channel
pub fn pin_for(channel: u8) -> Result<u8, RegistryError> {
    CHANNEL_PINS
        .get(usize::from(channel))
        .copied()
        .ok_or(RegistryError::OutOfRange)
}

/// Look up the compiled-in default state for a channel
pub fn default_state_for(channel: u8) -> Result<bool, RegistryError> {
    DEFAULT_STATES
        .get(usize::from(channel))
        .copied()
        .ok_or(RegistryError::OutOfRange)
}

/// The full pin table, indexed by channel
pub fn pins() -> [u8; CHANNEL_COUNT] {
    CHANNEL_PINS
}

/// The full default-state table, indexed by channel
pub fn default_states() -> [bool; CHANNEL_COUNT] {
    DEFAULT_STATES
}
