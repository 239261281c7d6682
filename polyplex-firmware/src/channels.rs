//! Inter-task communication channels
//!
//! Defines the static signals used for communication between Embassy
//! tasks. Uses embassy-sync primitives for safe async communication.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

use polyplex_protocol::CHANNEL_COUNT;

/// State snapshot for the report task
///
/// Signaled by the mux task on a Query command or a dirty-flag
/// transition; a newer snapshot overwrites an unsent one, so the host
/// always receives the latest state.
pub static REPORT: Signal<CriticalSectionRawMutex, [bool; CHANNEL_COUNT]> = Signal::new();
