//! Status report encoding.
//!
//! The report sent back to the host is one line: the sixteen channel
//! states as `0`/`1` digits, space-separated, newline-terminated. Hosts
//! split the line on whitespace, so the exact spacing is part of the
//! contract.

use heapless::Vec;

use crate::command::CHANNEL_COUNT;
use crate::line::TERMINATOR;

/// Encoded report size: one digit per channel, separators, terminator
pub const MAX_REPORT_LEN: usize = 2 * CHANNEL_COUNT;

/// Encode the channel states as a terminated report line
pub fn encode_status(states: &[bool; CHANNEL_COUNT]) -> Vec<u8, MAX_REPORT_LEN> {
    let mut out = Vec::new();

    // Pushes cannot fail: capacity is sized for 16 digits + 15 separators
    // + terminator
    for (i, &on) in states.iter().enumerate() {
        if i > 0 {
            let _ = out.push(b' ');
        }
        let _ = out.push(if on { b'1' } else { b'0' });
    }
    let _ = out.push(TERMINATOR);

    out
}

/// Parse a report line back into channel states (for host-side tooling
/// or simulation)
///
/// Accepts the terminator-stripped line. Returns `None` if the line does
/// not hold exactly [`CHANNEL_COUNT`] `0`/`1` fields.
pub fn parse_status(line: &[u8]) -> Option<[bool; CHANNEL_COUNT]> {
    let mut states = [false; CHANNEL_COUNT];
    let mut count = 0;

    for field in line.split(|&b| b == b' ').filter(|f| !f.is_empty()) {
        if count == CHANNEL_COUNT {
            return None;
        }
        states[count] = match field {
            b"0" => false,
            b"1" => true,
            _ => return None,
        };
        count += 1;
    }

    if count == CHANNEL_COUNT {
        Some(states)
    } else {
        None
    }
}
