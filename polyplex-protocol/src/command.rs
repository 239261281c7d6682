//! Command alphabet and parsing.
//!
//! A command frame is one command character followed by an optional
//! ASCII-decimal channel argument. Unrecognized input maps to an explicit
//! error rather than undefined fallthrough; the caller decides whether to
//! log or silently drop it.

use heapless::Vec;

use crate::line::TERMINATOR;

/// Number of switchable output channels
pub const CHANNEL_COUNT: usize = 16;

// Command characters
pub const CMD_ENABLE: u8 = b'E';
pub const CMD_DISABLE: u8 = b'D';
pub const CMD_HOLD: u8 = b'P';
pub const CMD_QUERY: u8 = b'Q';
pub const CMD_RESET: u8 = b'R';

/// Longest encoded command: char + two digits + terminator
pub const MAX_COMMAND_LEN: usize = 4;

/// Errors that can occur while framing or parsing a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// Unrecognized command character; frame is discarded
    UnknownCommand,
    /// Channel argument missing, non-numeric, or outside [0, 16)
    InvalidChannel,
    /// Frame exceeded the receive buffer without a terminator
    BufferOverflow,
}

/// A parsed host command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Switch a channel on
    Enable(u8),
    /// Switch a channel off
    Disable(u8),
    /// Keepalive; acknowledged but leaves the channel untouched
    Hold(u8),
    /// Request a full status report
    Query,
    /// Restore every channel to its compiled-in default
    Reset,
}

impl Command {
    /// Parse a command from a terminator-stripped line
    ///
    /// Argument-less commands (`Q`, `R`) inspect only the leading byte;
    /// anything after it is ignored.
    pub fn parse(line: &[u8]) -> Result<Self, CommandError> {
        let (&head, args) = line.split_first().ok_or(CommandError::UnknownCommand)?;

        match head {
            CMD_ENABLE => Ok(Command::Enable(parse_channel(args)?)),
            CMD_DISABLE => Ok(Command::Disable(parse_channel(args)?)),
            CMD_HOLD => Ok(Command::Hold(parse_channel(args)?)),
            CMD_QUERY => Ok(Command::Query),
            CMD_RESET => Ok(Command::Reset),
            _ => Err(CommandError::UnknownCommand),
        }
    }

    /// The channel this command addresses, if it takes one
    pub fn channel(&self) -> Option<u8> {
        match self {
            Command::Enable(ch) | Command::Disable(ch) | Command::Hold(ch) => Some(*ch),
            Command::Query | Command::Reset => None,
        }
    }

    /// Encode this command as a terminated frame (for host-side tooling
    /// or simulation)
    pub fn encode(&self) -> Vec<u8, MAX_COMMAND_LEN> {
        let mut out = Vec::new();

        let (ch, channel) = match self {
            Command::Enable(n) => (CMD_ENABLE, Some(*n)),
            Command::Disable(n) => (CMD_DISABLE, Some(*n)),
            Command::Hold(n) => (CMD_HOLD, Some(*n)),
            Command::Query => (CMD_QUERY, None),
            Command::Reset => (CMD_RESET, None),
        };

        // Pushes cannot fail: capacity covers char + 2 digits + terminator
        let _ = out.push(ch);
        if let Some(n) = channel {
            if n >= 10 {
                let _ = out.push(b'0' + n / 10);
            }
            let _ = out.push(b'0' + n % 10);
        }
        let _ = out.push(TERMINATOR);

        out
    }
}

/// Parse an ASCII-decimal channel index in [0, 16)
fn parse_channel(args: &[u8]) -> Result<u8, CommandError> {
    // Two digits suffice for channels 0-15; longer input cannot be valid
    if args.is_empty() || args.len() > 2 {
        return Err(CommandError::InvalidChannel);
    }

    let mut value: u8 = 0;
    for &byte in args {
        if !byte.is_ascii_digit() {
            return Err(CommandError::InvalidChannel);
        }
        value = value * 10 + (byte - b'0');
    }

    if usize::from(value) >= CHANNEL_COUNT {
        return Err(CommandError::InvalidChannel);
    }

    Ok(value)
}
