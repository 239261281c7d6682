//! Terminator-delimited line accumulation.
//!
//! Commands arrive as arbitrary bytes framed by a single terminator byte
//! (`\n`). The [`LineReader`] collects bytes into a bounded buffer and
//! hands back one complete line at a time. A frame that outgrows the
//! buffer is discarded in full rather than wrapping or truncating.

use heapless::Vec;

use crate::command::CommandError;

/// Frame terminator byte
pub const TERMINATOR: u8 = b'\n';

/// Maximum length of a single command frame in bytes
pub const MAX_LINE_LEN: usize = 256;

/// A complete, terminator-stripped command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    bytes: Vec<u8, MAX_LINE_LEN>,
}

impl Line {
    /// The line contents, without the terminator
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Length of the line in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the line holds no bytes
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Accumulator for incoming command frames
///
/// Holds at most one unterminated frame. Overflow discards the frame:
/// the error is reported once, and the remaining bytes of the oversized
/// frame are skipped up to the next terminator so the reader resyncs on
/// a frame boundary.
#[derive(Debug, Clone, Default)]
pub struct LineReader {
    buffer: Vec<u8, MAX_LINE_LEN>,
    skip_to_terminator: bool,
}

impl LineReader {
    /// Create a new, empty line reader
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            skip_to_terminator: false,
        }
    }

    /// Discard any partial frame and return to a clean state
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.skip_to_terminator = false;
    }

    /// Feed a single byte to the reader
    ///
    /// Returns `Ok(Some(line))` when a terminator completes a non-empty
    /// frame, `Ok(None)` when more bytes are needed, or
    /// `Err(CommandError::BufferOverflow)` once when a frame exceeds
    /// [`MAX_LINE_LEN`] without a terminator.
    ///
    /// A trailing `\r` is stripped (hosts commonly send CRLF) and a bare
    /// terminator is skipped without producing a line.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Line>, CommandError> {
        if self.skip_to_terminator {
            if byte == TERMINATOR {
                self.skip_to_terminator = false;
            }
            return Ok(None);
        }

        if byte == TERMINATOR {
            let mut bytes = core::mem::take(&mut self.buffer);
            if bytes.last() == Some(&b'\r') {
                bytes.pop();
            }
            if bytes.is_empty() {
                return Ok(None);
            }
            return Ok(Some(Line { bytes }));
        }

        if self.buffer.push(byte).is_err() {
            self.buffer.clear();
            self.skip_to_terminator = true;
            return Err(CommandError::BufferOverflow);
        }

        Ok(None)
    }

    /// Feed multiple bytes to the reader
    ///
    /// Returns the first complete line found, if any.
    /// Remaining bytes after a complete line are not consumed.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Result<Option<Line>, CommandError> {
        for &byte in bytes {
            if let Some(line) = self.feed(byte)? {
                return Ok(Some(line));
            }
        }
        Ok(None)
    }
}
