//! Serial command protocol for the Polyplex relay multiplexer
//!
//! This crate defines the line-oriented protocol between a controlling host
//! and the multiplexer board. The protocol is designed for simplicity and
//! robustness against a noisy line: one command per line, terminated by
//! `\n`, malformed input dropped without taking the device down.
//!
//! # Protocol Overview
//!
//! ```text
//! ┌──────┬──────────────────────────┬──────────┐
//! │ char │ meaning                  │ argument │
//! ├──────┼──────────────────────────┼──────────┤
//! │ 'E'  │ enable channel           │ 0-15     │
//! │ 'D'  │ disable channel          │ 0-15     │
//! │ 'P'  │ hold / keepalive         │ 0-15     │
//! │ 'Q'  │ query full channel state │ none     │
//! │ 'R'  │ reset to defaults        │ none     │
//! └──────┴──────────────────────────┴──────────┘
//! ```
//!
//! Channel arguments are ASCII decimal. The status report sent back to the
//! host is a single line of sixteen space-separated `0`/`1` digits.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod command;
pub mod line;
pub mod report;

pub use command::{Command, CommandError, CHANNEL_COUNT};
pub use line::{Line, LineReader, MAX_LINE_LEN, TERMINATOR};
pub use report::{encode_status, parse_status, MAX_REPORT_LEN};
