//! Board-agnostic core logic for the Polyplex relay multiplexer
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Channel registry (pin map and compiled-in default states)
//! - Relay driver trait (the pin-assert boundary)
//! - Inactivity watchdog
//! - Multiplexer engine (channel state machine and command dispatch)

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod engine;
pub mod registry;
pub mod traits;
pub mod watchdog;
