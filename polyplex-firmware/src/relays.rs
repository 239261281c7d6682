//! Relay output bank
//!
//! Adapts the core's [`RelayDriver`] boundary onto concrete GPIO
//! outputs. Generic over the embedded-hal pin trait so the bank works
//! with any chip HAL (or a mock in host-side tooling).

use defmt::*;
use embedded_hal::digital::OutputPin;

use polyplex_core::traits::RelayDriver;
use polyplex_protocol::CHANNEL_COUNT;

/// Relay outputs addressed by physical pin number
pub struct RelayBank<P> {
    /// Pin number per slot, matching the registry's channel order
    pins: [u8; CHANNEL_COUNT],
    outputs: [P; CHANNEL_COUNT],
}

impl<P: OutputPin> RelayBank<P> {
    /// Create a bank from pin numbers and their GPIO outputs
    ///
    /// `pins[i]` must be the pin number of `outputs[i]`; the registry's
    /// pin table is the canonical source for the ordering.
    pub fn new(pins: [u8; CHANNEL_COUNT], outputs: [P; CHANNEL_COUNT]) -> Self {
        Self { pins, outputs }
    }
}

impl<P: OutputPin> RelayDriver for RelayBank<P> {
    fn set_state(&mut self, pin: u8, on: bool) {
        let Some(index) = self.pins.iter().position(|&p| p == pin) else {
            warn!("No output registered for pin {}", pin);
            return;
        };

        let result = if on {
            self.outputs[index].set_high()
        } else {
            self.outputs[index].set_low()
        };

        // RP2040 GPIO drives are infallible; other HALs may not be
        if result.is_err() {
            warn!("Failed to drive pin {}", pin);
        }
    }
}
