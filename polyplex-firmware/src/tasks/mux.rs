//! Multiplexer control task
//!
//! Owns the engine and the relay bank exclusively. Alternates between
//! reading transport bytes and running the watchdog tick, so the
//! polling latency (and the watchdog's timing accuracy) stays bounded.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_rp::gpio::Output;
use embassy_rp::uart::BufferedUartRx;
use embassy_time::{Duration, Instant, Ticker};
use embedded_io_async::Read;

use polyplex_core::engine::Multiplexer;
use polyplex_protocol::Command;

use crate::channels::REPORT;
use crate::relays::RelayBank;

/// Watchdog tick interval in milliseconds
///
/// Must stay well under the 1500 ms inactivity timeout.
pub const TICK_INTERVAL_MS: u64 = 100;

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 64;

/// Mux task - feeds the engine from the UART and runs the watchdog
#[embassy_executor::task]
pub async fn mux_task(mut rx: BufferedUartRx, mut bank: RelayBank<Output<'static>>) {
    info!("Mux task started");

    let mut mux = Multiplexer::new(Instant::now().as_millis());

    // Drive every output to its compiled-in default once at boot
    mux.apply_all(&mut bank);
    info!("Outputs synchronized to defaults");

    let mut ticker = Ticker::every(Duration::from_millis(TICK_INTERVAL_MS));
    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        match select(rx.read(&mut buf), ticker.next()).await {
            Either::First(Ok(n)) if n > 0 => {
                trace!("RX: {} bytes", n);

                let now_ms = Instant::now().as_millis();
                for &byte in &buf[..n] {
                    match mux.on_byte(byte, now_ms, &mut bank) {
                        Ok(Some(Command::Query)) => {
                            debug!("Query received");
                            REPORT.signal(*mux.states());
                        }
                        Ok(Some(command)) => {
                            debug!("Command accepted: {:?}", command);
                        }
                        Ok(None) => {
                            // Frame still accumulating
                        }
                        Err(e) => {
                            warn!("Command rejected: {:?}", e);
                        }
                    }
                }
            }
            Either::First(Ok(_)) => {
                // No bytes read, continue
            }
            Either::First(Err(e)) => {
                warn!("UART read error: {:?}", e);
            }
            Either::Second(()) => {
                let now_ms = Instant::now().as_millis();
                if mux.tick(now_ms, &mut bank) {
                    warn!("Host silent, outputs reset to defaults");
                }
            }
        }

        // Flush state to the host whenever something changed
        if mux.consume_dirty() {
            REPORT.signal(*mux.states());
        }
    }
}
