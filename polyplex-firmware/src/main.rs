//! Polyplex - 16-channel relay multiplexer firmware
//!
//! Main firmware binary for RP2040-based relay boards. One serial line
//! in, sixteen switched output channels out: the host enables, disables,
//! and queries channels with single-character commands, and an
//! inactivity watchdog returns the board to its compiled-in defaults if
//! the host goes silent.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{AnyPin, Level, Output};
use embassy_rp::peripherals::{UART0, UART1};
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use polyplex_core::registry;

use crate::relays::RelayBank;

mod channels;
mod relays;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
    UART1_IRQ => BufferedInterruptHandler<UART1>;
});

/// Host link baud rate
const BAUD_RATE: u32 = 9600;

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();

fn level(on: bool) -> Level {
    if on {
        Level::High
    } else {
        Level::Low
    }
}

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Polyplex firmware starting...");

    // Initialize RP2040 peripherals
    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // Relay outputs in registry channel order, brought up at their
    // compiled-in default levels
    let defaults = registry::default_states();
    let outputs = [
        Output::new(AnyPin::from(p.PIN_14), level(defaults[0])),
        Output::new(AnyPin::from(p.PIN_15), level(defaults[1])),
        Output::new(AnyPin::from(p.PIN_16), level(defaults[2])),
        Output::new(AnyPin::from(p.PIN_17), level(defaults[3])),
        Output::new(AnyPin::from(p.PIN_18), level(defaults[4])),
        Output::new(AnyPin::from(p.PIN_19), level(defaults[5])),
        Output::new(AnyPin::from(p.PIN_12), level(defaults[6])),
        Output::new(AnyPin::from(p.PIN_13), level(defaults[7])),
        Output::new(AnyPin::from(p.PIN_4), level(defaults[8])),
        Output::new(AnyPin::from(p.PIN_5), level(defaults[9])),
        Output::new(AnyPin::from(p.PIN_6), level(defaults[10])),
        Output::new(AnyPin::from(p.PIN_7), level(defaults[11])),
        Output::new(AnyPin::from(p.PIN_8), level(defaults[12])),
        Output::new(AnyPin::from(p.PIN_9), level(defaults[13])),
        Output::new(AnyPin::from(p.PIN_10), level(defaults[14])),
        Output::new(AnyPin::from(p.PIN_11), level(defaults[15])),
    ];
    let bank = RelayBank::new(registry::pins(), outputs);
    info!("Relay outputs initialized");

    // Setup UART for the host link
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = BAUD_RATE;

    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 256]);

    // Serial header wiring differs between board revisions; the
    // legacy-pins feature selects the first-revision routing
    #[cfg(not(feature = "legacy-pins"))]
    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    #[cfg(feature = "legacy-pins")]
    let uart = Uart::new_blocking(p.UART1, p.PIN_20, p.PIN_21, uart_config);

    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();
    info!("UART initialized for host communication");

    // Spawn tasks
    spawner.spawn(tasks::mux_task(rx, bank)).unwrap();
    spawner.spawn(tasks::report_tx_task(tx)).unwrap();

    info!("All tasks spawned, firmware running");

    // Main task has nothing else to do - all work happens in spawned tasks
    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}
