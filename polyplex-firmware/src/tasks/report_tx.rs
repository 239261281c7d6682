//! Status report transmit task
//!
//! Sends the channel-state report line back to the host.

use defmt::*;
use embassy_rp::uart::BufferedUartTx;
use embedded_io_async::Write;

use polyplex_protocol::encode_status;

use crate::channels::REPORT;

/// Report TX task - writes one status line per snapshot
#[embassy_executor::task]
pub async fn report_tx_task(mut tx: BufferedUartTx) {
    info!("Report TX task started");

    loop {
        let states = REPORT.wait().await;
        let report = encode_status(&states);

        if let Err(e) = tx.write_all(&report).await {
            warn!("Failed to send report: {:?}", e);
            continue;
        }
        if let Err(e) = tx.flush().await {
            warn!("Failed to flush report: {:?}", e);
        }

        trace!("Report sent");
    }
}
