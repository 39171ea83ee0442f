use std::time::Duration;

use log::*;
use reservation_engine::{
    traits::{ChargeGateway, ReservationStore},
    ReconciliationEngine,
    SqliteReservationStore,
};
use tokio::task::JoinHandle;

use crate::integrations::pix::PixChargeGateway;

/// The concrete engine the worker binary drives.
pub type WorkerEngine = ReconciliationEngine<SqliteReservationStore, PixChargeGateway>;

/// Starts the periodic reconciliation worker. Do not await the returned JoinHandle, as it will
/// run indefinitely.
pub fn start_reconcile_worker(engine: WorkerEngine, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(interval);
        info!("⏲️ Reconciliation worker started, with {}s between passes", interval.as_secs());
        loop {
            timer.tick().await;
            run_pass(&engine).await;
        }
    })
}

/// Runs a single reconciliation pass and logs what it did.
pub async fn run_pass<S, G>(engine: &ReconciliationEngine<S, G>)
where
    S: ReservationStore,
    G: ChargeGateway,
{
    info!("⏲️ Running reconciliation pass");
    match engine.reconcile().await {
        Ok(report) => {
            for reservation in &report.paid {
                debug!("⏲️ Paid: {reservation}");
            }
            for reservation in &report.canceled {
                debug!("⏲️ Canceled: {reservation}");
            }
            for failure in &report.errors {
                warn!("⏲️ Failed: {failure}");
            }
            info!("⏲️ Pass finished: {report}");
        },
        Err(e) => {
            error!("⏲️ Could not run the reconciliation pass: {e}");
        },
    }
}
