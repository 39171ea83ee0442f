use std::{process::ExitCode, sync::Arc, time::Duration};

use dotenvy::dotenv;
use log::*;
use pix_tools::PixApi;
use reservation_engine::{
    notify::{channel, LogSink, DEFAULT_NOTIFY_BUFFER},
    ReconciliationEngine,
    SqliteReservationStore,
};
use reservation_worker::{
    cli::{display_help, parse_run_mode, RunMode},
    config::WorkerConfig,
    errors::WorkerError,
    integrations::{pix::PixChargeGateway, telegram::TelegramSink},
    worker::{run_pass, start_reconcile_worker},
};

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    env_logger::init();
    let mode = parse_run_mode();
    if mode == RunMode::Help {
        display_help();
        return ExitCode::SUCCESS;
    }
    let config = WorkerConfig::from_env_or_default();
    match run(config, mode == RunMode::Once).await {
        Ok(()) => {
            println!("Bye!");
            ExitCode::SUCCESS
        },
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        },
    }
}

async fn run(config: WorkerConfig, once: bool) -> Result<(), WorkerError> {
    let store = SqliteReservationStore::new_with_url(&config.database_url, 25)
        .await
        .map_err(|e| WorkerError::InitializeError(format!("Could not open the reservation store. {e}")))?;
    info!("🚀️ Reservation store ready at {}", store.url());
    let api = PixApi::new(config.pix.clone())
        .map_err(|e| WorkerError::InitializeError(format!("Could not initialize the PIX client. {e}")))?;
    let gateway = PixChargeGateway::new(api);
    let (notifier, mut dispatcher) = channel(DEFAULT_NOTIFY_BUFFER, config.recipients.clone());
    dispatcher.attach_sink(Arc::new(LogSink));
    if config.telegram.is_configured() {
        dispatcher.attach_sink(Arc::new(TelegramSink::new(config.telegram.clone())?));
        info!("🚀️ Telegram notifications on, to {} chat(s)", config.recipients.len());
    } else {
        warn!("🚀️ No Telegram bot token is configured. Notifications will only be written to the log.");
    }
    let dispatcher = tokio::spawn(dispatcher.run());
    let engine = ReconciliationEngine::new(store, gateway, notifier, config.reconcile.clone());
    if once {
        run_pass(&engine).await;
        // Dropping the engine closes the notification channel; the dispatcher drains what is
        // queued and exits.
        drop(engine);
        let _ = dispatcher.await;
        return Ok(());
    }
    let worker = start_reconcile_worker(engine, config.reconcile_interval);
    tokio::signal::ctrl_c().await?;
    info!("🚀️ Shutdown signal received");
    worker.abort();
    if tokio::time::timeout(Duration::from_secs(5), dispatcher).await.is_err() {
        warn!("🚀️ The notification dispatcher did not drain in time");
    }
    Ok(())
}
