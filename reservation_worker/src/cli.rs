use std::{env, env::VarError};

/// There's no real CLI for the worker. A single flag selects one-shot mode; anything else prints
/// the help.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunMode {
    /// Run reconciliation passes on a timer until interrupted.
    Forever,
    /// Run a single reconciliation pass, flush notifications, and exit.
    Once,
    Help,
}

pub fn parse_run_mode() -> RunMode {
    let args = env::args().skip(1).collect::<Vec<String>>();
    if args.is_empty() {
        return RunMode::Forever;
    }
    if args.iter().all(|arg| arg == "--once") {
        return RunMode::Once;
    }
    RunMode::Help
}

pub fn display_help() {
    const README: &str = include_str!("./cli-help.txt");
    println!("\n{README}\n");
    display_envs();
}

fn display_envs() {
    // Be explicit about which envars to print, so as to avoid accidentally exposing secrets
    const DISPLAY_ENVS: [&str; 13] = [
        "RUST_LOG",
        "PRG_DATABASE_URL",
        "PRG_RECONCILE_INTERVAL_SECS",
        "PRG_UNPAID_RESERVATION_TIMEOUT",
        "PRG_PROVIDER_TIMEOUT_SECS",
        "PRG_MAX_IN_FLIGHT",
        "PRG_NOTIFY_RECIPIENTS",
        "PRG_TELEGRAM_API_URL",
        "PRG_TELEGRAM_SILENT",
        "PRG_PIX_BASE_URL",
        "PRG_PIX_CLIENT_ID",
        "PRG_PIX_RECEIVING_KEY",
        "PRG_PIX_IDENTITY_FILE",
    ];

    println!("Current environment values (EXCLUDING variables that contain secrets):");
    DISPLAY_ENVS.iter().for_each(|&name| {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<35} {val:<15}");
    })
}
