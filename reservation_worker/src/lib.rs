//! # Reservation payment worker
//!
//! The daemon that keeps reservations and their PIX charges in agreement. It wires the SQLite
//! reservation store, the PIX provider client, and the Telegram notification sink into a
//! [`reservation_engine::ReconciliationEngine`] and runs reconciliation passes on a timer. With
//! `--once` it runs a single pass, flushes pending notifications, and exits.
//!
//! ## Configuration
//! The worker is configured via environment variables. See [config](config/index.html) for more
//! information.
pub mod cli;
pub mod config;
pub mod errors;
pub mod integrations;
pub mod worker;
