//! SQLite backend for the reservation store.
mod store_impl;

pub mod db;
pub use db::db_url;
pub use store_impl::SqliteReservationStore;
