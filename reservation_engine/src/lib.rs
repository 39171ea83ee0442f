//! Reservation Payment Engine
//!
//! Core library for settling time-slot reservations through PIX charges. A reservation enters the
//! system unpaid; a charge is created for it at the payment provider; and a periodic
//! reconciliation pass either confirms the payment or cancels the reservation once it has been
//! unpaid for too long.
//!
//! The library is divided into three main sections:
//! 1. Storage ([`mod@db_types`] and the [`traits::ReservationStore`] contract, with a SQLite
//!    backend behind the `sqlite` feature). The store's guarded operations are the concurrency
//!    backbone: every state transition re-checks its precondition in the same atomic statement
//!    that performs the write, so two overlapping passes cannot double-settle or double-cancel a
//!    reservation.
//! 2. The reconciliation engine ([`mod@reconcile`]). [`ReconciliationEngine`] is generic over the
//!    store and the [`traits::ChargeGateway`] provider seam, which is what makes the state
//!    machine testable without a live provider.
//! 3. Notifications ([`mod@notify`]). State changes emit fire-and-forget messages onto a bounded
//!    queue; delivery failures are logged and never affect the state transitions themselves.
pub mod db_types;
pub mod notify;
pub mod reconcile;
pub mod traits;

#[cfg(feature = "sqlite")]
mod sqlite;

#[cfg(feature = "sqlite")]
pub use sqlite::{db_url, SqliteReservationStore};
pub use reconcile::{
    ConfirmOutcome,
    EngineError,
    ReconcileConfig,
    ReconcileFailure,
    ReconcileReport,
    ReconciliationEngine,
};
