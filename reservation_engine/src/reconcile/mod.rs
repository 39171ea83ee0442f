//! The reconciliation state machine for unpaid reservations.
//!
//! A reservation moves through a small, one-way state space:
//!
//! ```text
//!   unpaid, no charge ──attach──► unpaid, charge pending ──confirm──► paid
//!          │                              │
//!          └──────────── expire ──────────┴───────────────────────► canceled
//! ```
//!
//! [`ReconciliationEngine::reconcile`] drives one pass over every open reservation: it polls the
//! provider for reservations that have a charge, settles the ones whose charge completed, and
//! cancels any reservation that has been unpaid for longer than the configured threshold. Each
//! reservation is handled independently; one provider failure never aborts the pass.
mod engine;
mod report;

pub use engine::{
    cancellation_note,
    ConfirmOutcome,
    EngineError,
    ReconcileConfig,
    ReconciliationEngine,
    DEFAULT_UNPAID_TIMEOUT,
};
pub use report::{ReconcileFailure, ReconcileReport};
