use std::fmt::Display;

use crate::{
    db_types::{Reservation, ReservationId},
    reconcile::EngineError,
};

/// What a single reconciliation pass did.
#[derive(Debug, Clone, Default)]
pub struct ReconcileReport {
    /// Reservations visited this pass.
    pub processed: usize,
    /// Reservations confirmed as paid this pass.
    pub paid: Vec<Reservation>,
    /// Reservations canceled for non-payment this pass.
    pub canceled: Vec<Reservation>,
    /// Per-reservation failures. The rest of the pass carried on regardless.
    pub errors: Vec<ReconcileFailure>,
}

impl ReconcileReport {
    pub fn paid_count(&self) -> usize {
        self.paid.len()
    }

    pub fn canceled_count(&self) -> usize {
        self.canceled.len()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Total state changes made during the pass.
    pub fn mutation_count(&self) -> usize {
        self.paid.len() + self.canceled.len()
    }
}

impl Display for ReconcileReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} processed, {} paid, {} canceled, {} error(s)",
            self.processed,
            self.paid_count(),
            self.canceled_count(),
            self.error_count()
        )
    }
}

/// A failure handling one reservation during a pass.
#[derive(Debug, Clone)]
pub struct ReconcileFailure {
    pub reservation_id: ReservationId,
    pub error: EngineError,
}

impl Display for ReconcileFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.reservation_id, self.error)
    }
}
