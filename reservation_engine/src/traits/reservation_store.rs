use thiserror::Error;

use crate::db_types::{Reservation, ReservationId};

/// Persistence contract for the reservation records the payment flow touches.
///
/// The three guarded operations re-check their precondition and perform their write in one atomic
/// step. The SQLite backend does this with single-statement conditional updates; any other
/// backend must provide the same guarantee (row locks, compare-and-set, or similar), otherwise
/// overlapping reconciliation passes can double-process a reservation.
#[allow(async_fn_in_trait)]
pub trait ReservationStore: Clone {
    /// All reservations still awaiting payment (`paid` and `canceled` both false), oldest first.
    async fn fetch_unpaid(&self) -> Result<Vec<Reservation>, StoreError>;

    /// Looks a reservation up by the provider's transaction id.
    async fn fetch_by_transaction_id(&self, txid: &str) -> Result<Option<Reservation>, StoreError>;

    /// Inserts the record, or replaces the stored copy if the id already exists. Collaborators
    /// that create reservations use this; the reconciliation flow itself only mutates through
    /// the guarded operations below.
    async fn save(&self, reservation: &Reservation) -> Result<Reservation, StoreError>;

    /// Records the provider transaction id on a reservation that is open and has no transaction
    /// id yet. The guard failures are split out so callers can tell an unknown id
    /// ([`StoreError::ReservationNotFound`]) from a repeat charge
    /// ([`StoreError::TransactionAlreadySet`]) from a reservation that has since been settled or
    /// canceled ([`StoreError::ReservationClosed`]).
    async fn attach_transaction_id(&self, id: &ReservationId, txid: &str) -> Result<Reservation, StoreError>;

    /// Marks the reservation paid iff it is still unpaid and not canceled. Returns the updated
    /// record, or `None` when the guard no longer holds because someone else settled or canceled
    /// it first.
    async fn mark_paid(&self, id: &ReservationId) -> Result<Option<Reservation>, StoreError>;

    /// Cancels the reservation iff it is still unpaid and not canceled, appending `note` to its
    /// observation in the same atomic step. Returns the updated record, or `None` when the guard
    /// no longer holds.
    async fn cancel(&self, id: &ReservationId, note: &str) -> Result<Option<Reservation>, StoreError>;
}

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("The reservation store backend failed: {0}")]
    DatabaseError(String),
    #[error("The requested reservation {0} does not exist")]
    ReservationNotFound(ReservationId),
    #[error("Reservation {0} already has a transaction id attached")]
    TransactionAlreadySet(ReservationId),
    #[error("Reservation {0} is already settled or canceled")]
    ReservationClosed(ReservationId),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::DatabaseError(e.to_string())
    }
}
