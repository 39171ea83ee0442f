//! # Interface contracts between the engine and its collaborators.
//!
//! ## Storage
//! [`ReservationStore`] is the persistence seam. Beyond plain queries it exposes three *guarded*
//! transitions (attach a transaction id, mark paid, cancel) whose precondition check and write
//! must be a single atomic step. That atomicity is what serialises concurrent mutation of a
//! reservation: when two passes race, exactly one guard succeeds and the loser observes a
//! refusal instead of overwriting state.
//!
//! ## The provider
//! [`ChargeGateway`] is the outbound seam to the payment provider. The engine only ever needs two
//! operations: create a charge (with its payable payload) and poll a charge's status. Concrete
//! adapters wrap the real client; tests script the trait directly.
mod charge_gateway;
mod reservation_store;

pub use charge_gateway::{ChargeCreation, ChargeGateway, ChargeGatewayError, ChargeStatus};
pub use reservation_store::{ReservationStore, StoreError};
