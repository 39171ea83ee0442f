use chrono::{DateTime, Duration, Utc};
use futures_util::{stream, StreamExt};
use log::*;
use prg_common::Brl;
use thiserror::Error;

use crate::{
    db_types::{Reservation, ReservationId},
    notify::{Notification, Notifier},
    reconcile::report::{ReconcileFailure, ReconcileReport},
    traits::{ChargeCreation, ChargeGateway, ChargeGatewayError, ChargeStatus, ReservationStore, StoreError},
};

pub const DEFAULT_UNPAID_TIMEOUT: Duration = Duration::minutes(20);

const DEFAULT_PROVIDER_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(15);
const DEFAULT_MAX_IN_FLIGHT: usize = 8;

const PAID_SUBJECT: &str = "Reserva paga";
const CANCELED_SUBJECT: &str = "Reserva cancelada por falta de pagamento";

/// The audit note appended to a reservation's observation when it is canceled for non-payment.
pub fn cancellation_note(minutes: i64) -> String {
    format!(" - Cancelado por falta de pagamento após {minutes} minutos")
}

//--------------------------------------   ReconcileConfig     -------------------------------------------------------
/// Tuning knobs for the reconciliation pass.
#[derive(Debug, Clone)]
pub struct ReconcileConfig {
    /// How long a reservation may remain unpaid before it is canceled. This is the single expiry
    /// threshold for the whole system; deployments that want a tighter window lower it instead
    /// of running a second checker with its own hardcoded limit.
    pub unpaid_timeout: Duration,
    /// Hard deadline on each provider status poll. A poll that misses it leaves its reservation
    /// untouched until the next pass.
    pub provider_timeout: std::time::Duration,
    /// Upper bound on concurrently processed reservations within one pass.
    pub max_in_flight: usize,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            unpaid_timeout: DEFAULT_UNPAID_TIMEOUT,
            provider_timeout: DEFAULT_PROVIDER_TIMEOUT,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
        }
    }
}

//--------------------------------------  ReconciliationEngine -------------------------------------------------------
/// `ReconciliationEngine` drives the unpaid-reservation state machine against the charge
/// provider.
///
/// It is generic over the reservation store and the provider gateway so the flow logic can be
/// exercised against in-memory doubles. All mutation goes through the store's guarded
/// operations, which is what keeps concurrent passes from double-processing a reservation.
pub struct ReconciliationEngine<S, G> {
    store: S,
    charges: G,
    notifier: Notifier,
    config: ReconcileConfig,
}

impl<S, G> ReconciliationEngine<S, G> {
    pub fn new(store: S, charges: G, notifier: Notifier, config: ReconcileConfig) -> Self {
        Self { store, charges, notifier, config }
    }

    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S, G> ReconciliationEngine<S, G>
where
    S: ReservationStore,
    G: ChargeGateway,
{
    /// Runs one reconciliation pass over every unpaid, non-canceled reservation.
    ///
    /// Reservations with a charge are polled (under the configured deadline) and settled when
    /// the provider reports the charge completed. Any reservation unpaid for at least
    /// [`ReconcileConfig::unpaid_timeout`] is canceled with an audit note. Every eligible
    /// reservation is visited exactly once; a failure on one is recorded in the report and the
    /// rest of the pass carries on.
    ///
    /// Only a failure to list the open reservations aborts the pass itself.
    pub async fn reconcile(&self) -> Result<ReconcileReport, StoreError> {
        let now = Utc::now();
        let unpaid = self.store.fetch_unpaid().await?;
        let processed = unpaid.len();
        debug!("🔄️ Reconciling {processed} unpaid reservation(s)");
        let outcomes = stream::iter(unpaid)
            .map(|reservation| self.reconcile_one(reservation, now))
            .buffer_unordered(self.config.max_in_flight.max(1))
            .collect::<Vec<Outcome>>()
            .await;
        let mut report = ReconcileReport { processed, ..ReconcileReport::default() };
        for outcome in outcomes {
            match outcome {
                Outcome::Paid(r) => report.paid.push(r),
                Outcome::Canceled(r) => report.canceled.push(r),
                Outcome::Unchanged => {},
                Outcome::Failed { reservation_id, error } => {
                    report.errors.push(ReconcileFailure { reservation_id, error })
                },
            }
        }
        info!("🔄️ Reconciliation pass complete: {report}");
        Ok(report)
    }

    /// Creates a provider charge for the reservation and records its transaction id.
    ///
    /// The charge only counts as created once the provider has returned both the transaction id
    /// and the payable payload, so a failure anywhere leaves the reservation without a
    /// transaction id and nothing partial is persisted. Attaching fails if the reservation is
    /// unknown, already closed, or already carries a charge; the provider-side charge is left to
    /// lapse on its own in those cases.
    pub async fn request_charge(
        &self,
        id: &ReservationId,
        amount: Brl,
        payer_name: &str,
        payer_tax_id: &str,
    ) -> Result<ChargeCreation, EngineError> {
        let charge = self.charges.create_charge(amount, payer_name, payer_tax_id).await?;
        debug!("🔄️ Charge {} created for reservation {id}", charge.transaction_id);
        match self.store.attach_transaction_id(id, &charge.transaction_id).await {
            Ok(_) => {
                info!("🔄️ Reservation {id} is awaiting payment of {amount} (charge {})", charge.transaction_id);
                Ok(charge)
            },
            Err(e) => {
                error!("🔄️ Charge {} could not be linked to reservation {id}: {e}", charge.transaction_id);
                Err(e.into())
            },
        }
    }

    /// Confirms a payment reported for `txid`, typically on an operator-triggered status check:
    /// verifies the charge with the provider and, when it has completed, marks the matching
    /// reservation as paid.
    pub async fn confirm_payment(&self, txid: &str) -> Result<ConfirmOutcome, EngineError> {
        let status = self.poll_status(txid).await?;
        if !status.completed {
            debug!("🔄️ Charge {txid} is not completed yet (status {})", status.provider_status);
            return Ok(ConfirmOutcome::Pending);
        }
        let reservation = self
            .store
            .fetch_by_transaction_id(txid)
            .await?
            .ok_or_else(|| EngineError::ReservationNotFound(txid.to_string()))?;
        match self.store.mark_paid(&reservation.id).await? {
            Some(updated) => {
                info!("🔄️ Payment for reservation {} confirmed via charge {txid}", updated.id);
                self.notifier.send(Notification::new(PAID_SUBJECT, updated.observation.clone()));
                Ok(ConfirmOutcome::Confirmed(updated))
            },
            None => {
                debug!("🔄️ Charge {txid} belongs to reservation {}, which is no longer open", reservation.id);
                Ok(ConfirmOutcome::AlreadySettled(reservation))
            },
        }
    }

    async fn reconcile_one(&self, reservation: Reservation, now: DateTime<Utc>) -> Outcome {
        if !reservation.is_open() {
            // The unpaid query must not return settled rows; guard anyway so a paid reservation
            // is never polled or expired.
            return Outcome::Unchanged;
        }
        if let Some(txid) = reservation.transaction_id.clone() {
            match self.poll_status(&txid).await {
                Ok(status) if status.completed => return self.settle(&reservation).await,
                Ok(status) => {
                    trace!("🔄️ Charge {txid} still pending (status {})", status.provider_status);
                },
                Err(error) => {
                    // Inconclusive. Expiring on a failed poll could cancel a reservation the
                    // payer has already settled, so leave it for the next pass.
                    warn!("🔄️ Could not determine charge status for {}: {error}", reservation.id);
                    return Outcome::Failed { reservation_id: reservation.id, error };
                },
            }
        }
        self.expire_if_due(&reservation, now).await
    }

    async fn poll_status(&self, txid: &str) -> Result<ChargeStatus, EngineError> {
        match tokio::time::timeout(self.config.provider_timeout, self.charges.charge_status(txid)).await {
            Ok(result) => result.map_err(EngineError::from),
            Err(_) => Err(EngineError::StatusPollTimeout {
                txid: txid.to_string(),
                secs: self.config.provider_timeout.as_secs(),
            }),
        }
    }

    async fn settle(&self, reservation: &Reservation) -> Outcome {
        match self.store.mark_paid(&reservation.id).await {
            Ok(Some(updated)) => {
                info!("🔄️ Reservation {} confirmed as paid", updated.id);
                self.notifier.send(Notification::new(PAID_SUBJECT, updated.observation.clone()));
                Outcome::Paid(updated)
            },
            Ok(None) => {
                // The guard refused: someone settled or canceled it since the pass began. A
                // canceled reservation stays canceled even though the charge completed; flag it
                // loudly since the payer may be owed a refund.
                warn!(
                    "🔄️ Charge for reservation {} completed, but the reservation is no longer open. Leaving it \
                     untouched; the payment may need a manual refund.",
                    reservation.id
                );
                Outcome::Unchanged
            },
            Err(e) => Outcome::Failed { reservation_id: reservation.id.clone(), error: e.into() },
        }
    }

    async fn expire_if_due(&self, reservation: &Reservation, now: DateTime<Utc>) -> Outcome {
        if reservation.age_at(now) < self.config.unpaid_timeout {
            return Outcome::Unchanged;
        }
        let minutes = self.config.unpaid_timeout.num_minutes();
        let note = cancellation_note(minutes);
        match self.store.cancel(&reservation.id, &note).await {
            Ok(Some(updated)) => {
                info!("🔄️ Reservation {} canceled after {minutes} minute(s) without payment", updated.id);
                self.notifier.send(Notification::new(CANCELED_SUBJECT, updated.observation.clone()));
                Outcome::Canceled(updated)
            },
            Ok(None) => Outcome::Unchanged,
            Err(e) => Outcome::Failed { reservation_id: reservation.id.clone(), error: e.into() },
        }
    }
}

/// Result of [`ReconciliationEngine::confirm_payment`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// The provider has not completed the charge yet.
    Pending,
    /// The reservation was marked paid just now.
    Confirmed(Reservation),
    /// The reservation was already paid or canceled; nothing changed.
    AlreadySettled(Reservation),
}

enum Outcome {
    Paid(Reservation),
    Canceled(Reservation),
    Unchanged,
    Failed { reservation_id: ReservationId, error: EngineError },
}

//--------------------------------------     EngineError       -------------------------------------------------------
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Charge(#[from] ChargeGatewayError),
    #[error("Charge status poll for {txid} timed out after {secs}s")]
    StatusPollTimeout { txid: String, secs: u64 },
    #[error("No reservation matches transaction id {0}")]
    ReservationNotFound(String),
}
