use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};

//--------------------------------------    ReservationId      -------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Hash, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct ReservationId(pub String);

impl FromStr for ReservationId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl<S: Into<String>> From<S> for ReservationId {
    fn from(s: S) -> Self {
        Self(s.into())
    }
}

impl Display for ReservationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl ReservationId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------     Reservation       -------------------------------------------------------
/// The slice of a booking record that payment reconciliation reads and writes.
///
/// `paid` and `canceled` only ever move from `false` to `true`, never both on the same record, and
/// `transaction_id` is written at most once. The guarded store operations enforce all three.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct Reservation {
    pub id: ReservationId,
    /// The provider's transaction id, set once a charge exists for this reservation.
    pub transaction_id: Option<String>,
    pub paid: bool,
    pub canceled: bool,
    /// Human-readable description of the booking. Cancellation appends an audit note here.
    pub observation: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    /// A fresh, unpaid reservation with no charge attached.
    pub fn new<S: Into<String>>(id: S, observation: &str) -> Self {
        let now = Utc::now();
        Self {
            id: ReservationId(id.into()),
            transaction_id: None,
            paid: false,
            canceled: false,
            observation: observation.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_transaction_id(mut self, txid: &str) -> Self {
        self.transaction_id = Some(txid.to_string());
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Time elapsed between creation and `now`.
    pub fn age_at(&self, now: DateTime<Utc>) -> Duration {
        now.signed_duration_since(self.created_at)
    }

    /// An open reservation is one the reconciliation pass still cares about.
    pub fn is_open(&self) -> bool {
        !self.paid && !self.canceled
    }
}

impl Display for Reservation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match (self.paid, self.canceled) {
            (true, _) => "paid",
            (false, true) => "canceled",
            (false, false) => "unpaid",
        };
        write!(f, "Reservation {} ({state}): {}", self.id, self.observation)
    }
}
