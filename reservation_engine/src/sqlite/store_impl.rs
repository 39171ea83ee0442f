//! `SqliteReservationStore` is the concrete [`ReservationStore`] backend.
//!
//! All guarded transitions lean on the single-statement conditional updates in
//! [`super::db::reservations`], so the guard check and the write cannot be separated by a
//! concurrent writer.
use std::fmt::Debug;

use log::*;
use sqlx::SqlitePool;

use super::db::{new_pool, reservations};
use crate::{
    db_types::{Reservation, ReservationId},
    traits::{ReservationStore, StoreError},
};

#[derive(Clone)]
pub struct SqliteReservationStore {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteReservationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteReservationStore ({:?})", self.pool)
    }
}

impl SqliteReservationStore {
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl ReservationStore for SqliteReservationStore {
    async fn fetch_unpaid(&self) -> Result<Vec<Reservation>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let unpaid = reservations::fetch_unpaid(&mut conn).await?;
        trace!("🗓️ {} unpaid reservation(s) fetched", unpaid.len());
        Ok(unpaid)
    }

    async fn fetch_by_transaction_id(&self, txid: &str) -> Result<Option<Reservation>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        reservations::fetch_by_transaction_id(txid, &mut conn).await
    }

    async fn save(&self, reservation: &Reservation) -> Result<Reservation, StoreError> {
        let mut conn = self.pool.acquire().await?;
        reservations::upsert(reservation, &mut conn).await
    }

    async fn attach_transaction_id(&self, id: &ReservationId, txid: &str) -> Result<Reservation, StoreError> {
        let mut tx = self.pool.begin().await?;
        let updated = reservations::attach_transaction_id(id, txid, &mut tx).await?;
        match updated {
            Some(r) => {
                tx.commit().await?;
                Ok(r)
            },
            None => {
                // The guard refused. Look at the row to report why.
                let current = reservations::fetch_by_id(id, &mut tx).await?;
                let err = match current {
                    None => StoreError::ReservationNotFound(id.clone()),
                    Some(r) if r.transaction_id.is_some() => StoreError::TransactionAlreadySet(id.clone()),
                    Some(_) => StoreError::ReservationClosed(id.clone()),
                };
                warn!("🗓️ Could not attach transaction {txid}: {err}");
                Err(err)
            },
        }
    }

    async fn mark_paid(&self, id: &ReservationId) -> Result<Option<Reservation>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        reservations::mark_paid(id, &mut conn).await
    }

    async fn cancel(&self, id: &ReservationId, note: &str) -> Result<Option<Reservation>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        reservations::cancel(id, note, &mut conn).await
    }
}
