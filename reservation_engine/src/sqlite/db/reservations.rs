use log::{debug, trace};
use sqlx::SqliteConnection;

use crate::{
    db_types::{Reservation, ReservationId},
    traits::StoreError,
};

/// Inserts the reservation, or replaces the stored copy wholesale if the id already exists.
/// `created_at` is never touched on the update path; expiry is measured from first insertion.
pub async fn upsert(reservation: &Reservation, conn: &mut SqliteConnection) -> Result<Reservation, StoreError> {
    let saved = sqlx::query_as(
        r#"
            INSERT INTO reservations (id, transaction_id, paid, canceled, observation, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE SET
                transaction_id = excluded.transaction_id,
                paid = excluded.paid,
                canceled = excluded.canceled,
                observation = excluded.observation,
                updated_at = CURRENT_TIMESTAMP
            RETURNING *;
        "#,
    )
    .bind(&reservation.id)
    .bind(&reservation.transaction_id)
    .bind(reservation.paid)
    .bind(reservation.canceled)
    .bind(&reservation.observation)
    .bind(reservation.created_at)
    .fetch_one(conn)
    .await?;
    trace!("🗓️ Reservation {} saved", reservation.id);
    Ok(saved)
}

/// All reservations still waiting for payment, oldest first.
pub async fn fetch_unpaid(conn: &mut SqliteConnection) -> Result<Vec<Reservation>, StoreError> {
    let rows = sqlx::query_as("SELECT * FROM reservations WHERE paid = 0 AND canceled = 0 ORDER BY created_at ASC")
        .fetch_all(conn)
        .await?;
    Ok(rows)
}

pub async fn fetch_by_id(id: &ReservationId, conn: &mut SqliteConnection) -> Result<Option<Reservation>, StoreError> {
    let row = sqlx::query_as("SELECT * FROM reservations WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(row)
}

pub async fn fetch_by_transaction_id(
    txid: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Reservation>, StoreError> {
    let row =
        sqlx::query_as("SELECT * FROM reservations WHERE transaction_id = $1").bind(txid).fetch_optional(conn).await?;
    Ok(row)
}

/// Records the transaction id, but only while the reservation is open and has no transaction id
/// yet. The conditional update keeps the guard check and the write in one atomic statement; a
/// `None` result means the guard did not hold.
pub async fn attach_transaction_id(
    id: &ReservationId,
    txid: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Reservation>, StoreError> {
    let row: Option<Reservation> = sqlx::query_as(
        "UPDATE reservations SET transaction_id = $2, updated_at = CURRENT_TIMESTAMP WHERE id = $1 AND \
         transaction_id IS NULL AND paid = 0 AND canceled = 0 RETURNING *",
    )
    .bind(id)
    .bind(txid)
    .fetch_optional(conn)
    .await?;
    if let Some(r) = &row {
        debug!("🗓️ Transaction {txid} attached to reservation {}", r.id);
    }
    Ok(row)
}

/// Flips `paid` iff the reservation is still unpaid and not canceled.
pub async fn mark_paid(id: &ReservationId, conn: &mut SqliteConnection) -> Result<Option<Reservation>, StoreError> {
    let row: Option<Reservation> = sqlx::query_as(
        "UPDATE reservations SET paid = 1, updated_at = CURRENT_TIMESTAMP WHERE id = $1 AND paid = 0 AND canceled = \
         0 RETURNING *",
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;
    if let Some(r) = &row {
        debug!("🗓️ Reservation {} marked as paid", r.id);
    }
    Ok(row)
}

/// Flips `canceled` and appends `note` to the observation, iff the reservation is still unpaid
/// and not canceled. One statement, so the cancellation and its audit note cannot diverge.
pub async fn cancel(
    id: &ReservationId,
    note: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Reservation>, StoreError> {
    let row: Option<Reservation> = sqlx::query_as(
        "UPDATE reservations SET canceled = 1, observation = observation || $2, updated_at = CURRENT_TIMESTAMP WHERE \
         id = $1 AND paid = 0 AND canceled = 0 RETURNING *",
    )
    .bind(id)
    .bind(note)
    .fetch_optional(conn)
    .await?;
    if let Some(r) = &row {
        debug!("🗓️ Reservation {} canceled", r.id);
    }
    Ok(row)
}
