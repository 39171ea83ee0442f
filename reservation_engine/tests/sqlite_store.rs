//! Guard behavior of the SQLite reservation store. Every state transition is a conditional
//! update, so these tests hammer the refusal paths as hard as the happy paths.
use chrono::{Duration, Utc};
use reservation_engine::{
    db_types::{Reservation, ReservationId},
    traits::{ReservationStore, StoreError},
    SqliteReservationStore,
};
use sqlx::{migrate, migrate::MigrateDatabase, Sqlite};
use tempfile::TempDir;

async fn new_store(dir: &TempDir) -> SqliteReservationStore {
    dotenvy::from_filename(".env.test").ok();
    let _ = env_logger::try_init();
    let url = format!("sqlite://{}/reservations.db", dir.path().display());
    Sqlite::create_database(&url).await.expect("Error creating database");
    let store = SqliteReservationStore::new_with_url(&url, 5).await.expect("Error connecting to database");
    migrate!("./src/sqlite/db/migrations").run(store.pool()).await.expect("Error running migrations");
    store
}

#[tokio::test]
async fn unpaid_reservations_come_back_oldest_first_and_closed_ones_do_not() {
    let dir = TempDir::new().unwrap();
    let store = new_store(&dir).await;
    let older = Reservation::new("older", "Quadra 1 - 08:00").with_created_at(Utc::now() - Duration::minutes(30));
    let newer = Reservation::new("newer", "Quadra 1 - 09:00");
    store.save(&newer).await.unwrap();
    store.save(&older).await.unwrap();
    let mut settled = Reservation::new("settled", "Quadra 2 - 08:00");
    settled.paid = true;
    store.save(&settled).await.unwrap();
    let mut gone = Reservation::new("gone", "Quadra 2 - 09:00");
    gone.canceled = true;
    store.save(&gone).await.unwrap();
    let unpaid = store.fetch_unpaid().await.unwrap();
    let ids = unpaid.iter().map(|r| r.id.as_str()).collect::<Vec<&str>>();
    assert_eq!(ids, ["older", "newer"]);
}

#[tokio::test]
async fn updates_never_move_the_creation_time() {
    let dir = TempDir::new().unwrap();
    let store = new_store(&dir).await;
    store.save(&Reservation::new("r1", "Quadra 1 - 19:00")).await.unwrap();
    let first = store.fetch_unpaid().await.unwrap().remove(0);
    let mut modified = first.clone();
    modified.observation = "Quadra 1 - 19:00 (remarcada)".to_string();
    modified.created_at = Utc::now() + Duration::days(1);
    store.save(&modified).await.unwrap();
    let second = store.fetch_unpaid().await.unwrap().remove(0);
    assert_eq!(second.created_at, first.created_at);
    assert_eq!(second.observation, "Quadra 1 - 19:00 (remarcada)");
}

#[tokio::test]
async fn a_transaction_id_can_only_be_attached_once() {
    let dir = TempDir::new().unwrap();
    let store = new_store(&dir).await;
    store.save(&Reservation::new("r1", "Quadra 1 - 19:00")).await.unwrap();
    let updated = store.attach_transaction_id(&ReservationId::from("r1"), "tx-1").await.unwrap();
    assert_eq!(updated.transaction_id.as_deref(), Some("tx-1"));
    let err = store.attach_transaction_id(&ReservationId::from("r1"), "tx-2").await.unwrap_err();
    assert!(matches!(err, StoreError::TransactionAlreadySet(_)));
    let row = store.fetch_by_transaction_id("tx-1").await.unwrap().unwrap();
    assert_eq!(row.transaction_id.as_deref(), Some("tx-1"));
    assert!(store.fetch_by_transaction_id("tx-2").await.unwrap().is_none());
}

#[tokio::test]
async fn attaching_to_an_unknown_reservation_fails() {
    let dir = TempDir::new().unwrap();
    let store = new_store(&dir).await;
    let err = store.attach_transaction_id(&ReservationId::from("ghost"), "tx-1").await.unwrap_err();
    assert!(matches!(err, StoreError::ReservationNotFound(_)));
}

#[tokio::test]
async fn attaching_to_a_closed_reservation_fails() {
    let dir = TempDir::new().unwrap();
    let store = new_store(&dir).await;
    store.save(&Reservation::new("r1", "Quadra 1 - 19:00")).await.unwrap();
    store.cancel(&ReservationId::from("r1"), " - expirada").await.unwrap().unwrap();
    let err = store.attach_transaction_id(&ReservationId::from("r1"), "tx-1").await.unwrap_err();
    assert!(matches!(err, StoreError::ReservationClosed(_)));
}

#[tokio::test]
async fn a_reservation_can_only_be_marked_paid_once() {
    let dir = TempDir::new().unwrap();
    let store = new_store(&dir).await;
    store.save(&Reservation::new("r1", "Quadra 1 - 19:00")).await.unwrap();
    let updated = store.mark_paid(&ReservationId::from("r1")).await.unwrap();
    assert!(updated.unwrap().paid);
    let repeat = store.mark_paid(&ReservationId::from("r1")).await.unwrap();
    assert!(repeat.is_none());
}

#[tokio::test]
async fn canceling_appends_the_note_exactly_once() {
    let dir = TempDir::new().unwrap();
    let store = new_store(&dir).await;
    store.save(&Reservation::new("r1", "Quadra 1 - 19:00").with_transaction_id("tx-1")).await.unwrap();
    let note = " - Cancelado por falta de pagamento após 20 minutos";
    let updated = store.cancel(&ReservationId::from("r1"), note).await.unwrap().unwrap();
    assert!(updated.canceled);
    assert_eq!(updated.observation, format!("Quadra 1 - 19:00{note}"));
    let repeat = store.cancel(&ReservationId::from("r1"), note).await.unwrap();
    assert!(repeat.is_none());
    let row = store.fetch_by_transaction_id("tx-1").await.unwrap().unwrap();
    assert_eq!(row.observation, format!("Quadra 1 - 19:00{note}"));
}

#[tokio::test]
async fn a_paid_reservation_cannot_be_canceled() {
    let dir = TempDir::new().unwrap();
    let store = new_store(&dir).await;
    store.save(&Reservation::new("r1", "Quadra 1 - 19:00").with_transaction_id("tx-1")).await.unwrap();
    store.mark_paid(&ReservationId::from("r1")).await.unwrap().unwrap();
    let refused = store.cancel(&ReservationId::from("r1"), " - expirada").await.unwrap();
    assert!(refused.is_none());
    let row = store.fetch_by_transaction_id("tx-1").await.unwrap().unwrap();
    assert!(row.paid);
    assert!(!row.canceled);
    assert_eq!(row.observation, "Quadra 1 - 19:00");
}

#[tokio::test]
async fn a_canceled_reservation_cannot_be_marked_paid() {
    let dir = TempDir::new().unwrap();
    let store = new_store(&dir).await;
    store.save(&Reservation::new("r1", "Quadra 1 - 19:00").with_transaction_id("tx-1")).await.unwrap();
    store.cancel(&ReservationId::from("r1"), " - expirada").await.unwrap().unwrap();
    let refused = store.mark_paid(&ReservationId::from("r1")).await.unwrap();
    assert!(refused.is_none());
    let row = store.fetch_by_transaction_id("tx-1").await.unwrap().unwrap();
    assert!(row.canceled);
    assert!(!row.paid);
}

#[tokio::test]
async fn transaction_ids_resolve_to_their_reservation() {
    let dir = TempDir::new().unwrap();
    let store = new_store(&dir).await;
    store.save(&Reservation::new("r1", "Quadra 1 - 19:00").with_transaction_id("tx-a")).await.unwrap();
    store.save(&Reservation::new("r2", "Quadra 2 - 19:00").with_transaction_id("tx-b")).await.unwrap();
    let row = store.fetch_by_transaction_id("tx-b").await.unwrap().unwrap();
    assert_eq!(row.id, ReservationId::from("r2"));
    assert!(store.fetch_by_transaction_id("tx-zzz").await.unwrap().is_none());
}

#[tokio::test]
async fn racing_settle_and_cancel_produce_exactly_one_winner() {
    let dir = TempDir::new().unwrap();
    let store = new_store(&dir).await;
    store.save(&Reservation::new("r1", "Quadra 1 - 19:00").with_transaction_id("tx-1")).await.unwrap();
    let settle_store = store.clone();
    let cancel_store = store.clone();
    let settle =
        tokio::spawn(async move { settle_store.mark_paid(&ReservationId::from("r1")).await.unwrap() });
    let cancel =
        tokio::spawn(async move { cancel_store.cancel(&ReservationId::from("r1"), " - expirada").await.unwrap() });
    let settled = settle.await.unwrap();
    let canceled = cancel.await.unwrap();
    assert!(settled.is_some() ^ canceled.is_some());
    let row = store.fetch_by_transaction_id("tx-1").await.unwrap().unwrap();
    assert!(row.paid ^ row.canceled);
}
