//! Conditional-write behaviour of the Postgres shift store.
//!
//! These run against the database named by `DATABASE_URL` and are skipped
//! when it is unset. Every test uses fresh worker and site ids, so they can
//! share a database with other data.

use chrono::{Duration, Utc};
use shiftgate_core::error::ShiftgateError;
use shiftgate_core::models::{
    ClockEvent, Coordinate, Role, Shift, ShiftQuery, ShiftStatus, Site, SiteId, WorkerId,
    WorkerProfile,
};
use shiftgate_store::ports::{ShiftStore, SiteStore, WorkerStore};
use shiftgate_store::postgres::{PostgresConfig, PostgresStore};

async fn store() -> Option<PostgresStore> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping Postgres test");
        return None;
    };
    let config = PostgresConfig::from_database_url(&url).unwrap();
    Some(PostgresStore::with_migrations(config).await.unwrap())
}

fn here() -> Coordinate {
    Coordinate::new(37.7749, -122.4194)
}

/// A fresh worker and site to hang shifts off
async fn seed(store: &PostgresStore) -> (WorkerId, SiteId) {
    let worker_id = WorkerId::new(format!("test|{}", SiteId::new()));
    let profile = WorkerProfile {
        id: worker_id.clone(),
        name: "Ana Reyes".to_string(),
        email: "ana@example.org".to_string(),
        role: Role::CareWorker,
    };
    store.sync_worker(&profile, Utc::now()).await.unwrap();

    let site = Site {
        id: SiteId::new(),
        name: format!("Test site {}", worker_id),
        address: String::new(),
        location: here(),
        radius_meters: 2000.0,
        updated_at: Utc::now(),
    };
    store.upsert_site(&site).await.unwrap();

    (worker_id, site.id)
}

fn open(worker_id: &WorkerId, site_id: SiteId) -> Shift {
    Shift::open(worker_id.clone(), site_id, ClockEvent::new(Utc::now(), here(), None))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_unique_index_race_is_shift_already_active() {
    let Some(store) = store().await else { return };
    let (worker_id, site_id) = seed(&store).await;

    let tasks: Vec<_> = (0..8)
        .map(|_| {
            let store = store.clone();
            let shift = open(&worker_id, site_id);
            tokio::spawn(async move { store.insert_active_shift(&shift).await })
        })
        .collect();

    let mut inserted = 0;
    let mut already_active = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(()) => inserted += 1,
            Err(ShiftgateError::ShiftAlreadyActive { worker_id: w }) => {
                assert_eq!(w, worker_id.to_string());
                already_active += 1;
            }
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(inserted, 1);
    assert_eq!(already_active, 7);
    assert!(store.active_shift_for(&worker_id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_completing_twice_is_no_active_shift() {
    let Some(store) = store().await else { return };
    let (worker_id, site_id) = seed(&store).await;

    let mut shift = open(&worker_id, site_id);
    store.insert_active_shift(&shift).await.unwrap();

    let out_at = shift.clock_in.at + Duration::minutes(90);
    shift.complete(ClockEvent::new(out_at, here(), Some("done".into()))).unwrap();
    store.complete_shift(&shift).await.unwrap();

    let err = store.complete_shift(&shift).await.unwrap_err();
    assert!(matches!(err, ShiftgateError::NoActiveShift { .. }));

    let stored = store.get_shift(shift.id).await.unwrap().unwrap();
    assert_eq!(stored.status, ShiftStatus::Completed);
    assert_eq!(stored.duration_minutes(), Some(90));

    // The worker is free to clock in again
    store.insert_active_shift(&open(&worker_id, site_id)).await.unwrap();
}

#[tokio::test]
async fn test_history_with_huge_offset_is_empty() {
    let Some(store) = store().await else { return };
    let (worker_id, site_id) = seed(&store).await;
    store.insert_active_shift(&open(&worker_id, site_id)).await.unwrap();

    let query = ShiftQuery::default().for_worker(worker_id).with_page(usize::MAX, 10);
    let page = store.query_shifts(&query).await.unwrap();
    assert_eq!(page.total, 1);
    assert!(page.items.is_empty());
}
