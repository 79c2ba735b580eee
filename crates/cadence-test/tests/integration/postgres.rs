#![allow(clippy::expect_used, clippy::unwrap_used)]
//! Integration tests against Postgres.
//!
//! Each test runs inside a private schema and is skipped when
//! `CADENCE_TEST_DATABASE_URL` is not set.
//!
//! Tests:
//! - Overlap rejection leaves the schedule table unchanged
//! - Concurrent writers on separate connections
//! - Projection overlays read from a snapshot
//! - Unique exception dates and cascading deletes

use std::sync::Arc;

use futures::future::join_all;

use cadence_test::component::error::ServiceError;
use cadence_test::component::event;
use cadence_test::component::exception;
use cadence_test::component::model::NewSchedule;
use cadence_test::component::projection::ProjectionStatus;
use cadence_test::component::projection::query::{get_event_projections, get_events_detailed};
use cadence_test::component::schedule;
use cadence_test::component::store::ScheduleStore;

use super::helpers::*;

#[test_log::test(tokio::test)]
async fn pg_overlap_rejected_without_writes() {
    let Some(mut db) = PgTestSchema::create().await.unwrap() else {
        return;
    };
    let event = seed_event(&db.store, "Standup").await;
    let existing = seed_daily(&db.store, event.id, jan(1), jan(7)).await;
    let before = db.count("schedule").await.unwrap();

    let err = schedule::create_schedule(
        &db.store,
        NewSchedule::new(event.id, window(jan(7), jan(12)), daily()),
    )
    .await
    .unwrap_err();

    match err {
        ServiceError::SchedulingConflict {
            conflicting_schedule_id,
            ..
        } => assert_eq!(conflicting_schedule_id, existing.id),
        other => panic!("expected a scheduling conflict, got {other}"),
    }
    assert_eq!(db.count("schedule").await.unwrap(), before);

    db.teardown().await.unwrap();
}

/// ## Summary
/// Writers on separate pooled connections serialize on the event row, so
/// exactly one overlapping insert commits.
#[test_log::test(tokio::test(flavor = "multi_thread", worker_threads = 4))]
async fn pg_concurrent_overlapping_writers_exactly_one_wins() {
    let Some(mut db) = PgTestSchema::create().await.unwrap() else {
        return;
    };
    let event = seed_event(&db.store, "Standup").await;
    let event_id = event.id;
    let store = Arc::new(db.store.clone());

    let attempts = (0..8u32).map(|i| {
        let store = Arc::clone(&store);
        tokio::spawn(async move {
            let candidate = window(jan(1 + i % 2), jan(10 + i % 3));
            schedule::create_schedule(store.as_ref(), NewSchedule::new(event_id, candidate, daily()))
                .await
        })
    });

    let mut committed = 0;
    for result in join_all(attempts).await {
        match result.unwrap() {
            Ok(_) => committed += 1,
            Err(err) => assert!(err.is_scheduling_conflict(), "unexpected error: {err}"),
        }
    }
    assert_eq!(committed, 1);
    assert_eq!(db.count("schedule").await.unwrap(), 1);

    drop(store);
    db.teardown().await.unwrap();
}

#[test_log::test(tokio::test)]
async fn pg_projections_apply_overlays() {
    let Some(db) = PgTestSchema::create().await.unwrap() else {
        return;
    };
    let event = seed_event(&db.store, "Standup").await;
    let schedule = seed_daily(&db.store, event.id, jan(1), jan(7)).await;
    exception::cancel_occurrence(&db.store, schedule.id, jan(5), None)
        .await
        .unwrap();
    exception::move_occurrence(&db.store, schedule.id, jan(3), jan(5), None, None, None)
        .await
        .unwrap();
    exception::retime_occurrence(
        &db.store,
        schedule.id,
        jan(6),
        Some(time(8, 0)),
        Some(time(8, 30)),
        None,
    )
    .await
    .unwrap();

    let projections = get_event_projections(&db.store, event.id, range(jan(1), jan(7)))
        .await
        .unwrap();

    assert_eq!(dates_of(&projections), vec![jan(1), jan(2), jan(4), jan(5), jan(6), jan(7)]);
    assert!(matches!(
        on(&projections, jan(5))[0].status,
        ProjectionStatus::Moved { from, .. } if from == jan(3)
    ));
    assert_eq!(on(&projections, jan(6))[0].start_time, time(8, 0));

    let detailed = get_events_detailed(&db.store, range(jan(1), jan(7)))
        .await
        .unwrap();
    assert_eq!(detailed, projections);

    db.teardown().await.unwrap();
}

#[test_log::test(tokio::test)]
async fn pg_duplicate_exception_conflicts() {
    let Some(mut db) = PgTestSchema::create().await.unwrap() else {
        return;
    };
    let event = seed_event(&db.store, "Standup").await;
    let schedule = seed_daily(&db.store, event.id, jan(1), jan(7)).await;
    exception::cancel_occurrence(&db.store, schedule.id, jan(3), None)
        .await
        .unwrap();

    let err = exception::cancel_occurrence(&db.store, schedule.id, jan(3), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));
    assert_eq!(db.count("schedule_exception").await.unwrap(), 1);

    db.teardown().await.unwrap();
}

#[test_log::test(tokio::test)]
async fn pg_delete_event_cascades() {
    let Some(mut db) = PgTestSchema::create().await.unwrap() else {
        return;
    };
    let event = seed_event(&db.store, "Standup").await;
    let schedule = seed_daily(&db.store, event.id, jan(1), jan(7)).await;
    exception::cancel_occurrence(&db.store, schedule.id, jan(3), None)
        .await
        .unwrap();

    event::delete_event(&db.store, event.id).await.unwrap();

    assert_eq!(db.count("schedule").await.unwrap(), 0);
    assert_eq!(db.count("schedule_exception").await.unwrap(), 0);
    assert!(db.store.get_schedule(schedule.id).await.unwrap().is_none());
    assert!(matches!(
        event::get_event(&db.store, event.id).await,
        Err(ServiceError::NotFound(_))
    ));

    db.teardown().await.unwrap();
}
