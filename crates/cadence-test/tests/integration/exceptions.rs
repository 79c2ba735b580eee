#![allow(clippy::expect_used, clippy::unwrap_used)]
//! Integration tests for exception management.
//!
//! Tests:
//! - Validation of exception shapes
//! - One exception per schedule and date
//! - Updating and deleting exceptions changes projections
//! - Cascading deletes

use uuid::Uuid;

use cadence_test::component::error::ServiceError;
use cadence_test::component::exception;
use cadence_test::component::model::{ExceptionKind, ExceptionUpdate, NewException};
use cadence_test::component::projection::ProjectionStatus;
use cadence_test::component::projection::query::get_event_projections;
use cadence_test::component::schedule;
use cadence_test::component::store::ScheduleStore;

use super::helpers::*;

#[test_log::test(tokio::test)]
async fn cancelled_exception_with_times_is_rejected() {
    let store = MemoryStore::new();
    let event = seed_event(&store, "Standup").await;
    let schedule = seed_daily(&store, event.id, jan(1), jan(7)).await;

    let malformed =
        NewException::cancel(schedule.id, jan(3)).with_times(Some(time(9, 0)), Some(time(10, 0)));
    let err = exception::create_exception(&store, malformed)
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::ValidationError(_)));
    assert!(store.list_exceptions(schedule.id).await.unwrap().is_empty());
}

#[test_log::test(tokio::test)]
async fn inverted_retime_is_rejected() {
    let store = MemoryStore::new();
    let event = seed_event(&store, "Standup").await;
    let schedule = seed_daily(&store, event.id, jan(1), jan(7)).await;

    let err = exception::retime_occurrence(
        &store,
        schedule.id,
        jan(3),
        Some(time(12, 0)),
        Some(time(11, 0)),
        None,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ServiceError::ValidationError(_)));
}

#[test_log::test(tokio::test)]
async fn second_exception_on_same_date_conflicts() {
    let store = MemoryStore::new();
    let event = seed_event(&store, "Standup").await;
    let schedule = seed_daily(&store, event.id, jan(1), jan(7)).await;

    exception::cancel_occurrence(&store, schedule.id, jan(3), None)
        .await
        .unwrap();
    let err = exception::move_occurrence(&store, schedule.id, jan(3), jan(5), None, None, None)
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Conflict(_)));
    assert_eq!(store.list_exceptions(schedule.id).await.unwrap().len(), 1);
}

#[test_log::test(tokio::test)]
async fn exception_for_unknown_schedule_is_not_found() {
    let store = MemoryStore::new();
    let err = exception::cancel_occurrence(&store, Uuid::now_v7(), jan(3), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[test_log::test(tokio::test)]
async fn updating_move_into_cancel_changes_projection() {
    let store = MemoryStore::new();
    let event = seed_event(&store, "Standup").await;
    let schedule = seed_daily(&store, event.id, jan(1), jan(7)).await;
    let moved = exception::move_occurrence(&store, schedule.id, jan(3), jan(5), None, None, None)
        .await
        .unwrap();

    let cancelled = exception::update_exception(
        &store,
        moved.id,
        ExceptionUpdate {
            kind: Some(ExceptionKind::Cancelled),
            modified_date: Some(None),
            ..ExceptionUpdate::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(cancelled.kind, ExceptionKind::Cancelled);

    let projections = get_event_projections(&store, event.id, range(jan(1), jan(7)))
        .await
        .unwrap();
    assert_eq!(projections.len(), 6);
    assert!(on(&projections, jan(3)).is_empty());
    assert_eq!(on(&projections, jan(5))[0].status, ProjectionStatus::Normal);
}

#[test_log::test(tokio::test)]
async fn update_that_breaks_shape_is_rejected() {
    let store = MemoryStore::new();
    let event = seed_event(&store, "Standup").await;
    let schedule = seed_daily(&store, event.id, jan(1), jan(7)).await;
    let moved = exception::move_occurrence(&store, schedule.id, jan(3), jan(5), None, None, None)
        .await
        .unwrap();

    let err = exception::update_exception(
        &store,
        moved.id,
        ExceptionUpdate {
            kind: Some(ExceptionKind::Cancelled),
            ..ExceptionUpdate::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ServiceError::ValidationError(_)));
    assert_eq!(exception::get_exception(&store, moved.id).await.unwrap(), moved);
}

#[test_log::test(tokio::test)]
async fn deleting_exception_restores_occurrence() {
    let store = MemoryStore::new();
    let event = seed_event(&store, "Standup").await;
    let schedule = seed_daily(&store, event.id, jan(1), jan(7)).await;
    let cancelled = exception::cancel_occurrence(&store, schedule.id, jan(3), None)
        .await
        .unwrap();

    exception::delete_exception(&store, cancelled.id)
        .await
        .unwrap();

    let projections = get_event_projections(&store, event.id, range(jan(1), jan(7)))
        .await
        .unwrap();
    assert_eq!(projections.len(), 7);
    assert!(matches!(
        exception::delete_exception(&store, cancelled.id).await,
        Err(ServiceError::NotFound(_))
    ));
}

#[test_log::test(tokio::test)]
async fn deleting_schedule_removes_its_exceptions() {
    let store = MemoryStore::new();
    let event = seed_event(&store, "Standup").await;
    let schedule = seed_daily(&store, event.id, jan(1), jan(7)).await;
    let cancelled = exception::cancel_occurrence(&store, schedule.id, jan(3), None)
        .await
        .unwrap();

    schedule::delete_schedule(&store, schedule.id).await.unwrap();

    assert!(store.get_exception(cancelled.id).await.unwrap().is_none());
    assert!(
        get_event_projections(&store, event.id, range(jan(1), jan(7)))
            .await
            .unwrap()
            .is_empty()
    );
}

#[test_log::test(tokio::test)]
async fn exceptions_list_in_date_order() {
    let store = MemoryStore::new();
    let event = seed_event(&store, "Standup").await;
    let schedule = seed_daily(&store, event.id, jan(1), jan(7)).await;
    for day in [5, 2, 4] {
        exception::cancel_occurrence(&store, schedule.id, jan(day), Some(format!("off {day}")))
            .await
            .unwrap();
    }

    let dates: Vec<_> = exception::list_exceptions(&store, schedule.id)
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.exception_date)
        .collect();
    assert_eq!(dates, vec![jan(2), jan(4), jan(5)]);
}
