#![allow(clippy::expect_used, clippy::unwrap_used)]
//! Integration tests for the projection read path.
//!
//! Tests:
//! - Candidate counts over a schedule's own window
//! - Cancellation, retime and move overlays
//! - Moves winning over cancellations on the destination date
//! - Merging and ordering across schedules and events

use uuid::Uuid;

use cadence_test::component::exception;
use cadence_test::component::projection::ProjectionStatus;
use cadence_test::component::projection::query::{get_event_projections, get_events_detailed};
use cadence_test::component::recurrence::RecurrenceRule;
use cadence_test::component::window::TimeWindow;

use super::helpers::*;

/// ## Summary
/// A daily schedule over exactly N days yields N normal projections.
#[test_log::test(tokio::test)]
async fn daily_schedule_yields_one_projection_per_day() {
    let store = MemoryStore::new();
    let event = seed_event(&store, "Standup").await;
    seed_daily(&store, event.id, jan(1), jan(7)).await;

    let projections = get_event_projections(&store, event.id, range(jan(1), jan(7)))
        .await
        .unwrap();

    assert_eq!(dates_of(&projections), (1..=7).map(jan).collect::<Vec<_>>());
    assert!(
        projections
            .iter()
            .all(|p| p.status == ProjectionStatus::Normal && p.event_name == "Standup")
    );
    assert!(
        projections
            .iter()
            .all(|p| p.start_time == time(9, 0) && p.end_time == time(10, 0))
    );
}

#[test_log::test(tokio::test)]
async fn cancellation_removes_exactly_one_date() {
    let store = MemoryStore::new();
    let event = seed_event(&store, "Standup").await;
    let schedule = seed_daily(&store, event.id, jan(1), jan(7)).await;
    exception::cancel_occurrence(&store, schedule.id, jan(3), None)
        .await
        .unwrap();

    let projections = get_event_projections(&store, event.id, range(jan(1), jan(7)))
        .await
        .unwrap();

    assert_eq!(projections.len(), 6);
    assert!(on(&projections, jan(3)).is_empty());
}

#[test_log::test(tokio::test)]
async fn retime_keeps_date_and_changes_times() {
    let store = MemoryStore::new();
    let event = seed_event(&store, "Standup").await;
    let schedule = seed_daily(&store, event.id, jan(1), jan(7)).await;
    exception::retime_occurrence(
        &store,
        schedule.id,
        jan(4),
        Some(time(11, 0)),
        Some(time(12, 0)),
        Some("late start".to_string()),
    )
    .await
    .unwrap();

    let projections = get_event_projections(&store, event.id, range(jan(1), jan(7)))
        .await
        .unwrap();

    let fourth = on(&projections, jan(4));
    assert_eq!(fourth.len(), 1);
    assert_eq!((fourth[0].start_time, fourth[0].end_time), (time(11, 0), time(12, 0)));
    assert!(fourth[0].status.to_string().starts_with("MODIFIED: Time"));
    assert_eq!(fourth[0].notes.as_deref(), Some("late start"));
    assert_eq!(projections.len(), 7);
}

#[test_log::test(tokio::test)]
async fn move_relocates_occurrence() {
    let store = MemoryStore::new();
    let event = seed_event(&store, "Standup").await;
    let schedule = seed_daily(&store, event.id, jan(1), jan(7)).await;
    exception::move_occurrence(&store, schedule.id, jan(3), jan(5), None, None, None)
        .await
        .unwrap();

    let projections = get_event_projections(&store, event.id, range(jan(1), jan(7)))
        .await
        .unwrap();

    assert!(on(&projections, jan(3)).is_empty());
    let fifth = on(&projections, jan(5));
    assert_eq!(fifth.len(), 1);
    assert!(fifth[0].status.to_string().starts_with("MODIFIED: Date"));
}

/// ## Summary
/// A move onto a cancelled date replaces the cancellation.
#[test_log::test(tokio::test)]
async fn move_wins_over_cancel_on_destination() {
    let store = MemoryStore::new();
    let event = seed_event(&store, "Standup").await;
    let schedule = seed_daily(&store, event.id, jan(1), jan(7)).await;
    exception::cancel_occurrence(&store, schedule.id, jan(5), None)
        .await
        .unwrap();
    exception::move_occurrence(&store, schedule.id, jan(3), jan(5), None, None, None)
        .await
        .unwrap();

    let projections = get_event_projections(&store, event.id, range(jan(1), jan(7)))
        .await
        .unwrap();

    assert_eq!(projections.len(), 6);
    assert!(on(&projections, jan(3)).is_empty());
    let fifth = on(&projections, jan(5));
    assert_eq!(fifth.len(), 1);
    assert_eq!(
        fifth[0].status.to_string(),
        "MODIFIED: Date 2024-01-03 → 2024-01-05 Time 09:00:00-10:00:00"
    );
}

#[test_log::test(tokio::test)]
async fn consecutive_schedules_merge() {
    let store = MemoryStore::new();
    let event = seed_event(&store, "Standup").await;
    let first = seed_daily(&store, event.id, jan(1), jan(7)).await;
    let second = seed_schedule(
        &store,
        event.id,
        TimeWindow::new(at(jan(8), 9), at(jan(14), 10)).unwrap(),
        daily(),
    )
    .await;

    let projections = get_event_projections(&store, event.id, range(jan(1), jan(14)))
        .await
        .unwrap();

    assert_eq!(projections.len(), 14);
    assert!(projections[..7].iter().all(|p| p.schedule_id == first.id));
    assert!(projections[7..].iter().all(|p| p.schedule_id == second.id));
}

#[test_log::test(tokio::test)]
async fn range_before_window_is_empty() {
    let store = MemoryStore::new();
    let event = seed_event(&store, "Standup").await;
    seed_daily(&store, event.id, jan(8), jan(14)).await;

    let projections = get_event_projections(&store, event.id, range(jan(1), jan(7)))
        .await
        .unwrap();
    assert!(projections.is_empty());
}

#[test_log::test(tokio::test)]
async fn unknown_event_and_inverted_range_are_empty() {
    let store = MemoryStore::new();
    let event = seed_event(&store, "Standup").await;
    seed_daily(&store, event.id, jan(1), jan(7)).await;

    assert!(
        get_event_projections(&store, Uuid::now_v7(), range(jan(1), jan(7)))
            .await
            .unwrap()
            .is_empty()
    );
    assert!(
        get_event_projections(&store, event.id, range(jan(7), jan(1)))
            .await
            .unwrap()
            .is_empty()
    );
}

#[test_log::test(tokio::test)]
async fn repeated_queries_are_identical() {
    let store = MemoryStore::new();
    let event = seed_event(&store, "Standup").await;
    let schedule = seed_daily(&store, event.id, jan(1), jan(7)).await;
    exception::move_occurrence(&store, schedule.id, jan(2), jan(6), None, None, None)
        .await
        .unwrap();
    exception::cancel_occurrence(&store, schedule.id, jan(4), None)
        .await
        .unwrap();

    let first = get_event_projections(&store, event.id, range(jan(1), jan(7)))
        .await
        .unwrap();
    let second = get_event_projections(&store, event.id, range(jan(1), jan(7)))
        .await
        .unwrap();
    assert_eq!(first, second);
}

/// ## Summary
/// A schedule moving an occurrence onto a date another schedule of the same
/// event also occupies leaves both projections in place.
#[test_log::test(tokio::test)]
async fn moves_across_schedules_are_independent() {
    let store = MemoryStore::new();
    let event = seed_event(&store, "Standup").await;
    let first = seed_daily(&store, event.id, jan(1), jan(7)).await;
    let second = seed_schedule(
        &store,
        event.id,
        TimeWindow::new(at(jan(8), 9), at(jan(14), 10)).unwrap(),
        daily(),
    )
    .await;
    exception::move_occurrence(&store, first.id, jan(3), jan(10), None, None, None)
        .await
        .unwrap();

    let projections = get_event_projections(&store, event.id, range(jan(1), jan(14)))
        .await
        .unwrap();

    let tenth = on(&projections, jan(10));
    assert_eq!(tenth.len(), 2);
    assert!(tenth.iter().any(|p| p.schedule_id == second.id
        && p.status == ProjectionStatus::Normal));
    assert!(tenth.iter().any(|p| p.schedule_id == first.id
        && matches!(p.status, ProjectionStatus::Moved { .. })));
    assert_eq!(projections.len(), 14);
}

/// ## Summary
/// A move whose source lies outside the query range still shows up at a
/// destination inside it.
#[test_log::test(tokio::test)]
async fn move_from_outside_range_is_visible() {
    let store = MemoryStore::new();
    let event = seed_event(&store, "Standup").await;
    let schedule = seed_daily(&store, event.id, jan(1), jan(14)).await;
    exception::move_occurrence(&store, schedule.id, jan(12), jan(2), None, None, None)
        .await
        .unwrap();

    let projections = get_event_projections(&store, event.id, range(jan(1), jan(7)))
        .await
        .unwrap();

    let second = on(&projections, jan(2));
    assert_eq!(second.len(), 1);
    assert!(matches!(
        second[0].status,
        ProjectionStatus::Moved { from, .. } if from == jan(12)
    ));
}

#[test_log::test(tokio::test)]
async fn detailed_query_spans_events_in_order() {
    let store = MemoryStore::new();
    let standup = seed_event(&store, "Standup").await;
    let review = seed_event(&store, "Review").await;
    seed_daily(&store, standup.id, jan(1), jan(3)).await;
    seed_schedule(
        &store,
        review.id,
        TimeWindow::new(at(jan(2), 8), at(jan(3), 9)).unwrap(),
        daily(),
    )
    .await;

    let projections = get_events_detailed(&store, range(jan(1), jan(3)))
        .await
        .unwrap();

    let labels: Vec<_> = projections
        .iter()
        .map(|p| (p.date, p.event_name.as_str()))
        .collect();
    assert_eq!(
        labels,
        vec![
            (jan(1), "Standup"),
            (jan(2), "Review"),
            (jan(2), "Standup"),
            (jan(3), "Review"),
            (jan(3), "Standup"),
        ]
    );
}

#[test_log::test(tokio::test)]
async fn weekly_schedule_over_quarter() {
    let store = MemoryStore::new();
    let event = seed_event(&store, "Planning").await;
    // 2024-01-01 is a Monday; fortnightly on Wednesdays.
    seed_schedule(
        &store,
        event.id,
        window(jan(1), date(2024, 3, 31)),
        RecurrenceRule::weekly(2, Some(3)).unwrap(),
    )
    .await;

    let projections = get_event_projections(&store, event.id, range(jan(1), date(2024, 3, 31)))
        .await
        .unwrap();

    assert_eq!(
        dates_of(&projections),
        vec![
            jan(3),
            jan(17),
            jan(31),
            date(2024, 2, 14),
            date(2024, 2, 28),
            date(2024, 3, 13),
            date(2024, 3, 27),
        ]
    );
    assert!(projections.iter().all(|p| p.recurrence_type.as_str() == "weekly"));
}

#[test_log::test(tokio::test)]
async fn projections_serialize_for_callers() {
    let store = MemoryStore::new();
    let event = seed_event(&store, "Standup").await;
    let schedule = seed_daily(&store, event.id, jan(1), jan(2)).await;
    exception::retime_occurrence(
        &store,
        schedule.id,
        jan(2),
        Some(time(11, 30)),
        None,
        None,
    )
    .await
    .unwrap();

    let projections = get_event_projections(&store, event.id, range(jan(1), jan(2)))
        .await
        .unwrap();
    let json = serde_json::to_value(&projections).unwrap();

    assert_eq!(json[0]["status"], "NORMAL");
    assert_eq!(json[1]["status"], "MODIFIED: Time 11:30:00-10:00:00");
    assert_eq!(json[1]["startTime"], "11:30:00");
    assert_eq!(json[1]["scheduleId"], schedule.id.to_string());
}
