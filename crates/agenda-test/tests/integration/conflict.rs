//! Conflict detection and scheduling-decision behavior.

use uuid::Uuid;

use agenda_core::model::AppointmentStatus;
use agenda_core::time::TimeRange;
use agenda_service::error::ServiceError;
use agenda_service::gateway::GatewayError;
use agenda_service::scheduling::conflict::{
    blocked_slots, can_schedule, find_conflicts, has_conflict,
};
use agenda_test::{test_appointment, utc};

use super::helpers::TwoCalendarUser;

#[test_log::test(tokio::test)]
async fn overlapping_range_conflicts_and_touching_range_does_not() {
    let user = TwoCalendarUser::new();
    let existing = test_appointment(
        user.user_id,
        user.business.id,
        "Existing",
        utc(2025, 1, 1, 10, 0),
        utc(2025, 1, 1, 11, 0),
    );
    let gateway = user.gateway(vec![existing]);

    let overlapping = TimeRange::new(utc(2025, 1, 1, 10, 30), utc(2025, 1, 1, 11, 30));
    assert!(
        has_conflict(&gateway, user.user_id, overlapping, None, None)
            .await
            .expect("conflict query should succeed")
    );

    // Touching boundary: existing end == query start.
    let touching = TimeRange::new(utc(2025, 1, 1, 11, 0), utc(2025, 1, 1, 12, 0));
    assert!(
        !has_conflict(&gateway, user.user_id, touching, None, None)
            .await
            .expect("conflict query should succeed")
    );
}

#[test_log::test(tokio::test)]
async fn conflicts_span_all_calendars_of_the_user() {
    let user = TwoCalendarUser::new();
    let personal_block = test_appointment(
        user.user_id,
        user.personal.id,
        "Dentist",
        utc(2025, 3, 10, 14, 0),
        utc(2025, 3, 10, 15, 0),
    );
    let gateway = user.gateway(vec![personal_block.clone()]);

    // Scheduling into the business calendar still collides with the
    // personal appointment.
    let decision = can_schedule(
        &gateway,
        user.user_id,
        user.business.id,
        TimeRange::new(utc(2025, 3, 10, 14, 30), utc(2025, 3, 10, 15, 30)),
        None,
        false,
    )
    .await
    .expect("decision should succeed");

    assert!(!decision.can_schedule);
    assert_eq!(decision.conflicts.len(), 1);
    assert_eq!(decision.conflicts[0].id, personal_block.id);
}

#[test_log::test(tokio::test)]
async fn all_day_appointment_conflicts_through_its_actual_instants() {
    let user = TwoCalendarUser::new();
    let mut all_day = test_appointment(
        user.user_id,
        user.personal.id,
        "Holiday",
        utc(2025, 5, 1, 0, 0),
        utc(2025, 5, 1, 23, 59),
    );
    all_day.is_all_day = true;
    let gateway = user.gateway(vec![all_day]);

    // A timed query on that date overlaps the all-day span.
    let timed = TimeRange::new(utc(2025, 5, 1, 10, 0), utc(2025, 5, 1, 11, 0));
    assert!(
        has_conflict(&gateway, user.user_id, timed, None, None)
            .await
            .expect("conflict query should succeed")
    );

    // The next day is clear.
    let next_day = TimeRange::new(utc(2025, 5, 2, 10, 0), utc(2025, 5, 2, 11, 0));
    assert!(
        !has_conflict(&gateway, user.user_id, next_day, None, None)
            .await
            .expect("conflict query should succeed")
    );
}

#[test_log::test(tokio::test)]
async fn cancelled_and_completed_appointments_never_conflict() {
    let user = TwoCalendarUser::new();
    let mut cancelled = test_appointment(
        user.user_id,
        user.business.id,
        "Cancelled",
        utc(2025, 1, 1, 10, 0),
        utc(2025, 1, 1, 11, 0),
    );
    cancelled.status = AppointmentStatus::Cancelled;
    let mut completed = cancelled.clone();
    completed.id = Uuid::new_v4();
    completed.status = AppointmentStatus::Completed;
    let gateway = user.gateway(vec![cancelled, completed]);

    let range = TimeRange::new(utc(2025, 1, 1, 10, 0), utc(2025, 1, 1, 11, 0));
    let conflicts = find_conflicts(&gateway, user.user_id, range, None, None)
        .await
        .expect("conflict query should succeed");
    assert!(conflicts.is_empty());
}

#[test_log::test(tokio::test)]
async fn excludes_remove_self_and_whole_calendars() {
    let user = TwoCalendarUser::new();
    let being_updated = test_appointment(
        user.user_id,
        user.business.id,
        "Being updated",
        utc(2025, 1, 1, 10, 0),
        utc(2025, 1, 1, 11, 0),
    );
    let personal_block = test_appointment(
        user.user_id,
        user.personal.id,
        "Gym",
        utc(2025, 1, 1, 10, 0),
        utc(2025, 1, 1, 11, 0),
    );
    let gateway = user.gateway(vec![being_updated.clone(), personal_block.clone()]);
    let range = TimeRange::new(utc(2025, 1, 1, 10, 0), utc(2025, 1, 1, 11, 0));

    // Self-exclusion while rescheduling: only the personal block remains.
    let conflicts = find_conflicts(&gateway, user.user_id, range, Some(being_updated.id), None)
        .await
        .expect("conflict query should succeed");
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].id, personal_block.id);

    // Excluding the personal calendar leaves the business appointment.
    let conflicts = find_conflicts(&gateway, user.user_id, range, None, Some(user.personal.id))
        .await
        .expect("conflict query should succeed");
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].id, being_updated.id);
}

#[test_log::test(tokio::test)]
async fn conflicts_are_returned_in_stable_order() {
    let user = TwoCalendarUser::new();
    let later = test_appointment(
        user.user_id,
        user.business.id,
        "Later",
        utc(2025, 1, 1, 12, 0),
        utc(2025, 1, 1, 13, 0),
    );
    let earlier = test_appointment(
        user.user_id,
        user.personal.id,
        "Earlier",
        utc(2025, 1, 1, 10, 0),
        utc(2025, 1, 1, 11, 0),
    );
    let gateway = user.gateway(vec![later.clone(), earlier.clone()]);

    let range = TimeRange::new(utc(2025, 1, 1, 9, 0), utc(2025, 1, 1, 14, 0));
    let conflicts = find_conflicts(&gateway, user.user_id, range, None, None)
        .await
        .expect("conflict query should succeed");
    let ids: Vec<Uuid> = conflicts.iter().map(|appointment| appointment.id).collect();
    assert_eq!(ids, vec![earlier.id, later.id]);
}

#[test_log::test(tokio::test)]
async fn override_allows_scheduling_with_warning() {
    let user = TwoCalendarUser::new();
    let existing = test_appointment(
        user.user_id,
        user.business.id,
        "Existing",
        utc(2025, 1, 1, 10, 0),
        utc(2025, 1, 1, 11, 0),
    );
    let gateway = user.gateway(vec![existing]);
    let range = TimeRange::new(utc(2025, 1, 1, 10, 30), utc(2025, 1, 1, 11, 30));

    let denied = can_schedule(&gateway, user.user_id, user.business.id, range, None, false)
        .await
        .expect("decision should succeed");
    assert!(!denied.can_schedule);
    assert_eq!(
        denied.message,
        "Conflicts detected. Please choose a different time or enable override."
    );
    assert!(denied.warning.is_none());
    assert!(!denied.conflicts.is_empty());

    let allowed = can_schedule(&gateway, user.user_id, user.business.id, range, None, true)
        .await
        .expect("decision should succeed");
    assert!(allowed.can_schedule);
    assert_eq!(allowed.message, "Conflicts exist but override is allowed.");
    assert_eq!(
        allowed.warning.as_deref(),
        Some("This appointment overlaps with existing appointments.")
    );
    assert!(!allowed.conflicts.is_empty());
}

#[test_log::test(tokio::test)]
async fn clear_range_schedules_without_warning() {
    let user = TwoCalendarUser::new();
    let gateway = user.gateway(Vec::new());

    let decision = can_schedule(
        &gateway,
        user.user_id,
        user.business.id,
        TimeRange::new(utc(2025, 1, 1, 10, 0), utc(2025, 1, 1, 11, 0)),
        None,
        false,
    )
    .await
    .expect("decision should succeed");

    assert!(decision.can_schedule);
    assert!(decision.conflicts.is_empty());
    assert_eq!(decision.message, "No conflicts found.");
    assert!(decision.warning.is_none());
}

#[test_log::test(tokio::test)]
async fn gateway_failures_propagate_unchanged() {
    let user = TwoCalendarUser::new();
    let gateway = user.gateway(Vec::new());
    gateway.fail_next_read();

    let result = has_conflict(
        &gateway,
        user.user_id,
        TimeRange::new(utc(2025, 1, 1, 10, 0), utc(2025, 1, 1, 11, 0)),
        None,
        None,
    )
    .await;

    assert!(matches!(
        result,
        Err(ServiceError::GatewayError(GatewayError::Unavailable(_)))
    ));
}

#[test_log::test(tokio::test)]
async fn blocked_slots_come_from_other_calendars_only() {
    let user = TwoCalendarUser::new();
    let own = test_appointment(
        user.user_id,
        user.business.id,
        "Own meeting",
        utc(2025, 2, 3, 9, 0),
        utc(2025, 2, 3, 10, 0),
    );
    let personal = test_appointment(
        user.user_id,
        user.personal.id,
        "School run",
        utc(2025, 2, 3, 15, 0),
        utc(2025, 2, 3, 16, 0),
    );
    let outside_window = test_appointment(
        user.user_id,
        user.personal.id,
        "Next month",
        utc(2025, 3, 3, 15, 0),
        utc(2025, 3, 3, 16, 0),
    );
    let gateway = user.gateway(vec![own, personal.clone(), outside_window]);

    let window = TimeRange::new(utc(2025, 2, 1, 0, 0), utc(2025, 2, 28, 23, 59));
    let slots = blocked_slots(&gateway, user.user_id, user.business.id, window)
        .await
        .expect("blocked slot query should succeed");

    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0].id, personal.id);
    assert_eq!(slots[0].calendar_name, "Home");
    assert_eq!(slots[0].calendar_kind, user.personal.kind);
    assert_eq!(slots[0].title, "School run");
    assert!(slots[0].is_blocking);
}

#[test_log::test(tokio::test)]
async fn blocked_slots_for_unknown_calendar_are_empty() {
    let user = TwoCalendarUser::new();
    let personal = test_appointment(
        user.user_id,
        user.personal.id,
        "Anything",
        utc(2025, 2, 3, 15, 0),
        utc(2025, 2, 3, 16, 0),
    );
    let gateway = user.gateway(vec![personal]);

    let window = TimeRange::new(utc(2025, 2, 1, 0, 0), utc(2025, 2, 28, 23, 59));
    let slots = blocked_slots(&gateway, user.user_id, Uuid::new_v4(), window)
        .await
        .expect("blocked slot query should succeed");
    assert!(slots.is_empty());
}
