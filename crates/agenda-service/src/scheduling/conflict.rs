//! Cross-calendar conflict detection and availability search.
//!
//! Conflict queries deliberately span all of a user's calendars: a
//! business-calendar appointment blocks a personal-calendar slot and
//! vice versa. Every operation here is read-then-decide; nothing writes.

use std::collections::HashMap;

use chrono::{DateTime, TimeDelta, Timelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use agenda_core::constants::{DEFAULT_SLOT_STEP_MINUTES, DEFAULT_WORKING_HOURS};
use agenda_core::model::{Appointment, Calendar, CalendarKind};
use agenda_core::time::TimeRange;

use crate::error::{ServiceError, ServiceResult};
use crate::gateway::{AppointmentFilters, QueryGateway};

const MSG_NO_CONFLICTS: &str = "No conflicts found.";
const MSG_CONFLICTS: &str =
    "Conflicts detected. Please choose a different time or enable override.";
const MSG_OVERRIDE: &str = "Conflicts exist but override is allowed.";
const WARN_OVERRIDE: &str = "This appointment overlaps with existing appointments.";

/// Outcome of a [`can_schedule`] check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingDecision {
    pub can_schedule: bool,
    pub conflicts: Vec<Appointment>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// A time range in another calendar that a conflict-aware UI should
/// render as unavailable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedSlot {
    pub id: Uuid,
    pub calendar_name: String,
    pub calendar_kind: CalendarKind,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub is_blocking: bool,
}

/// An open slot found by [`find_available_slots`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Daily hour bounds the availability scan searches within.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingHours {
    pub start_hour: u32,
    pub end_hour: u32,
}

impl Default for WorkingHours {
    fn default() -> Self {
        Self {
            start_hour: DEFAULT_WORKING_HOURS.0,
            end_hour: DEFAULT_WORKING_HOURS.1,
        }
    }
}

impl WorkingHours {
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.start_hour < self.end_hour && self.end_hour <= 23
    }
}

/// ## Summary
/// Finds the user's `Scheduled` appointments overlapping `range`, across
/// all calendars.
///
/// `exclude_appointment` removes one appointment from the candidates
/// (self-exclusion during updates); `exclude_calendar` removes a whole
/// calendar ("blocked by other calendars" queries). Result order is
/// stable: by start, then id.
///
/// ## Errors
/// Propagates gateway failures unchanged.
pub async fn find_conflicts<G: QueryGateway>(
    gateway: &G,
    user_id: Uuid,
    range: TimeRange,
    exclude_appointment: Option<Uuid>,
    exclude_calendar: Option<Uuid>,
) -> ServiceResult<Vec<Appointment>> {
    let mut filters = AppointmentFilters::scheduled().excluding(exclude_appointment);
    if let Some(calendar_id) = exclude_calendar {
        filters = filters.not_in_calendar(calendar_id);
    }

    let mut conflicts: Vec<Appointment> = gateway
        .find_appointments(user_id, &filters)
        .await?
        .into_iter()
        .filter(|appointment| range.overlaps(&appointment.time_range()))
        .collect();
    conflicts.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));

    tracing::trace!(
        %user_id,
        %range,
        conflict_count = conflicts.len(),
        "conflict query evaluated"
    );
    Ok(conflicts)
}

/// ## Summary
/// Whether any `Scheduled` appointment of the user overlaps `range`.
///
/// ## Errors
/// Propagates gateway failures unchanged.
pub async fn has_conflict<G: QueryGateway>(
    gateway: &G,
    user_id: Uuid,
    range: TimeRange,
    exclude_appointment: Option<Uuid>,
    exclude_calendar: Option<Uuid>,
) -> ServiceResult<bool> {
    let conflicts =
        find_conflicts(gateway, user_id, range, exclude_appointment, exclude_calendar).await?;
    Ok(!conflicts.is_empty())
}

/// ## Summary
/// Decides whether `range` can be scheduled for the user.
///
/// Pure decision, no writes: the caller acts on it. Because this is
/// read-then-decide, two concurrent check-and-persist sequences can both
/// pass; callers needing exactly-once conflict-free scheduling must wrap
/// the check and the write in their own transaction or equivalent.
///
/// ## Errors
/// Propagates gateway failures unchanged.
pub async fn can_schedule<G: QueryGateway>(
    gateway: &G,
    user_id: Uuid,
    calendar_id: Uuid,
    range: TimeRange,
    exclude_appointment: Option<Uuid>,
    allow_override: bool,
) -> ServiceResult<SchedulingDecision> {
    tracing::debug!(
        %user_id,
        %calendar_id,
        %range,
        allow_override,
        "evaluating scheduling decision"
    );
    let conflicts = find_conflicts(gateway, user_id, range, exclude_appointment, None).await?;

    let decision = if conflicts.is_empty() {
        SchedulingDecision {
            can_schedule: true,
            conflicts,
            message: MSG_NO_CONFLICTS.to_string(),
            warning: None,
        }
    } else if allow_override {
        SchedulingDecision {
            can_schedule: true,
            conflicts,
            message: MSG_OVERRIDE.to_string(),
            warning: Some(WARN_OVERRIDE.to_string()),
        }
    } else {
        SchedulingDecision {
            can_schedule: false,
            conflicts,
            message: MSG_CONFLICTS.to_string(),
            warning: None,
        }
    };
    Ok(decision)
}

/// ## Summary
/// Computes the slots in `window` that other calendars block for
/// `calendar_id`.
///
/// An unknown calendar yields an empty list, not an error: "no blocking
/// information" is indistinguishable from "nothing blocks you" at this
/// layer. Appointments whose own calendar cannot be resolved are skipped
/// with a warning.
///
/// ## Errors
/// Propagates gateway failures unchanged.
pub async fn blocked_slots<G: QueryGateway>(
    gateway: &G,
    user_id: Uuid,
    calendar_id: Uuid,
    window: TimeRange,
) -> ServiceResult<Vec<BlockedSlot>> {
    let Some(calendar) = gateway.find_calendar(calendar_id).await? else {
        tracing::debug!(%calendar_id, "calendar not found, returning no blocked slots");
        return Ok(Vec::new());
    };

    let filters = AppointmentFilters::scheduled()
        .not_in_calendar(calendar.id)
        .starting_between(window.start, window.end);
    let mut blocking = gateway.find_appointments(user_id, &filters).await?;
    blocking.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));

    let mut calendars: HashMap<Uuid, Option<Calendar>> = HashMap::new();
    let mut slots = Vec::new();
    for appointment in blocking {
        let source = if let Some(cached) = calendars.get(&appointment.calendar_id) {
            cached.clone()
        } else {
            let found = gateway.find_calendar(appointment.calendar_id).await?;
            calendars.insert(appointment.calendar_id, found.clone());
            found
        };
        let Some(source) = source else {
            tracing::warn!(
                calendar_id = %appointment.calendar_id,
                appointment_id = %appointment.id,
                "blocking appointment references unknown calendar, skipping"
            );
            continue;
        };
        slots.push(BlockedSlot {
            id: appointment.id,
            calendar_name: source.name,
            calendar_kind: source.kind,
            title: appointment.title,
            start: appointment.start,
            end: appointment.end,
            is_blocking: true,
        });
    }
    Ok(slots)
}

/// ## Summary
/// Scans `window` for open slots of `duration_minutes` within working
/// hours.
///
/// Candidate starts advance in 30-minute increments; past the closing
/// hour the scan jumps to the next day's opening. A returned slot never
/// overlaps a `Scheduled` appointment, never leaves working hours, and
/// ends on or before the window end. When `calendar_id` is given, only
/// that calendar's appointments are considered occupied.
///
/// ## Errors
/// Returns a validation error for non-positive durations or nonsensical
/// working hours; propagates gateway failures unchanged.
pub async fn find_available_slots<G: QueryGateway>(
    gateway: &G,
    user_id: Uuid,
    window: TimeRange,
    duration_minutes: i64,
    calendar_id: Option<Uuid>,
    working_hours: WorkingHours,
) -> ServiceResult<Vec<AvailableSlot>> {
    if !working_hours.is_valid() {
        return Err(ServiceError::ValidationError(format!(
            "working hours {}..{} are not a valid daily range",
            working_hours.start_hour, working_hours.end_hour
        )));
    }
    if duration_minutes <= 0 {
        return Err(ServiceError::ValidationError(
            "slot duration must be positive".to_string(),
        ));
    }

    // No start-between narrowing here: an appointment that starts before
    // the window but runs into it still occupies slots, so the overlap
    // predicate is the only filter.
    let mut filters = AppointmentFilters::scheduled();
    if let Some(calendar_id) = calendar_id {
        filters = filters.in_calendar(calendar_id);
    }
    let mut appointments = gateway.find_appointments(user_id, &filters).await?;
    appointments.sort_by_key(|appointment| appointment.start);

    let duration = TimeDelta::minutes(duration_minutes);
    let step = TimeDelta::minutes(DEFAULT_SLOT_STEP_MINUTES);
    let mut slots = Vec::new();

    let mut cursor = window.start;
    if cursor.hour() < working_hours.start_hour
        && let Some(opening) = at_hour(cursor, working_hours.start_hour)
    {
        cursor = opening;
    }

    while cursor < window.end {
        // Past closing: resume at the next day's opening hour.
        if cursor.hour() >= working_hours.end_hour {
            let Some(next_opening) = cursor
                .checked_add_signed(TimeDelta::days(1))
                .and_then(|next_day| at_hour(next_day, working_hours.start_hour))
            else {
                break;
            };
            cursor = next_opening;
            continue;
        }

        let slot_end = cursor + duration;
        let Some(day_close) = at_hour(cursor, working_hours.end_hour) else {
            break;
        };
        if slot_end <= day_close && slot_end <= window.end {
            let candidate = TimeRange::new(cursor, slot_end);
            let occupied = appointments
                .iter()
                .any(|appointment| candidate.overlaps(&appointment.time_range()));
            if !occupied {
                slots.push(AvailableSlot {
                    start: cursor,
                    end: slot_end,
                });
            }
        }
        cursor += step;
    }

    tracing::trace!(
        %user_id,
        %window,
        duration_minutes,
        slot_count = slots.len(),
        "availability scan finished"
    );
    Ok(slots)
}

/// ## Summary
/// Share of `range` covered by the conflicts, as a percentage.
///
/// Each conflict contributes its clamped positive overlap with `range`;
/// overlapping conflicts are not de-duplicated, so the value can exceed
/// 100. It measures conflict pressure, not covered fraction. Degenerate
/// ranges yield 0.
#[must_use]
#[expect(clippy::cast_precision_loss)]
pub fn conflict_percentage(range: &TimeRange, conflicts: &[Appointment]) -> f64 {
    let total_minutes = range.duration_minutes();
    if total_minutes <= 0 {
        return 0.0;
    }

    let overlap_minutes: i64 = conflicts
        .iter()
        .filter_map(|conflict| range.intersection(&conflict.time_range()))
        .map(|clamped| clamped.duration_minutes())
        .sum();

    (overlap_minutes as f64 / total_minutes as f64) * 100.0
}

fn at_hour(instant: DateTime<Utc>, hour: u32) -> Option<DateTime<Utc>> {
    instant
        .date_naive()
        .and_hms_opt(hour, 0, 0)
        .map(|naive| naive.and_utc())
}
