//! Recurrence expansion: walks an appointment's rule into concrete
//! instances inside a query window.
//!
//! The walk is deterministic and bounded: an occurrence count ceiling
//! caps open-ended rules and the weekly by-day advance aborts after a
//! year without a match. Occurrences before the window are walked but
//! not emitted, so a weekly rule anchored on a Monday keeps landing on
//! Mondays even when the window opens mid-week.

use chrono::{DateTime, Datelike, Months, NaiveDate, TimeDelta, Utc, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use agenda_core::constants::{BY_DAY_SCAN_LIMIT_DAYS, DEFAULT_MAX_OCCURRENCES};
use agenda_core::model::recurrence::weekday_name;
use agenda_core::model::{Appointment, AppointmentStatus, Frequency, RecurrenceRule};
use agenda_core::time::TimeRange;

/// An occurrence materialized into an appointment-shaped record for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentInstance {
    /// `"<appointmentId>_<startTimestamp>"` for generated occurrences;
    /// the appointment's own id for passthrough.
    pub id: String,
    pub appointment_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub is_all_day: bool,
    pub color: Option<String>,
    pub status: AppointmentStatus,
    pub is_recurring_instance: bool,
    pub recurrence_parent_id: Option<Uuid>,
}

impl AppointmentInstance {
    /// The appointment itself, viewed as a single instance. No synthetic id.
    fn passthrough(appointment: &Appointment) -> Self {
        Self {
            id: appointment.id.to_string(),
            appointment_id: appointment.id,
            title: appointment.title.clone(),
            description: appointment.description.clone(),
            location: appointment.location.clone(),
            start: appointment.start,
            end: appointment.end,
            is_all_day: appointment.is_all_day,
            color: appointment.color.clone(),
            status: appointment.status,
            is_recurring_instance: false,
            recurrence_parent_id: appointment.recurrence_parent_id,
        }
    }

    /// A generated occurrence carrying the parent's duration.
    fn occurrence(appointment: &Appointment, start: DateTime<Utc>, duration: TimeDelta) -> Self {
        Self {
            id: format!("{}_{}", appointment.id, start.timestamp()),
            appointment_id: appointment.id,
            title: appointment.title.clone(),
            description: appointment.description.clone(),
            location: appointment.location.clone(),
            start,
            end: start + duration,
            is_all_day: appointment.is_all_day,
            color: appointment.color.clone(),
            status: appointment.status,
            is_recurring_instance: true,
            recurrence_parent_id: Some(appointment.id),
        }
    }
}

/// ## Summary
/// Expands an appointment into the instances whose start falls inside
/// `window`.
///
/// Appointments without a rule, and materialized instances (rows carrying
/// a `recurrence_parent_id`), expand to exactly themselves. For recurrence
/// parents the walk starts at the appointment's own start, clamps the
/// terminal bound to `min(rule.until, window.end)`, and stops once
/// `rule.count` (default ceiling of 730) instances have been emitted.
///
/// Pure function of `(appointment, window)`; reads no external state.
#[must_use]
pub fn expand(appointment: &Appointment, window: &TimeRange) -> Vec<AppointmentInstance> {
    let rule = match &appointment.recurrence_rule {
        Some(rule) if appointment.recurrence_parent_id.is_none() => rule,
        _ => return vec![AppointmentInstance::passthrough(appointment)],
    };

    let duration = appointment.duration();
    let effective_until = rule.until.map_or(window.end, |until| until.min(window.end));
    let max_count = rule.count.unwrap_or(DEFAULT_MAX_OCCURRENCES);
    // A zero interval would stall the walk; treat it as 1 rather than fail.
    let interval = rule.interval.max(1);

    tracing::trace!(
        appointment_id = %appointment.id,
        frequency = %rule.frequency,
        interval,
        %window,
        "expanding recurrence rule"
    );

    let mut instances = Vec::new();
    let mut emitted: u32 = 0;
    let mut cursor = appointment.start;

    while emitted < max_count && cursor <= effective_until {
        if cursor >= window.start {
            instances.push(AppointmentInstance::occurrence(appointment, cursor, duration));
            emitted += 1;
        }
        let Some(next) = advance(cursor, rule, interval) else {
            tracing::warn!(
                appointment_id = %appointment.id,
                cursor = %cursor,
                "recurrence advance found no next occurrence, stopping expansion"
            );
            break;
        };
        cursor = next;
    }

    instances
}

/// Next occurrence after `cursor` per the frequency-specific advance rule.
///
/// `None` means the walk cannot continue (malformed by-day set or
/// datetime arithmetic out of range).
fn advance(cursor: DateTime<Utc>, rule: &RecurrenceRule, interval: u32) -> Option<DateTime<Utc>> {
    match rule.frequency {
        Frequency::Daily => cursor.checked_add_signed(TimeDelta::days(i64::from(interval))),
        Frequency::Weekly => match &rule.by_day {
            Some(days) => next_weekly_by_day(cursor, days, interval),
            None => cursor.checked_add_signed(TimeDelta::weeks(i64::from(interval))),
        },
        Frequency::Monthly => next_monthly(cursor, rule.by_month_day, interval),
        Frequency::Yearly => cursor.checked_add_months(Months::new(12 * interval)),
    }
}

/// Day-by-day walk to the next weekday in `days`.
///
/// Weeks are ISO (Monday-start). When the walk crosses into a new week,
/// the remaining `interval - 1` week-cycles are skipped in one jump, so
/// an `interval = 2` rule accepts matches in week 1 and then week 3.
/// Aborts after [`BY_DAY_SCAN_LIMIT_DAYS`] days without a match.
fn next_weekly_by_day(
    cursor: DateTime<Utc>,
    days: &[Weekday],
    interval: u32,
) -> Option<DateTime<Utc>> {
    let mut next = cursor;
    for _ in 0..BY_DAY_SCAN_LIMIT_DAYS {
        next = next.checked_add_signed(TimeDelta::days(1))?;
        if next.weekday() == Weekday::Mon && interval > 1 {
            next = next.checked_add_signed(TimeDelta::weeks(i64::from(interval) - 1))?;
        }
        if days.contains(&next.weekday()) {
            return Some(next);
        }
    }
    None
}

/// Monthly advance. Without `by_month_day` the day-of-month follows the
/// cursor (chrono clamps overlong days on its own); with it, the day is
/// re-anchored each month and clamped to that month's length.
fn next_monthly(
    cursor: DateTime<Utc>,
    by_month_day: Option<u32>,
    interval: u32,
) -> Option<DateTime<Utc>> {
    let advanced = cursor.checked_add_months(Months::new(interval))?;
    match by_month_day {
        Some(day) => {
            let clamped = day.clamp(1, days_in_month(advanced.year(), advanced.month()));
            advanced.with_day(clamped)
        }
        None => Some(advanced),
    }
}

fn days_in_month(year: i32, month: u32) -> u32 {
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first| first.checked_add_months(Months::new(1)))
        .and_then(|next_first| next_first.pred_opt())
        .map_or(31, |last| last.day())
}

/// ## Summary
/// Renders a rule as a human-readable summary, e.g.
/// "Repeats every 2 weeks on Monday, Wednesday until Jan 31, 2025".
#[must_use]
pub fn describe(rule: &RecurrenceRule) -> String {
    let mut summary = if rule.interval <= 1 {
        format!("Repeats {}", rule.frequency)
    } else {
        let unit = match rule.frequency {
            Frequency::Daily => "days",
            Frequency::Weekly => "weeks",
            Frequency::Monthly => "months",
            Frequency::Yearly => "years",
        };
        format!("Repeats every {} {unit}", rule.interval)
    };

    if rule.frequency == Frequency::Weekly
        && let Some(days) = &rule.by_day
        && !days.is_empty()
    {
        let names: Vec<&str> = days.iter().map(|day| weekday_name(*day)).collect();
        summary.push_str(&format!(" on {}", names.join(", ")));
    }

    if rule.frequency == Frequency::Monthly
        && let Some(day) = rule.by_month_day
    {
        summary.push_str(&format!(" on day {day}"));
    }

    if let Some(count) = rule.count {
        summary.push_str(&format!(", {count} times"));
    }

    if let Some(until) = rule.until {
        summary.push_str(&format!(" until {}", until.format("%b %-d, %Y")));
    }

    summary
}
