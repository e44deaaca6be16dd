//! Appointment model.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::recurrence::RecurrenceRule;
use crate::time::TimeRange;

/// Lifecycle status of an appointment.
///
/// Only `Scheduled` appointments participate in conflict detection and
/// availability search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A calendar appointment as handed to the engines.
///
/// `start < end` is a caller-side invariant; the overlap math tolerates
/// violations by treating such rows as zero-width.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    /// Owning user; conflict queries span all of this user's calendars.
    pub user_id: Uuid,
    pub calendar_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    /// Start instant in UTC.
    pub start: DateTime<Utc>,
    /// End instant in UTC.
    pub end: DateTime<Utc>,
    /// All-day events conventionally span 00:00:00 to 23:59:59 and take
    /// part in overlap math through those actual instants.
    pub is_all_day: bool,
    pub status: AppointmentStatus,
    /// Present on recurrence parents only.
    pub recurrence_rule: Option<RecurrenceRule>,
    /// Present on materialized instances; such rows are never expanded again.
    pub recurrence_parent_id: Option<Uuid>,
    /// Display color, inherited from the calendar default when absent.
    pub color: Option<String>,
}

impl Appointment {
    #[must_use]
    pub fn time_range(&self) -> TimeRange {
        TimeRange::new(self.start, self.end)
    }

    /// Width of the appointment; preserved on every generated occurrence.
    #[must_use]
    pub fn duration(&self) -> TimeDelta {
        self.time_range().duration()
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self.status, AppointmentStatus::Scheduled)
    }

    /// A recurrence parent carries a rule and is not itself a generated row.
    #[must_use]
    pub const fn is_recurrence_parent(&self) -> bool {
        self.recurrence_rule.is_some() && self.recurrence_parent_id.is_none()
    }
}
