//! Read-only query gateway the engines pull candidate data through.
//!
//! The storage layer applies these filters (an indexed WHERE clause or
//! equivalent); the engines re-apply nothing but the overlap predicate.
//! Gateway failures propagate upward unchanged: no retry policy lives at
//! this layer.

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use agenda_core::model::{Appointment, AppointmentStatus, Calendar};

/// Errors surfaced by a gateway implementation.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Filters for an appointment lookup, applied by the gateway.
#[derive(Debug, Clone, Default)]
pub struct AppointmentFilters {
    pub status: Option<AppointmentStatus>,
    /// Restrict to these calendars.
    pub calendar_id_in: Option<Vec<Uuid>>,
    /// Exclude these calendars ("blocked by other calendars" queries).
    pub calendar_id_not_in: Option<Vec<Uuid>>,
    /// Restrict to appointments whose start falls in this inclusive range.
    pub start_between: Option<(DateTime<Utc>, DateTime<Utc>)>,
    /// Self-exclusion during updates.
    pub exclude_id: Option<Uuid>,
}

impl AppointmentFilters {
    /// Filter for active appointments, the shape every conflict query starts from.
    #[must_use]
    pub fn scheduled() -> Self {
        Self {
            status: Some(AppointmentStatus::Scheduled),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn in_calendar(mut self, calendar_id: Uuid) -> Self {
        self.calendar_id_in = Some(vec![calendar_id]);
        self
    }

    #[must_use]
    pub fn not_in_calendar(mut self, calendar_id: Uuid) -> Self {
        self.calendar_id_not_in = Some(vec![calendar_id]);
        self
    }

    #[must_use]
    pub const fn starting_between(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.start_between = Some((start, end));
        self
    }

    #[must_use]
    pub const fn excluding(mut self, appointment_id: Option<Uuid>) -> Self {
        self.exclude_id = appointment_id;
        self
    }
}

/// Read interface to the storage layer.
///
/// Implementations must be safe for concurrent reads; the engines hold no
/// state of their own and may be called from any number of tasks at once.
pub trait QueryGateway: Send + Sync {
    /// Fetches a user's appointments matching the filters.
    fn find_appointments(
        &self,
        user_id: Uuid,
        filters: &AppointmentFilters,
    ) -> impl Future<Output = Result<Vec<Appointment>, GatewayError>> + Send;

    /// Looks up a calendar by id. `Ok(None)` when it does not exist.
    fn find_calendar(
        &self,
        id: Uuid,
    ) -> impl Future<Output = Result<Option<Calendar>, GatewayError>> + Send;
}
