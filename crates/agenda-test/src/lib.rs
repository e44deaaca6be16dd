//! Agenda scheduling engines - integration test support.
//!
//! Provides an in-memory [`QueryGateway`] implementation and fixture
//! builders so the engines can be exercised without a real storage
//! layer. The gateway applies [`AppointmentFilters`] the way an indexed
//! store would, including the inclusive start-between bound.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use agenda_core::model::{
    Appointment, AppointmentStatus, Calendar, CalendarKind, RecurrenceRule,
};
use agenda_service::gateway::{AppointmentFilters, GatewayError, QueryGateway};

/// Vec-backed gateway for tests.
///
/// `fail_next` makes the next read fail, to exercise fail-fast
/// propagation of gateway errors.
#[derive(Debug, Default)]
pub struct InMemoryGateway {
    appointments: Vec<Appointment>,
    calendars: Vec<Calendar>,
    fail_next: AtomicBool,
}

impl InMemoryGateway {
    #[must_use]
    pub fn new(calendars: Vec<Calendar>, appointments: Vec<Appointment>) -> Self {
        Self {
            appointments,
            calendars,
            fail_next: AtomicBool::new(false),
        }
    }

    pub fn fail_next_read(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    fn check_failure(&self) -> Result<(), GatewayError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(GatewayError::Unavailable(
                "simulated storage outage".to_string(),
            ));
        }
        Ok(())
    }

    fn matches(appointment: &Appointment, user_id: Uuid, filters: &AppointmentFilters) -> bool {
        if appointment.user_id != user_id {
            return false;
        }
        if let Some(status) = filters.status
            && appointment.status != status
        {
            return false;
        }
        if let Some(include) = &filters.calendar_id_in
            && !include.contains(&appointment.calendar_id)
        {
            return false;
        }
        if let Some(exclude) = &filters.calendar_id_not_in
            && exclude.contains(&appointment.calendar_id)
        {
            return false;
        }
        if let Some((start, end)) = filters.start_between
            && (appointment.start < start || appointment.start > end)
        {
            return false;
        }
        if filters.exclude_id == Some(appointment.id) {
            return false;
        }
        true
    }
}

impl QueryGateway for InMemoryGateway {
    async fn find_appointments(
        &self,
        user_id: Uuid,
        filters: &AppointmentFilters,
    ) -> Result<Vec<Appointment>, GatewayError> {
        self.check_failure()?;
        Ok(self
            .appointments
            .iter()
            .filter(|appointment| Self::matches(appointment, user_id, filters))
            .cloned()
            .collect())
    }

    async fn find_calendar(&self, id: Uuid) -> Result<Option<Calendar>, GatewayError> {
        self.check_failure()?;
        Ok(self
            .calendars
            .iter()
            .find(|calendar| calendar.id == id)
            .cloned())
    }
}

/// Shorthand for a UTC instant in fixtures.
///
/// # Panics
/// Panics on an invalid date, which in a fixture is a test bug.
#[must_use]
pub fn utc(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .unwrap_or_else(|| panic!("invalid fixture instant {year}-{month}-{day} {hour}:{minute}"))
}

/// Creates a test calendar.
#[must_use]
pub fn test_calendar(user_id: Uuid, name: &str, kind: CalendarKind) -> Calendar {
    Calendar {
        id: Uuid::new_v4(),
        user_id,
        name: name.to_string(),
        kind,
        color: Some("#2266aa".to_string()),
        is_default: false,
    }
}

/// Creates a scheduled, non-recurring test appointment.
#[must_use]
pub fn test_appointment(
    user_id: Uuid,
    calendar_id: Uuid,
    title: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Appointment {
    Appointment {
        id: Uuid::new_v4(),
        user_id,
        calendar_id,
        title: title.to_string(),
        description: None,
        location: None,
        start,
        end,
        is_all_day: false,
        status: AppointmentStatus::Scheduled,
        recurrence_rule: None,
        recurrence_parent_id: None,
        color: None,
    }
}

/// Creates a recurrence parent carrying `rule`.
#[must_use]
pub fn recurring_appointment(
    user_id: Uuid,
    calendar_id: Uuid,
    title: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    rule: RecurrenceRule,
) -> Appointment {
    let mut appointment = test_appointment(user_id, calendar_id, title, start, end);
    appointment.recurrence_rule = Some(rule);
    appointment
}
