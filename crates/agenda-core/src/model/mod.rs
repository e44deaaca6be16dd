//! Data model consumed by the scheduling engines.
//!
//! These are plain values handed to the core by the surrounding
//! application; nothing here owns a storage lifecycle.

pub mod appointment;
pub mod calendar;
pub mod recurrence;

pub use appointment::{Appointment, AppointmentStatus};
pub use calendar::{Calendar, CalendarKind};
pub use recurrence::{Frequency, RecurrenceRule};
