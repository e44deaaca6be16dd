//! The two scheduling engines.

pub mod conflict;
pub mod recurrence;

pub use conflict::{AvailableSlot, BlockedSlot, SchedulingDecision, WorkingHours};
pub use recurrence::AppointmentInstance;
