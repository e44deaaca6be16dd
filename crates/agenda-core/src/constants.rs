//! Scheduling constants shared across crates.

/// Hard ceiling on generated occurrences when a rule carries neither
/// COUNT nor UNTIL; bounds an open-ended daily rule to roughly two years.
pub const DEFAULT_MAX_OCCURRENCES: u32 = 730;

/// Abort threshold for the weekly by-day walk. A well-formed rule matches
/// within one week; a full year without a match means the rule is broken.
pub const BY_DAY_SCAN_LIMIT_DAYS: u32 = 365;

/// Granularity of the availability scan.
pub const DEFAULT_SLOT_STEP_MINUTES: i64 = 30;

/// Default daily working-hour bounds, as (opening hour, closing hour).
pub const DEFAULT_WORKING_HOURS: (u32, u32) = (9, 17);

/// Reminder lead-time options offered by clients, in minutes before start.
pub const DEFAULT_REMINDER_MINUTES: &[u32] = &[0, 5, 10, 15, 30, 60, 120, 1440];
