//! Time-range math shared by the scheduling engines.
//!
//! All instants are UTC. Overlap semantics are pinned here once so the
//! conflict engine and the availability scan cannot drift apart.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// A time range between two UTC instants.
///
/// Ranges with `end <= start` are tolerated as zero-width: they never
/// overlap anything and have zero duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    #[must_use]
    pub const fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Signed width of the range. Zero for degenerate ranges.
    #[must_use]
    pub fn duration(&self) -> TimeDelta {
        let delta = self.end.signed_duration_since(self.start);
        if delta < TimeDelta::zero() {
            TimeDelta::zero()
        } else {
            delta
        }
    }

    #[must_use]
    pub fn duration_minutes(&self) -> i64 {
        self.duration().num_minutes()
    }

    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant <= self.end
    }

    /// ## Summary
    /// Tests whether `other` overlaps this range.
    ///
    /// True when any of:
    /// - `other.start` falls inside `[start, end)`
    /// - `other.end` falls inside `(start, end]`
    /// - `other` fully spans `[start, end]` with positive width
    ///
    /// Touching endpoints (`other.end == start` or `other.start == end`)
    /// do not count as overlap, and degenerate ranges never overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        let starts_within = other.start >= self.start && other.start < self.end;
        let ends_within = other.end > self.start && other.end <= self.end;
        let spans = other.start <= self.start && other.end >= self.end;

        let other_has_width = other.end > other.start;
        let self_has_width = self.end > self.start;

        other_has_width && self_has_width && (starts_within || ends_within || spans)
    }

    /// ## Summary
    /// Clamps `other` into this range.
    ///
    /// Returns `None` when the clamped range would be empty.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        (end > start).then_some(Self { start, end })
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}
