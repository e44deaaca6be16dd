//! Recurrence rule model and validation.
//!
//! Rules are partially user-supplied, so deserialization degrades
//! permissively (unknown frequency falls back to daily) while
//! [`RecurrenceRule::validate_value`] gives the UI a strict check to run
//! before persisting.

use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Recurrence cadence unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    /// Parses a frequency code, case-insensitively.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_ascii_lowercase().as_str() {
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            "monthly" => Some(Self::Monthly),
            "yearly" => Some(Self::Yearly),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Frequency {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Frequency {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = String::deserialize(deserializer)?;
        Ok(Self::from_code(&code).unwrap_or_else(|| {
            tracing::warn!(frequency = %code, "unknown recurrence frequency, treating as daily");
            Self::Daily
        }))
    }
}

/// Parses a two-letter weekday code (`MO`..`SU`), case-insensitively.
#[must_use]
pub fn weekday_from_code(code: &str) -> Option<Weekday> {
    match code.to_ascii_uppercase().as_str() {
        "MO" => Some(Weekday::Mon),
        "TU" => Some(Weekday::Tue),
        "WE" => Some(Weekday::Wed),
        "TH" => Some(Weekday::Thu),
        "FR" => Some(Weekday::Fri),
        "SA" => Some(Weekday::Sat),
        "SU" => Some(Weekday::Sun),
        _ => None,
    }
}

/// Two-letter code for a weekday.
#[must_use]
pub const fn weekday_code(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}

/// Full weekday name for human-readable summaries.
#[must_use]
pub const fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

mod by_day_codes {
    use super::{Weekday, weekday_code, weekday_from_code};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        days: &Option<Vec<Weekday>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match days {
            Some(days) => {
                let codes: Vec<&str> = days.iter().map(|day| weekday_code(*day)).collect();
                serializer.collect_seq(codes)
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Vec<Weekday>>, D::Error> {
        let codes: Option<Vec<String>> = Option::deserialize(deserializer)?;
        codes
            .map(|codes| {
                codes
                    .iter()
                    .map(|code| {
                        weekday_from_code(code)
                            .ok_or_else(|| D::Error::custom(format!("unknown weekday code {code}")))
                    })
                    .collect()
            })
            .transpose()
    }
}

const fn default_interval() -> u32 {
    1
}

/// Structured recurrence rule embedded on a recurrence parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    /// Every N frequency units.
    #[serde(default = "default_interval")]
    pub interval: u32,
    /// Terminal bound on generated instances.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    /// No instance may start after this instant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub until: Option<DateTime<Utc>>,
    /// Weekday restriction; only meaningful for weekly frequency.
    #[serde(default, with = "by_day_codes", skip_serializing_if = "Option::is_none")]
    pub by_day: Option<Vec<Weekday>>,
    /// Day-of-month anchor; only meaningful for monthly frequency.
    /// Clamped to the target month's last day when it overshoots.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by_month_day: Option<u32>,
}

impl RecurrenceRule {
    #[must_use]
    pub const fn new(frequency: Frequency) -> Self {
        Self {
            frequency,
            interval: 1,
            count: None,
            until: None,
            by_day: None,
            by_month_day: None,
        }
    }

    /// ## Summary
    /// Checks the bounds a well-formed rule must satisfy.
    ///
    /// The frequency is already enum-typed; this covers the numeric
    /// fields: `interval >= 1`, `count >= 1` when present, and
    /// `by_month_day` within `1..=31` when present.
    #[must_use]
    pub fn validate(&self) -> bool {
        if self.interval < 1 {
            return false;
        }
        if matches!(self.count, Some(0)) {
            return false;
        }
        if let Some(day) = self.by_month_day
            && !(1..=31).contains(&day)
        {
            return false;
        }
        true
    }

    /// ## Summary
    /// Validates a loose, user-supplied rule value before persisting.
    ///
    /// `frequency` must be one of the four known codes; `interval` and
    /// `count`, when present, must be positive integers. Unknown extra
    /// fields are ignored.
    #[must_use]
    pub fn validate_value(value: &serde_json::Value) -> bool {
        let Some(object) = value.as_object() else {
            return false;
        };

        let frequency_ok = object
            .get("frequency")
            .and_then(serde_json::Value::as_str)
            .and_then(Frequency::from_code)
            .is_some();
        if !frequency_ok {
            return false;
        }

        for field in ["interval", "count"] {
            if let Some(raw) = object.get(field)
                && raw.as_u64().is_none_or(|n| n == 0)
            {
                return false;
            }
        }

        true
    }
}
