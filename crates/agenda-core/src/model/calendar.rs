//! Calendar model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Calendar kind without storage dependencies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalendarKind {
    Business,
    Personal,
}

impl CalendarKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Business => "business",
            Self::Personal => "personal",
        }
    }
}

impl std::fmt::Display for CalendarKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user's calendar, looked up through the query gateway for
/// blocked-slot display metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calendar {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub kind: CalendarKind,
    /// Default display color for appointments created without one.
    pub color: Option<String>,
    pub is_default: bool,
}
