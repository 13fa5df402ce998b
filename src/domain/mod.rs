//! Domain types for watch tracking with strong typing.
//!
//! Watch state is a closed enumeration rather than ad hoc strings, and all
//! catalog identifiers are carried in one canonical key form so snapshot and
//! watch rows cannot diverge on formatting.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-user consumption state for a series or season.
///
/// Stored as an uppercase string column; every branch point over this enum is
/// exhaustive so a new state cannot be half-wired.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WatchStatus {
    #[sea_orm(string_value = "PLANNING")]
    Planning,
    #[sea_orm(string_value = "WATCHING")]
    Watching,
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
    #[sea_orm(string_value = "DROPPED")]
    Dropped,
    #[sea_orm(string_value = "PAUSED")]
    Paused,
}

impl WatchStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Planning => "PLANNING",
            Self::Watching => "WATCHING",
            Self::Completed => "COMPLETED",
            Self::Dropped => "DROPPED",
            Self::Paused => "PAUSED",
        }
    }
}

impl fmt::Display for WatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical string key for a catalog ID.
///
/// Snapshot and watch rows are keyed by this form; every path from a numeric
/// catalog ID to a row key goes through here.
#[must_use]
pub fn media_key(id: i64) -> String {
    id.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_serde() {
        let json = serde_json::to_string(&WatchStatus::Planning).unwrap();
        assert_eq!(json, "\"PLANNING\"");
        let back: WatchStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, WatchStatus::Planning);
    }

    #[test]
    fn status_display_matches_storage_form() {
        assert_eq!(WatchStatus::Completed.to_string(), "COMPLETED");
        assert_eq!(WatchStatus::Paused.as_str(), "PAUSED");
    }

    #[test]
    fn media_key_is_decimal_form() {
        assert_eq!(media_key(603), "603");
        assert_eq!(media_key(1399), "1399");
    }
}
