//! Common types used throughout Flex API

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Account role. Studios post listings, instructors apply to them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Instructor,
    Studio,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Instructor => "instructor",
            Self::Studio => "studio",
        }
    }

    pub fn can_post_listings(&self) -> bool {
        matches!(self, Self::Studio)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse failure for a role string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("User type must be instructor or studio, got {0:?}")]
pub struct UnknownRole(pub String);

impl FromStr for UserRole {
    type Err = UnknownRole;

    /// Exact match only; "Studio" or " studio" are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "instructor" => Ok(Self::Instructor),
            "studio" => Ok(Self::Studio),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Weekday names accepted for `classDateDay`, in calendar order
pub const WEEKDAYS: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

/// Normalize a weekday name to its lowercase form, if it is one
pub fn normalize_weekday(value: &str) -> Option<&'static str> {
    let lowered = value.trim().to_lowercase();
    WEEKDAYS.iter().copied().find(|day| *day == lowered)
}
