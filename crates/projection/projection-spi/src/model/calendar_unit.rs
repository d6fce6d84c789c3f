//! Calendar units used for the time window and the projection horizon.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ProjectionError;

const SECOND_MS: i64 = 1_000;
const MINUTE_MS: i64 = 60 * SECOND_MS;
const HOUR_MS: i64 = 60 * MINUTE_MS;
const DAY_MS: i64 = 24 * HOUR_MS;
const YEAR_MS: i64 = 365 * DAY_MS;
const MONTH_MS: i64 = YEAR_MS / 12;

/// Unit of one window/horizon tick.
///
/// Months and years are fixed-length approximations (a year is 365 days and a
/// month is a twelfth of that); there is no leap or calendar awareness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
    Months,
    #[default]
    Years,
}

impl CalendarUnit {
    /// All units, shortest first.
    pub const ALL: [CalendarUnit; 6] = [
        CalendarUnit::Seconds,
        CalendarUnit::Minutes,
        CalendarUnit::Hours,
        CalendarUnit::Days,
        CalendarUnit::Months,
        CalendarUnit::Years,
    ];

    /// Length of one unit in milliseconds.
    pub fn as_millis(&self) -> i64 {
        match self {
            CalendarUnit::Seconds => SECOND_MS,
            CalendarUnit::Minutes => MINUTE_MS,
            CalendarUnit::Hours => HOUR_MS,
            CalendarUnit::Days => DAY_MS,
            CalendarUnit::Months => MONTH_MS,
            CalendarUnit::Years => YEAR_MS,
        }
    }

    /// Milliseconds spanned by `count` units, or `None` on overflow.
    pub fn span_millis(&self, count: i64) -> Option<i64> {
        count.checked_mul(self.as_millis())
    }

    /// Lowercase name as accepted by [`FromStr`].
    pub fn as_str(&self) -> &'static str {
        match self {
            CalendarUnit::Seconds => "seconds",
            CalendarUnit::Minutes => "minutes",
            CalendarUnit::Hours => "hours",
            CalendarUnit::Days => "days",
            CalendarUnit::Months => "months",
            CalendarUnit::Years => "years",
        }
    }
}

impl fmt::Display for CalendarUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CalendarUnit {
    type Err = ProjectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CalendarUnit::ALL
            .into_iter()
            .find(|unit| unit.as_str() == s.trim().to_ascii_lowercase())
            .ok_or_else(|| ProjectionError::UnknownTimeUnit(s.to_string()))
    }
}
