//! Reporting period selection (last N days, or everything).

use crate::error::{EngineError, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Window of history shown on the chart, counted back from `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ReportingPeriod {
    Days(u32),
    #[default]
    All,
}

impl ReportingPeriod {
    /// The periods offered by the dashboard's period selector.
    pub const PRESETS: [ReportingPeriod; 5] = [
        ReportingPeriod::Days(30),
        ReportingPeriod::Days(90),
        ReportingPeriod::Days(180),
        ReportingPeriod::Days(365),
        ReportingPeriod::All,
    ];

    /// Parse `"30d"`, `"90"`, `"all"` and the like.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        let digits = trimmed.strip_suffix(['d', 'D']).unwrap_or(trimmed);
        match digits.parse::<u32>() {
            Ok(0) | Err(_) => Err(EngineError::InvalidPeriod(input.to_string())),
            Ok(days) => Ok(Self::Days(days)),
        }
    }

    /// Earliest instant included in the period, or `None` when nothing is
    /// cut (`All`, or a window reaching past the representable range).
    pub fn cutoff(self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Self::Days(days) => now.checked_sub_signed(Duration::days(i64::from(days))),
            Self::All => None,
        }
    }
}

impl fmt::Display for ReportingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Days(days) => write!(f, "{days}d"),
            Self::All => write!(f, "all"),
        }
    }
}

impl FromStr for ReportingPeriod {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ReportingPeriod {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<ReportingPeriod> for String {
    fn from(period: ReportingPeriod) -> String {
        period.to_string()
    }
}
