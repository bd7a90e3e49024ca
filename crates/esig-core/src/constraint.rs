//! Level constraints
//!
//! Every check of every building block is governed by a `LevelConstraint`:
//! the level decides whether a failed check stops the chain (FAIL), is
//! recorded as a warning (WARN) or an information (INFORM), or whether the
//! check is not executed at all (IGNORE).

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Level {
    Ignore = 0,
    Inform = 1,
    Warn = 2,
    Fail = 3,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Ignore => write!(f, "IGNORE"),
            Level::Inform => write!(f, "INFORM"),
            Level::Warn => write!(f, "WARN"),
            Level::Fail => write!(f, "FAIL"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeUnit {
    Milliseconds,
    Seconds,
    Minutes,
    Hours,
    Days,
}

/// A duration parameter, e.g. the maximum revocation freshness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub value: u64,
    pub unit: TimeUnit,
}

impl TimeWindow {
    pub fn new(value: u64, unit: TimeUnit) -> Self {
        Self { value, unit }
    }

    pub fn to_duration(&self) -> Duration {
        let value = i64::try_from(self.value).unwrap_or(i64::MAX);
        match self.unit {
            TimeUnit::Milliseconds => Duration::milliseconds(value),
            TimeUnit::Seconds => Duration::seconds(value.min(i64::MAX / 1_000)),
            TimeUnit::Minutes => Duration::minutes(value.min(i64::MAX / 60_000)),
            TimeUnit::Hours => Duration::hours(value.min(i64::MAX / 3_600_000)),
            TimeUnit::Days => Duration::days(value.min(i64::MAX / 86_400_000)),
        }
    }

    pub fn is_zero(&self) -> bool {
        self.value == 0
    }
}

/// A level plus optional parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "LevelConstraintRepr")]
pub struct LevelConstraint {
    pub level: Level,

    /// Accepted values (algorithms, policy OIDs, key usages...)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub window: Option<TimeWindow>,
}

/// Accepts `FAIL` as well as `{ level: FAIL, values: [...] }`
#[derive(Deserialize)]
#[serde(untagged)]
enum LevelConstraintRepr {
    Bare(Level),
    Full {
        level: Level,
        #[serde(default)]
        values: Vec<String>,
        #[serde(default)]
        window: Option<TimeWindow>,
    },
}

impl From<LevelConstraintRepr> for LevelConstraint {
    fn from(repr: LevelConstraintRepr) -> Self {
        match repr {
            LevelConstraintRepr::Bare(level) => LevelConstraint::new(level),
            LevelConstraintRepr::Full { level, values, window } => LevelConstraint {
                level,
                values,
                window,
            },
        }
    }
}

/// Wildcard accepted in `values`
pub const ANY_VALUE: &str = "*";

impl LevelConstraint {
    pub fn new(level: Level) -> Self {
        Self {
            level,
            values: Vec::new(),
            window: None,
        }
    }

    pub fn fail() -> Self {
        Self::new(Level::Fail)
    }

    pub fn warn() -> Self {
        Self::new(Level::Warn)
    }

    pub fn inform() -> Self {
        Self::new(Level::Inform)
    }

    pub fn ignore() -> Self {
        Self::new(Level::Ignore)
    }

    pub fn with_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_window(mut self, window: TimeWindow) -> Self {
        self.window = Some(window);
        self
    }

    pub fn is_ignored(&self) -> bool {
        self.level == Level::Ignore
    }

    /// No values configured, a wildcard, or an exact (case-insensitive) match
    pub fn accepts(&self, value: &str) -> bool {
        self.values.is_empty()
            || self
                .values
                .iter()
                .any(|v| v == ANY_VALUE || v.eq_ignore_ascii_case(value))
    }

    /// Exact match only; wildcards and empty lists do not count
    pub fn lists(&self, value: &str) -> bool {
        self.values.iter().any(|v| v.eq_ignore_ascii_case(value))
    }

    /// Window if configured and non-zero
    pub fn duration(&self) -> Option<Duration> {
        self.window
            .filter(|w| !w.is_zero())
            .map(|w| w.to_duration())
    }
}

impl Default for LevelConstraint {
    fn default() -> Self {
        Self::fail()
    }
}
