/// Core types and enums used throughout the domain layer
///
/// This module defines the fundamental types like Status, Frequency, and the
/// ID newtypes that are used by Habit, HabitRecord, and the storage layer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::DomainError;

/// Unique identifier for a habit
///
/// This is a wrapper around the store-assigned row id to provide type
/// safety - you can't accidentally pass a habit ID where a record ID is
/// expected. Ids are assigned by the storage layer on insert and are
/// monotonically increasing, which makes "latest record" tie-breaks on a
/// shared date deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HabitId(pub i64);

impl fmt::Display for HabitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a habit record
///
/// Similar to HabitId but for individual dated observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub i64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of one dated observation of a habit
///
/// Every record carries exactly one of these. The streak engine is total
/// over this enum, so invalid status strings are rejected here at the
/// boundary and never reach it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// The habit was done on this date
    Completed,
    /// The habit was skipped on this date, breaking the streak
    Missed,
}

impl Status {
    /// String form used in the database CHECK constraint
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Completed => "completed",
            Status::Missed => "missed",
        }
    }
}

impl FromStr for Status {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "completed" => Ok(Status::Completed),
            "missed" => Ok(Status::Missed),
            other => Err(DomainError::InvalidStatus(format!(
                "Invalid status '{}'. Valid options: completed, missed", other
            ))),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How often a habit should be performed
///
/// Frequency is descriptive metadata on the habit; streaks are a fold over
/// the record history regardless of cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// Every single day
    Daily,
    /// Once a week
    Weekly,
    /// Once a month
    Monthly,
}

impl Frequency {
    /// String form used in the database CHECK constraint
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
        }
    }
}

impl FromStr for Frequency {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            other => Err(DomainError::InvalidFrequency(format!(
                "Invalid frequency '{}'. Valid options: daily, weekly, monthly", other
            ))),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
