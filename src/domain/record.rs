/// HabitRecord entity for dated habit observations
///
/// This module defines the HabitRecord struct that represents a single
/// completed-or-missed observation of a habit on a specific day, annotated
/// with the streak state that was valid at that point in the history.

use serde::{Deserialize, Serialize};
use chrono::NaiveDate;

use crate::domain::{HabitId, RecordId, Status, StreakState};

/// One dated observation of a habit
///
/// Records ordered by (date, id) form the habit's streak history. The
/// embedded streak state is the output of the streak engine at this
/// position in that ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitRecord {
    /// Unique identifier for this record
    pub id: RecordId,
    /// Which habit this record belongs to
    pub habit_id: HabitId,
    /// Which day this observation is for
    pub date: NaiveDate,
    /// Completed or missed
    pub status: Status,
    /// Streak counters as of this record
    #[serde(flatten)]
    pub streak: StreakState,
}

impl HabitRecord {
    /// Create a record from existing data (used when loading from database)
    pub fn from_existing(
        id: RecordId,
        habit_id: HabitId,
        date: NaiveDate,
        status: Status,
        streak: StreakState,
    ) -> Self {
        Self {
            id,
            habit_id,
            date,
            status,
            streak,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_serializes_with_flat_streak_fields() {
        let record = HabitRecord::from_existing(
            RecordId(7),
            HabitId(1),
            NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            Status::Completed,
            StreakState::new(2, 4),
        );

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["habit_id"], 1);
        assert_eq!(json["status"], "completed");
        assert_eq!(json["current"], 2);
        assert_eq!(json["longest"], 4);
    }
}
