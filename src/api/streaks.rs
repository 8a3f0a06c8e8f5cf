/// Streak aggregation queries
///
/// Pure reads over the stored per-record streak states. Because every
/// record carries the longest streak as of its position, both queries are
/// a single MAX over the store rather than a re-derivation from history.

use serde::Serialize;

use crate::domain::HabitId;
use crate::storage::RecordStore;
use crate::ServerError;

/// Response for the global longest-streak query
#[derive(Debug, Serialize)]
pub struct LongestStreakResponse {
    pub longest_streak: u32,
}

/// Longest streak ever achieved across all habits
///
/// An empty store yields 0; this query never fails on absence.
pub fn longest_streak<S: RecordStore>(storage: &S) -> Result<LongestStreakResponse, ServerError> {
    let longest = storage.max_longest_streak(None)?.unwrap_or(0);
    Ok(LongestStreakResponse {
        longest_streak: longest,
    })
}

/// Longest streak for one habit
///
/// None means the habit has no records at all, which callers can
/// distinguish from a genuine longest streak of zero.
pub fn longest_streak_for<S: RecordStore>(
    storage: &S,
    habit_id: HabitId,
) -> Result<Option<u32>, ServerError> {
    Ok(storage.max_longest_streak(Some(habit_id))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::habits::{create_habit, CreateHabitParams};
    use crate::api::records::{create_record, CreateRecordParams};
    use crate::domain::{Frequency, Status};
    use crate::storage::SqliteStorage;

    fn habit(storage: &SqliteStorage, name: &str) -> HabitId {
        create_habit(
            storage,
            CreateHabitParams {
                name: name.to_string(),
                description: None,
                frequency: Frequency::Daily,
            },
        )
        .unwrap()
        .habit_id
    }

    fn run_of_completions(storage: &SqliteStorage, habit_id: HabitId, days: u32) {
        for day in 1..=days {
            create_record(
                storage,
                CreateRecordParams {
                    habit_id,
                    status: Status::Completed,
                    date: Some(
                        chrono::NaiveDate::from_ymd_opt(2025, 1, day).unwrap(),
                    ),
                },
            )
            .unwrap();
        }
    }

    #[test]
    fn test_global_longest_over_empty_store_is_zero() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        assert_eq!(longest_streak(&storage).unwrap().longest_streak, 0);
    }

    #[test]
    fn test_global_longest_picks_the_best_habit() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        let read = habit(&storage, "Read");
        let run = habit(&storage, "Run");

        run_of_completions(&storage, read, 3);
        run_of_completions(&storage, run, 7);

        assert_eq!(longest_streak(&storage).unwrap().longest_streak, 7);
        assert_eq!(longest_streak_for(&storage, read).unwrap(), Some(3));
        assert_eq!(longest_streak_for(&storage, run).unwrap(), Some(7));
    }

    #[test]
    fn test_recordless_habit_is_absent_not_zero() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        let lonely = habit(&storage, "Stretch");

        assert_eq!(longest_streak_for(&storage, lonely).unwrap(), None);
    }

    #[test]
    fn test_longest_survives_a_miss() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        let read = habit(&storage, "Read");
        run_of_completions(&storage, read, 4);

        create_record(
            &storage,
            CreateRecordParams {
                habit_id: read,
                status: Status::Missed,
                date: Some(chrono::NaiveDate::from_ymd_opt(2025, 1, 5).unwrap()),
            },
        )
        .unwrap();

        assert_eq!(longest_streak_for(&storage, read).unwrap(), Some(4));
    }
}
