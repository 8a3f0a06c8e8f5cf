/// End-to-end streak behavior over a real SQLite database
use habitd::*;
use chrono::NaiveDate;
use tempfile::NamedTempFile;

fn storage() -> (SqliteStorage, NamedTempFile) {
    let temp_file = NamedTempFile::new().expect("Failed to create temp file");
    let storage =
        SqliteStorage::new(temp_file.path().to_path_buf()).expect("Failed to create storage");
    // Return the tempfile guard so the database file outlives this function
    (storage, temp_file)
}

fn make_habit(storage: &SqliteStorage, name: &str, frequency: Frequency) -> HabitId {
    create_habit(
        storage,
        CreateHabitParams {
            name: name.to_string(),
            description: None,
            frequency,
        },
    )
    .expect("Failed to create habit")
    .habit_id
}

fn log_on(
    storage: &SqliteStorage,
    habit_id: HabitId,
    status: Status,
    date: NaiveDate,
) -> CreateRecordResponse {
    create_record(
        storage,
        CreateRecordParams {
            habit_id,
            status,
            date: Some(date),
        },
    )
    .expect("Failed to create record")
}

fn day(n: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 2, n).unwrap()
}

#[cfg(test)]
mod streak_integration_tests {
    use super::*;
    use Status::*;

    #[test]
    fn test_read_habit_scenario() {
        let (storage, _db_file) = storage();
        let read = make_habit(&storage, "Read", Frequency::Daily);

        let expected = [(1, 1), (2, 2), (0, 2), (1, 2)];
        let statuses = [Completed, Completed, Missed, Completed];

        for (n, (status, (current, longest))) in statuses.iter().zip(expected).enumerate() {
            let response = log_on(&storage, read, *status, day(n as u32 + 1));
            assert_eq!(response.streak, StreakState::new(current, longest));
        }
    }

    #[test]
    fn test_final_longest_is_max_current_over_any_sequence() {
        let (storage, _db_file) = storage();
        let habit = make_habit(&storage, "Practice", Frequency::Daily);

        let sequence = [
            Completed, Missed, Completed, Completed, Completed, Missed, Completed, Completed,
            Missed, Missed, Completed,
        ];

        let mut max_current = 0;
        let mut last = StreakState::default();
        for (n, status) in sequence.iter().enumerate() {
            last = log_on(&storage, habit, *status, day(n as u32 + 1)).streak;
            max_current = max_current.max(last.current);
        }

        assert_eq!(last.longest, max_current);
        assert_eq!(longest_streak_for(&storage, habit).unwrap(), Some(max_current));
    }

    #[test]
    fn test_global_longest_across_habits() {
        let (storage, _db_file) = storage();
        let read = make_habit(&storage, "Read", Frequency::Daily);
        let run = make_habit(&storage, "Run", Frequency::Daily);

        for n in 1..=3 {
            log_on(&storage, read, Completed, day(n));
        }
        for n in 1..=7 {
            log_on(&storage, run, Completed, day(n));
        }

        assert_eq!(longest_streak(&storage).unwrap().longest_streak, 7);
    }

    #[test]
    fn test_streak_survives_reopening_the_database() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let db_path = temp_file.path().to_path_buf();

        let habit_id = {
            let storage = SqliteStorage::new(db_path.clone()).unwrap();
            let habit_id = make_habit(&storage, "Read", Frequency::Daily);
            log_on(&storage, habit_id, Completed, day(1));
            log_on(&storage, habit_id, Completed, day(2));
            habit_id
        };

        // A fresh connection picks up where the old one left off
        let storage = SqliteStorage::new(db_path).unwrap();
        let response = log_on(&storage, habit_id, Completed, day(3));
        assert_eq!(response.streak, StreakState::new(3, 3));
    }

    #[test]
    fn test_not_found_signals() {
        let (storage, _db_file) = storage();

        let update = update_record(
            &storage,
            UpdateRecordParams {
                record_id: RecordId(404),
                status: Completed,
            },
        );
        assert!(matches!(
            update,
            Err(ServerError::Storage(StorageError::RecordNotFound { .. }))
        ));

        let habit = make_habit(&storage, "Stretch", Frequency::Weekly);
        assert_eq!(longest_streak_for(&storage, habit).unwrap(), None);
    }

    #[test]
    fn test_habit_lifecycle_with_records() {
        let (storage, _db_file) = storage();
        let habit = make_habit(&storage, "Journal", Frequency::Daily);
        log_on(&storage, habit, Completed, day(1));

        // Partial update keeps untouched fields
        update_habit(
            &storage,
            UpdateHabitParams {
                habit_id: habit,
                patch: HabitPatch {
                    description: Some("Every evening".to_string()),
                    ..Default::default()
                },
            },
        )
        .unwrap();
        let loaded = get_habit(&storage, habit).unwrap();
        assert_eq!(loaded.name, "Journal");
        assert_eq!(loaded.description.as_deref(), Some("Every evening"));

        // Deleting the habit takes the streak history with it
        delete_habit(&storage, habit).unwrap();
        assert!(list_records(&storage).unwrap().is_empty());
        assert_eq!(longest_streak(&storage).unwrap().longest_streak, 0);
    }

    #[test]
    fn test_mid_history_edit_repairs_the_chain() {
        let (storage, _db_file) = storage();
        let habit = make_habit(&storage, "Read", Frequency::Daily);

        log_on(&storage, habit, Completed, day(1));
        let miss = log_on(&storage, habit, Missed, day(2)).record_id;
        log_on(&storage, habit, Completed, day(3));

        update_record(
            &storage,
            UpdateRecordParams {
                record_id: miss,
                status: Completed,
            },
        )
        .unwrap();

        let states: Vec<StreakState> = records_for_habit(&storage, habit)
            .unwrap()
            .iter()
            .map(|r| r.streak)
            .collect();
        assert_eq!(
            states,
            vec![
                StreakState::new(1, 1),
                StreakState::new(2, 2),
                StreakState::new(3, 3),
            ]
        );
        assert_eq!(longest_streak_for(&storage, habit).unwrap(), Some(3));
    }
}
