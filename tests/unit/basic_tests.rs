/// Basic unit tests to verify core functionality
use habitd::*;
use tempfile::NamedTempFile;

#[cfg(test)]
mod basic_unit_tests {
    use super::*;

    #[test]
    fn test_habit_draft_creation() {
        let habit = NewHabit::new(
            "Test Habit".to_string(),
            Some("A test habit".to_string()),
            Frequency::Daily,
        );

        assert!(habit.is_ok());
        let habit = habit.unwrap();
        assert_eq!(habit.name, "Test Habit");
    }

    #[test]
    fn test_streak_advance_basics() {
        let first = StreakState::default().advance(Status::Completed);
        assert_eq!(first, StreakState::new(1, 1));

        let broken = StreakState::new(4, 6).advance(Status::Missed);
        assert_eq!(broken, StreakState::new(0, 6));
    }

    #[test]
    fn test_status_parsing_boundary() {
        assert!("completed".parse::<Status>().is_ok());
        assert!("skipped".parse::<Status>().is_err());
    }

    #[test]
    fn test_server_creation() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let server = HabitTracker::new(temp_file.path().to_path_buf());
        assert!(server.is_ok());
    }

    #[test]
    fn test_storage_creation() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let storage = SqliteStorage::new(temp_file.path().to_path_buf());
        assert!(storage.is_ok());
    }
}
