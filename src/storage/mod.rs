/// Storage layer for persisting habit data
///
/// This module handles all database operations using SQLite. It provides
/// a clean interface for storing and retrieving habits and their dated
/// records, plus the streak aggregations the query layer needs.

pub mod sqlite;
pub mod migrations;

// Re-export the main storage types
pub use sqlite::*;

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::{
    Frequency, Habit, HabitId, HabitPatch, HabitRecord, NewHabit, RecordId, Status, StreakState,
};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Database query error: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("Habit not found: {habit_id}")]
    HabitNotFound { habit_id: HabitId },

    #[error("Record not found: {record_id}")]
    RecordNotFound { record_id: RecordId },

    #[error("A habit named '{name}' already exists")]
    DuplicateName { name: String },

    #[error("Migration error: {0}")]
    Migration(String),
}

impl StorageError {
    /// Whether this error means a referenced habit or record is absent
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StorageError::HabitNotFound { .. } | StorageError::RecordNotFound { .. }
        )
    }
}

/// Trait defining the storage interface for habits and their records
///
/// This is the record store adapter the streak protocols are written
/// against. It allows swapping SQLite for another backend (or an in-memory
/// fake in tests) without touching the operation layer.
pub trait RecordStore {
    /// Insert a new habit, returning its store-assigned id
    fn insert_habit(&self, habit: &NewHabit) -> Result<HabitId, StorageError>;

    /// Get a habit by ID
    fn get_habit(&self, habit_id: HabitId) -> Result<Habit, StorageError>;

    /// List all habits
    fn list_habits(&self) -> Result<Vec<Habit>, StorageError>;

    /// List habits with a given frequency
    fn habits_by_frequency(&self, frequency: Frequency) -> Result<Vec<Habit>, StorageError>;

    /// Apply a partial update to an existing habit
    fn update_habit(&self, habit_id: HabitId, patch: &HabitPatch) -> Result<(), StorageError>;

    /// Delete a habit and, via cascade, all of its records
    fn delete_habit(&self, habit_id: HabitId) -> Result<(), StorageError>;

    /// Insert a new record with its computed streak state
    fn insert_record(
        &self,
        habit_id: HabitId,
        date: NaiveDate,
        status: Status,
        streak: StreakState,
    ) -> Result<RecordId, StorageError>;

    /// Get a record by ID
    fn get_record(&self, record_id: RecordId) -> Result<HabitRecord, StorageError>;

    /// The most recent record for a habit, by (date, id) descending
    fn latest_record(&self, habit_id: HabitId) -> Result<Option<HabitRecord>, StorageError>;

    /// All records for one habit in streak-history order (date, id ascending)
    fn records_for_habit(&self, habit_id: HabitId) -> Result<Vec<HabitRecord>, StorageError>;

    /// All records across all habits
    fn list_records(&self) -> Result<Vec<HabitRecord>, StorageError>;

    /// Overwrite a record's status and streak state in place
    fn update_record_row(
        &self,
        record_id: RecordId,
        status: Status,
        streak: StreakState,
    ) -> Result<(), StorageError>;

    /// Overwrite status and streak state of several records in one transaction
    fn rewrite_records(
        &self,
        updates: &[(RecordId, Status, StreakState)],
    ) -> Result<(), StorageError>;

    /// Delete a record and apply streak rewrites to the survivors, all in
    /// one transaction
    ///
    /// The deletion and the repair of later records commit together; a
    /// failure rolls both back so the chain is never half-updated.
    fn delete_record(
        &self,
        record_id: RecordId,
        rewrites: &[(RecordId, Status, StreakState)],
    ) -> Result<(), StorageError>;

    /// Maximum stored longest_streak, over one habit or over everything
    ///
    /// Returns None when no records are in scope, so callers can tell an
    /// empty history apart from a genuine longest streak of zero.
    fn max_longest_streak(&self, habit_id: Option<HabitId>) -> Result<Option<u32>, StorageError>;
}
