/// SQLite implementation of the record store interface
///
/// This module provides the concrete SQLite implementation for storing
/// and retrieving habits and records. It handles all SQL queries, data
/// conversion, and mapping of schema constraint failures onto typed
/// storage errors.

use std::path::PathBuf;
use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::{params, params_from_iter, Connection, Row};

use crate::domain::{
    Frequency, Habit, HabitId, HabitPatch, HabitRecord, NewHabit, RecordId, Status, StreakState,
};
use crate::storage::{migrations, RecordStore, StorageError};

/// SQLite-based storage implementation
///
/// This struct holds a connection to the SQLite database and implements
/// all the storage operations defined in the RecordStore trait. One
/// instance is opened at startup and injected into the service; operations
/// never open connections of their own.
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Create a new SQLite storage instance
    ///
    /// This opens the database file and runs any necessary migrations
    /// to ensure the schema is up to date.
    pub fn new(db_path: PathBuf) -> Result<Self, StorageError> {
        let conn = Connection::open(&db_path)
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;

        Self::from_connection(conn).map(|storage| {
            tracing::info!("SQLite storage initialized at: {:?}", db_path);
            storage
        })
    }

    /// Create a storage instance backed by an in-memory database
    ///
    /// Mainly useful for tests that don't need persistence across runs.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, StorageError> {
        // Foreign keys are off by default in SQLite; the record cascade
        // depends on them.
        conn.execute("PRAGMA foreign_keys = ON", [])
            .map_err(|e| StorageError::Connection(format!("Failed to enable foreign keys: {}", e)))?;

        migrations::initialize_database(&conn)?;

        Ok(Self { conn })
    }

    /// Map a row of the habits table onto the domain entity
    fn habit_from_row(row: &Row<'_>) -> rusqlite::Result<Habit> {
        let frequency_str: String = row.get(3)?;
        let frequency = Frequency::from_str(&frequency_str).map_err(|_| {
            rusqlite::Error::InvalidColumnType(3, "Invalid frequency".to_string(), rusqlite::types::Type::Text)
        })?;

        Ok(Habit::from_existing(
            HabitId(row.get(0)?),
            row.get(1)?, // name
            row.get(2)?, // description
            frequency,
            row.get(4)?, // created_date
        ))
    }

    /// Map a row of the habit_records table onto the domain entity
    fn record_from_row(row: &Row<'_>) -> rusqlite::Result<HabitRecord> {
        let status_str: String = row.get(3)?;
        let status = Status::from_str(&status_str).map_err(|_| {
            rusqlite::Error::InvalidColumnType(3, "Invalid status".to_string(), rusqlite::types::Type::Text)
        })?;

        Ok(HabitRecord::from_existing(
            RecordId(row.get(0)?),
            HabitId(row.get(1)?),
            row.get(2)?, // date
            status,
            StreakState::new(row.get(4)?, row.get(5)?),
        ))
    }

    /// Whether a query error is a UNIQUE constraint failure
    fn is_unique_violation(err: &rusqlite::Error) -> bool {
        matches!(
            err,
            rusqlite::Error::SqliteFailure(e, _)
                if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        )
    }

    /// Whether a query error is a FOREIGN KEY constraint failure
    fn is_foreign_key_violation(err: &rusqlite::Error) -> bool {
        matches!(
            err,
            rusqlite::Error::SqliteFailure(e, _)
                if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY
        )
    }
}

impl RecordStore for SqliteStorage {
    /// Insert a new habit and return its store-assigned id
    fn insert_habit(&self, habit: &NewHabit) -> Result<HabitId, StorageError> {
        let result = self.conn.execute(
            "INSERT INTO habits (name, description, frequency) VALUES (?1, ?2, ?3)",
            params![habit.name, habit.description, habit.frequency.as_str()],
        );

        match result {
            Ok(_) => {
                let habit_id = HabitId(self.conn.last_insert_rowid());
                tracing::debug!("Created habit: {} ({})", habit.name, habit_id);
                Ok(habit_id)
            }
            Err(e) if Self::is_unique_violation(&e) => Err(StorageError::DuplicateName {
                name: habit.name.clone(),
            }),
            Err(e) => Err(StorageError::Query(e)),
        }
    }

    /// Get a habit by its ID
    fn get_habit(&self, habit_id: HabitId) -> Result<Habit, StorageError> {
        let result = self.conn.query_row(
            "SELECT id, name, description, frequency, created_date FROM habits WHERE id = ?1",
            params![habit_id.0],
            Self::habit_from_row,
        );

        match result {
            Ok(habit) => Ok(habit),
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                Err(StorageError::HabitNotFound { habit_id })
            }
            Err(e) => Err(StorageError::Query(e)),
        }
    }

    /// List all habits, oldest first
    fn list_habits(&self) -> Result<Vec<Habit>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, description, frequency, created_date FROM habits ORDER BY id",
        )?;

        let habit_iter = stmt.query_map([], Self::habit_from_row)?;

        let mut habits = Vec::new();
        for habit in habit_iter {
            habits.push(habit?);
        }

        Ok(habits)
    }

    /// List habits matching a specific frequency
    fn habits_by_frequency(&self, frequency: Frequency) -> Result<Vec<Habit>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, description, frequency, created_date
             FROM habits WHERE frequency = ?1 ORDER BY id",
        )?;

        let habit_iter = stmt.query_map(params![frequency.as_str()], Self::habit_from_row)?;

        let mut habits = Vec::new();
        for habit in habit_iter {
            habits.push(habit?);
        }

        Ok(habits)
    }

    /// Apply a partial update, touching only the supplied fields
    fn update_habit(&self, habit_id: HabitId, patch: &HabitPatch) -> Result<(), StorageError> {
        if patch.is_empty() {
            // Nothing to change, but the habit must still exist
            return self.get_habit(habit_id).map(|_| ());
        }

        let mut fields = Vec::new();
        let mut values: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref name) = patch.name {
            fields.push("name = ?");
            values.push(Box::new(name.clone()));
        }
        if let Some(ref description) = patch.description {
            fields.push("description = ?");
            values.push(Box::new(description.clone()));
        }
        if let Some(frequency) = patch.frequency {
            fields.push("frequency = ?");
            values.push(Box::new(frequency.as_str()));
        }
        values.push(Box::new(habit_id.0));

        let sql = format!("UPDATE habits SET {} WHERE id = ?", fields.join(", "));
        let result = self.conn.execute(&sql, params_from_iter(values.iter().map(|v| v.as_ref())));

        match result {
            Ok(0) => Err(StorageError::HabitNotFound { habit_id }),
            Ok(_) => {
                tracing::debug!("Updated habit {}", habit_id);
                Ok(())
            }
            Err(e) if Self::is_unique_violation(&e) => Err(StorageError::DuplicateName {
                name: patch.name.clone().unwrap_or_default(),
            }),
            Err(e) => Err(StorageError::Query(e)),
        }
    }

    /// Delete a habit together with its records
    fn delete_habit(&self, habit_id: HabitId) -> Result<(), StorageError> {
        // One transaction so the habit row and its cascaded records go
        // together or not at all.
        let tx = self.conn.unchecked_transaction()?;
        let rows_affected = tx.execute("DELETE FROM habits WHERE id = ?1", params![habit_id.0])?;

        if rows_affected == 0 {
            return Err(StorageError::HabitNotFound { habit_id });
        }

        tx.commit()?;
        tracing::debug!("Deleted habit {} and its records", habit_id);
        Ok(())
    }

    /// Insert a new record with its computed streak state
    fn insert_record(
        &self,
        habit_id: HabitId,
        date: NaiveDate,
        status: Status,
        streak: StreakState,
    ) -> Result<RecordId, StorageError> {
        let result = self.conn.execute(
            "INSERT INTO habit_records (habit_id, date, status, current_streak, longest_streak)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![habit_id.0, date, status.as_str(), streak.current, streak.longest],
        );

        match result {
            Ok(_) => {
                let record_id = RecordId(self.conn.last_insert_rowid());
                tracing::debug!("Created record {} for habit {}", record_id, habit_id);
                Ok(record_id)
            }
            // The FK constraint is how "habit must exist" is enforced
            Err(e) if Self::is_foreign_key_violation(&e) => {
                Err(StorageError::HabitNotFound { habit_id })
            }
            Err(e) => Err(StorageError::Query(e)),
        }
    }

    /// Get a record by its ID
    fn get_record(&self, record_id: RecordId) -> Result<HabitRecord, StorageError> {
        let result = self.conn.query_row(
            "SELECT id, habit_id, date, status, current_streak, longest_streak
             FROM habit_records WHERE id = ?1",
            params![record_id.0],
            Self::record_from_row,
        );

        match result {
            Ok(record) => Ok(record),
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                Err(StorageError::RecordNotFound { record_id })
            }
            Err(e) => Err(StorageError::Query(e)),
        }
    }

    /// The most recent record for a habit
    ///
    /// Ties on the date are broken by the higher id, i.e. insertion order,
    /// so the result is deterministic.
    fn latest_record(&self, habit_id: HabitId) -> Result<Option<HabitRecord>, StorageError> {
        let result = self.conn.query_row(
            "SELECT id, habit_id, date, status, current_streak, longest_streak
             FROM habit_records WHERE habit_id = ?1
             ORDER BY date DESC, id DESC LIMIT 1",
            params![habit_id.0],
            Self::record_from_row,
        );

        match result {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(StorageError::Query(e)),
        }
    }

    /// All records for one habit in streak-history order
    fn records_for_habit(&self, habit_id: HabitId) -> Result<Vec<HabitRecord>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, habit_id, date, status, current_streak, longest_streak
             FROM habit_records WHERE habit_id = ?1
             ORDER BY date, id",
        )?;

        let record_iter = stmt.query_map(params![habit_id.0], Self::record_from_row)?;

        let mut records = Vec::new();
        for record in record_iter {
            records.push(record?);
        }

        Ok(records)
    }

    /// All records across all habits
    fn list_records(&self) -> Result<Vec<HabitRecord>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, habit_id, date, status, current_streak, longest_streak
             FROM habit_records ORDER BY habit_id, date, id",
        )?;

        let record_iter = stmt.query_map([], Self::record_from_row)?;

        let mut records = Vec::new();
        for record in record_iter {
            records.push(record?);
        }

        Ok(records)
    }

    /// Overwrite a record's status and streak state in place
    fn update_record_row(
        &self,
        record_id: RecordId,
        status: Status,
        streak: StreakState,
    ) -> Result<(), StorageError> {
        let rows_affected = self.conn.execute(
            "UPDATE habit_records
             SET status = ?2, current_streak = ?3, longest_streak = ?4
             WHERE id = ?1",
            params![record_id.0, status.as_str(), streak.current, streak.longest],
        )?;

        if rows_affected == 0 {
            return Err(StorageError::RecordNotFound { record_id });
        }

        tracing::debug!("Updated record {}", record_id);
        Ok(())
    }

    /// Overwrite status and streak state of several records atomically
    ///
    /// Used by the replay path after an out-of-order edit or deletion; a
    /// failure part-way must not leave a half-rewritten streak chain.
    fn rewrite_records(
        &self,
        updates: &[(RecordId, Status, StreakState)],
    ) -> Result<(), StorageError> {
        let tx = self.conn.unchecked_transaction()?;

        {
            let mut stmt = tx.prepare(
                "UPDATE habit_records
                 SET status = ?2, current_streak = ?3, longest_streak = ?4
                 WHERE id = ?1",
            )?;
            for (record_id, status, streak) in updates {
                stmt.execute(params![record_id.0, status.as_str(), streak.current, streak.longest])?;
            }
        }

        tx.commit()?;
        tracing::debug!("Rewrote {} records", updates.len());
        Ok(())
    }

    /// Delete a record and rewrite the surviving chain atomically
    fn delete_record(
        &self,
        record_id: RecordId,
        rewrites: &[(RecordId, Status, StreakState)],
    ) -> Result<(), StorageError> {
        let tx = self.conn.unchecked_transaction()?;

        let rows_affected =
            tx.execute("DELETE FROM habit_records WHERE id = ?1", params![record_id.0])?;
        if rows_affected == 0 {
            return Err(StorageError::RecordNotFound { record_id });
        }

        {
            let mut stmt = tx.prepare(
                "UPDATE habit_records
                 SET status = ?2, current_streak = ?3, longest_streak = ?4
                 WHERE id = ?1",
            )?;
            for (record_id, status, streak) in rewrites {
                stmt.execute(params![record_id.0, status.as_str(), streak.current, streak.longest])?;
            }
        }

        tx.commit()?;
        tracing::debug!("Deleted record {}, rewrote {} survivors", record_id, rewrites.len());
        Ok(())
    }

    /// Maximum stored longest_streak over one habit or over everything
    fn max_longest_streak(&self, habit_id: Option<HabitId>) -> Result<Option<u32>, StorageError> {
        // MAX over zero rows is NULL, which surfaces here as None
        let max = match habit_id {
            Some(habit_id) => self.conn.query_row(
                "SELECT MAX(longest_streak) FROM habit_records WHERE habit_id = ?1",
                params![habit_id.0],
                |row| row.get::<_, Option<u32>>(0),
            )?,
            None => self.conn.query_row(
                "SELECT MAX(longest_streak) FROM habit_records",
                [],
                |row| row.get::<_, Option<u32>>(0),
            )?,
        };

        Ok(max)
    }
}
