/// Habit entity and related functionality
///
/// This module defines the core Habit struct that represents a recurring
/// activity the user wants to track, along with validation for new habits
/// and partial updates.

use serde::{Deserialize, Serialize};
use chrono::NaiveDate;

use crate::domain::{DomainError, Frequency, HabitId};

/// A habit represents something the user wants to do regularly
///
/// Each habit has a unique name, an optional description, and a frequency.
/// The creation date is assigned by the store when the habit is inserted
/// and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
    /// Unique identifier for this habit
    pub id: HabitId,
    /// Display name, unique across all habits
    pub name: String,
    /// Optional detailed description
    pub description: Option<String>,
    /// How often this habit should be performed
    pub frequency: Frequency,
    /// When this habit was created (immutable)
    pub created_date: NaiveDate,
}

impl Habit {
    /// Create a habit from existing data (used when loading from database)
    ///
    /// This constructor assumes data is already validated and is mainly
    /// used by the storage layer when loading habits from the database.
    pub fn from_existing(
        id: HabitId,
        name: String,
        description: Option<String>,
        frequency: Frequency,
        created_date: NaiveDate,
    ) -> Self {
        Self {
            id,
            name,
            description,
            frequency,
            created_date,
        }
    }
}

/// A validated draft for a habit that has not been stored yet
///
/// The id and creation date do not exist before the insert, so new habits
/// go through this type instead of Habit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHabit {
    pub name: String,
    pub description: Option<String>,
    pub frequency: Frequency,
}

impl NewHabit {
    /// Build a draft with validation
    pub fn new(
        name: String,
        description: Option<String>,
        frequency: Frequency,
    ) -> Result<Self, DomainError> {
        validate_name(&name)?;
        validate_description(&description)?;

        Ok(Self {
            name,
            description,
            frequency,
        })
    }
}

/// Partial update for an existing habit
///
/// Only fields that are Some are changed; everything else keeps its stored
/// value. An all-None patch is a valid no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HabitPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub frequency: Option<Frequency>,
}

impl HabitPatch {
    /// Validate whichever fields the patch supplies
    pub fn validate(&self) -> Result<(), DomainError> {
        if let Some(ref name) = self.name {
            validate_name(name)?;
        }
        validate_description(&self.description)?;
        Ok(())
    }

    /// True when the patch changes nothing
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.frequency.is_none()
    }
}

/// Validate habit name according to business rules
fn validate_name(name: &str) -> Result<(), DomainError> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(DomainError::InvalidHabitName(
            "Habit name cannot be empty".to_string()
        ));
    }

    if trimmed.len() > 100 {
        return Err(DomainError::InvalidHabitName(
            "Habit name cannot be longer than 100 characters".to_string()
        ));
    }

    Ok(())
}

/// Validate optional description
fn validate_description(description: &Option<String>) -> Result<(), DomainError> {
    if let Some(desc) = description {
        if desc.len() > 500 {
            return Err(DomainError::Validation {
                message: "Description cannot be longer than 500 characters".to_string()
            });
        }
    }
    Ok(())
}
