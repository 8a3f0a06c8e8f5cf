/// Habit management operations
///
/// Create, read, update and delete habits. Streak logic never lives here;
/// the only coupling to records is that deleting a habit takes its record
/// history with it.

use serde::{Deserialize, Serialize};

use crate::domain::{Frequency, Habit, HabitId, HabitPatch, NewHabit};
use crate::storage::RecordStore;
use crate::ServerError;

/// Parameters for creating a new habit
#[derive(Debug, Deserialize)]
pub struct CreateHabitParams {
    pub name: String,
    pub description: Option<String>,
    pub frequency: Frequency,
}

/// Response from creating a habit
#[derive(Debug, Serialize)]
pub struct CreateHabitResponse {
    pub habit_id: HabitId,
}

/// Create a new habit using the provided storage
pub fn create_habit<S: RecordStore>(
    storage: &S,
    params: CreateHabitParams,
) -> Result<CreateHabitResponse, ServerError> {
    let draft = NewHabit::new(params.name, params.description, params.frequency)?;
    let habit_id = storage.insert_habit(&draft)?;

    tracing::info!("Created habit '{}' ({})", draft.name, habit_id);
    Ok(CreateHabitResponse { habit_id })
}

/// Fetch a single habit by id
pub fn get_habit<S: RecordStore>(storage: &S, habit_id: HabitId) -> Result<Habit, ServerError> {
    Ok(storage.get_habit(habit_id)?)
}

/// List every habit
pub fn list_habits<S: RecordStore>(storage: &S) -> Result<Vec<Habit>, ServerError> {
    Ok(storage.list_habits()?)
}

/// List habits matching a frequency
pub fn habits_by_frequency<S: RecordStore>(
    storage: &S,
    frequency: Frequency,
) -> Result<Vec<Habit>, ServerError> {
    Ok(storage.habits_by_frequency(frequency)?)
}

/// Parameters for updating an existing habit
///
/// Only supplied fields change; id and creation date are immutable.
#[derive(Debug, Deserialize)]
pub struct UpdateHabitParams {
    pub habit_id: HabitId,
    #[serde(flatten)]
    pub patch: HabitPatch,
}

/// Apply a partial update to an existing habit
pub fn update_habit<S: RecordStore>(
    storage: &S,
    params: UpdateHabitParams,
) -> Result<(), ServerError> {
    params.patch.validate()?;
    storage.update_habit(params.habit_id, &params.patch)?;

    tracing::info!("Updated habit {}", params.habit_id);
    Ok(())
}

/// Delete a habit and its entire record history
pub fn delete_habit<S: RecordStore>(storage: &S, habit_id: HabitId) -> Result<(), ServerError> {
    storage.delete_habit(habit_id)?;

    tracing::info!("Deleted habit {}", habit_id);
    Ok(())
}
