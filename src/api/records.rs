/// Record creation and mutation protocols
///
/// This is where the streak engine meets the store. Creation appends to a
/// habit's history, advancing from the latest prior record. Updates and
/// deletions are out-of-order mutations of that history, so they replay
/// the engine over the affected habit's records to keep every stored
/// state consistent with its position in the date-ordered sequence.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{replay_states, HabitId, HabitRecord, RecordId, Status, StreakState};
use crate::storage::RecordStore;
use crate::ServerError;

/// Parameters for logging a record against a habit
#[derive(Debug, Deserialize)]
pub struct CreateRecordParams {
    pub habit_id: HabitId,
    pub status: Status,
    /// Day the observation is for; defaults to today (UTC)
    pub date: Option<NaiveDate>,
}

/// Response from creating a record
#[derive(Debug, Serialize)]
pub struct CreateRecordResponse {
    pub record_id: RecordId,
    #[serde(flatten)]
    pub streak: StreakState,
}

/// Append a new record to a habit's streak history
///
/// The prior state is the latest record's streak pair, or (0, 0) when the
/// habit has no records yet. A supplied date earlier than the latest
/// record is an out-of-order insert: the new record lands in the middle of
/// the chain, so the whole chain is refolded the same way an edit or a
/// deletion repairs it. The habit's existence is enforced by the store's
/// foreign-key constraint and surfaces as a not-found error.
pub fn create_record<S: RecordStore>(
    storage: &S,
    params: CreateRecordParams,
) -> Result<CreateRecordResponse, ServerError> {
    let latest = storage.latest_record(params.habit_id)?;
    let date = params.date.unwrap_or_else(|| Utc::now().naive_utc().date());

    let backdated = latest
        .as_ref()
        .is_some_and(|record| date < record.date);
    let prior = latest.map(|record| record.streak).unwrap_or_default();

    let mut streak = prior.advance(params.status);
    let record_id = storage.insert_record(params.habit_id, date, params.status, streak)?;

    if backdated {
        // The record did not land at the tail; every state from its
        // position onward must be refolded
        let chain = storage.records_for_habit(params.habit_id)?;
        let updates = replayed_chain(&chain, None);
        storage.rewrite_records(&updates)?;
        streak = updates
            .iter()
            .find(|(id, _, _)| *id == record_id)
            .map(|(_, _, streak)| *streak)
            .unwrap_or(streak);
    }

    tracing::info!(
        "Logged {} for habit {} on {}: streak {}/{}",
        params.status,
        params.habit_id,
        date,
        streak.current,
        streak.longest
    );
    Ok(CreateRecordResponse { record_id, streak })
}

/// Parameters for changing the status of an existing record
#[derive(Debug, Deserialize)]
pub struct UpdateRecordParams {
    pub record_id: RecordId,
    pub status: Status,
}

/// Change a record's status and repair the streak chain
///
/// The record keeps its date and habit. Its new state is advanced from its
/// true chronological predecessor, and every later record of the same
/// habit is recomputed in the same pass, so an edit deep in the history
/// propagates forward instead of leaving stale states behind.
pub fn update_record<S: RecordStore>(
    storage: &S,
    params: UpdateRecordParams,
) -> Result<(), ServerError> {
    let record = storage.get_record(params.record_id)?;
    let chain = storage.records_for_habit(record.habit_id)?;

    // The record was just fetched, so it is in its habit's chain
    let Some(position) = chain.iter().position(|r| r.id == params.record_id) else {
        return Err(crate::storage::StorageError::RecordNotFound {
            record_id: params.record_id,
        }
        .into());
    };

    if position + 1 == chain.len() {
        // Tail edit: only this record's state changes
        let prior = position
            .checked_sub(1)
            .map(|i| chain[i].streak)
            .unwrap_or_default();
        storage.update_record_row(params.record_id, params.status, prior.advance(params.status))?;
    } else {
        let updates = replayed_chain(&chain, Some((position, params.status)));
        storage.rewrite_records(&updates)?;
    }

    tracing::info!(
        "Updated record {} of habit {} to {}",
        params.record_id,
        record.habit_id,
        params.status
    );
    Ok(())
}

/// Delete a record and repair the remaining streak chain
///
/// Records after the removed one advanced from a predecessor that no
/// longer exists, so what remains is refolded and the deletion and the
/// repair commit in a single transaction.
pub fn delete_record<S: RecordStore>(
    storage: &S,
    record_id: RecordId,
) -> Result<(), ServerError> {
    let record = storage.get_record(record_id)?;

    let remaining: Vec<HabitRecord> = storage
        .records_for_habit(record.habit_id)?
        .into_iter()
        .filter(|r| r.id != record_id)
        .collect();
    let updates: Vec<_> = replayed_chain(&remaining, None)
        .into_iter()
        .zip(&remaining)
        .filter(|((_, _, streak), stored)| *streak != stored.streak)
        .map(|(update, _)| update)
        .collect();

    storage.delete_record(record_id, &updates)?;

    tracing::info!("Deleted record {} of habit {}", record_id, record.habit_id);
    Ok(())
}

/// Fetch a single record by id
pub fn get_record<S: RecordStore>(
    storage: &S,
    record_id: RecordId,
) -> Result<HabitRecord, ServerError> {
    Ok(storage.get_record(record_id)?)
}

/// All records of one habit in streak-history order
pub fn records_for_habit<S: RecordStore>(
    storage: &S,
    habit_id: HabitId,
) -> Result<Vec<HabitRecord>, ServerError> {
    Ok(storage.records_for_habit(habit_id)?)
}

/// All records across all habits
pub fn list_records<S: RecordStore>(storage: &S) -> Result<Vec<HabitRecord>, ServerError> {
    Ok(storage.list_records()?)
}

/// Refold the engine over a habit's history, optionally substituting one
/// record's status, and pair each record with its recomputed row
fn replayed_chain(
    chain: &[HabitRecord],
    substitute: Option<(usize, Status)>,
) -> Vec<(RecordId, Status, StreakState)> {
    let statuses: Vec<Status> = chain
        .iter()
        .enumerate()
        .map(|(i, record)| match substitute {
            Some((position, status)) if i == position => status,
            _ => record.status,
        })
        .collect();

    chain
        .iter()
        .zip(&statuses)
        .zip(replay_states(statuses.iter().copied()))
        .map(|((record, status), streak)| (record.id, *status, streak))
        .collect()
}
