/// Streak state and the streak engine
///
/// This module defines the StreakState pair stored on every record and the
/// pure `advance` transition that turns a prior state plus a new status
/// into the next state. All streak arithmetic in the system goes through
/// this one function; storage and transport never touch the numbers.

use serde::{Deserialize, Serialize};

use crate::domain::Status;

/// Streak counters as of one record in a habit's ordered history
///
/// `current` counts the consecutive completed statuses ending at that
/// record. `longest` is the maximum `current` seen anywhere in the history
/// up to and including that record, so it never decreases as the history
/// grows and is always >= `current`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakState {
    /// Consecutive completed statuses ending here
    pub current: u32,
    /// Best `current` value seen so far in the history
    pub longest: u32,
}

impl StreakState {
    pub fn new(current: u32, longest: u32) -> Self {
        Self { current, longest }
    }

    /// Compute the state that follows this one when a new status is observed
    ///
    /// A completed status extends the run and may set a new longest value;
    /// a missed status resets the run to zero and leaves longest alone.
    /// The very first record of a habit uses `StreakState::default()` as
    /// its prior state, which yields (1, 1) for completed and (0, 0) for
    /// missed. Pure and total: no I/O, no failure modes.
    pub fn advance(self, status: Status) -> StreakState {
        match status {
            Status::Completed => {
                let current = self.current + 1;
                StreakState {
                    current,
                    longest: current.max(self.longest),
                }
            }
            Status::Missed => StreakState {
                current: 0,
                longest: self.longest,
            },
        }
    }
}

/// Replay a status history from nothing, yielding the state at each step
///
/// Used when an out-of-order edit or deletion invalidates the stored
/// states of later records: the whole chain is refolded in date order.
pub fn replay_states<I>(statuses: I) -> Vec<StreakState>
where
    I: IntoIterator<Item = Status>,
{
    let mut state = StreakState::default();
    statuses
        .into_iter()
        .map(|status| {
            state = state.advance(status);
            state
        })
        .collect()
}
