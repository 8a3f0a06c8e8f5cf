/// Operation layer exposed to the request-routing front end
///
/// Each file implements one family of operations (habits, records, streak
/// queries) as functions generic over the RecordStore trait, with typed
/// params and response structs. The RPC server is a thin dispatcher on top
/// of these.

pub mod habits;
pub mod records;
pub mod streaks;

// Re-export operation functions for easy access
pub use habits::*;
pub use records::*;
pub use streaks::*;
