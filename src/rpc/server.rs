/// JSON-RPC server implementation
///
/// This module implements the request loop that:
/// 1. Reads JSON-RPC requests from stdin, one per line
/// 2. Dispatches them to the api operations
/// 3. Writes JSON-RPC responses to stdout
///
/// All mutations flow through this single-threaded loop, so streak
/// read-modify-write sequences never interleave.

use serde::Deserialize;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, error, info};

use crate::api;
use crate::domain::{Frequency, HabitId, RecordId};
use crate::rpc::protocol::*;
use crate::storage::StorageError;
use crate::{HabitTracker, ServerError};

/// Parameters naming a single habit
#[derive(Debug, Deserialize)]
struct HabitIdParams {
    habit_id: HabitId,
}

/// Parameters naming a single record
#[derive(Debug, Deserialize)]
struct RecordIdParams {
    record_id: RecordId,
}

/// Parameters for the frequency filter
#[derive(Debug, Deserialize)]
struct FrequencyParams {
    frequency: Frequency,
}

/// Parameters for the longest-streak query; global when habit_id is absent
#[derive(Debug, Deserialize, Default)]
struct LongestStreakParams {
    habit_id: Option<HabitId>,
}

/// JSON-RPC server wrapping the habit tracker service
pub struct RpcServer {
    tracker: HabitTracker,
}

impl RpcServer {
    /// Create a new server around a habit tracker
    pub fn new(tracker: HabitTracker) -> Self {
        Self { tracker }
    }

    /// Run the server, handling JSON-RPC over stdin/stdout
    pub async fn run(&mut self) -> Result<(), ServerError> {
        info!("Waiting for JSON-RPC requests on stdin...");

        let stdin = tokio::io::stdin();
        let mut reader = BufReader::new(stdin);
        let mut stdout = tokio::io::stdout();

        let mut line = String::new();

        loop {
            line.clear();

            match reader.read_line(&mut line).await {
                Ok(0) => {
                    info!("Server shutting down (stdin closed)");
                    break;
                }
                Ok(_) => {
                    if let Some(response) = self.process_line(&line) {
                        let response_str = serde_json::to_string(&response)?;

                        stdout.write_all(response_str.as_bytes()).await?;
                        stdout.write_all(b"\n").await?;
                        stdout.flush().await?;

                        debug!("Sent response: {}", response_str);
                    }
                }
                Err(e) => {
                    error!("Failed to read from stdin: {}", e);
                    break;
                }
            }
        }

        Ok(())
    }

    /// Process a single line of JSON-RPC input
    fn process_line(&self, line: &str) -> Option<JsonRpcResponse> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        debug!("Processing request: {}", line);

        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse JSON-RPC request: {}", e);
                return Some(JsonRpcResponse::error(
                    json!(null),
                    error_codes::PARSE_ERROR,
                    format!("Invalid JSON: {}", e),
                    None,
                ));
            }
        };

        Some(self.handle_request(request))
    }

    /// Dispatch a JSON-RPC request to the matching operation
    fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let id = request.id.clone();
        let params = request.params.unwrap_or(Value::Null);

        let result = match request.method.as_str() {
            "habit.create" => self.habit_create(params),
            "habit.get" => self.habit_get(params),
            "habit.list" => self.habit_list(),
            "habit.by_frequency" => self.habit_by_frequency(params),
            "habit.update" => self.habit_update(params),
            "habit.delete" => self.habit_delete(params),
            "record.create" => self.record_create(params),
            "record.get" => self.record_get(params),
            "record.list" => self.record_list(),
            "record.for_habit" => self.record_for_habit(params),
            "record.update" => self.record_update(params),
            "record.delete" => self.record_delete(params),
            "streak.longest" => self.streak_longest(params),
            other => {
                return JsonRpcResponse::error(
                    id,
                    error_codes::METHOD_NOT_FOUND,
                    format!("Method '{}' not found", other),
                    None,
                );
            }
        };

        match result {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(RequestError::Params(e)) => JsonRpcResponse::error(
                id,
                error_codes::INVALID_PARAMS,
                format!("Invalid parameters: {}", e),
                None,
            ),
            Err(RequestError::Server(e)) => {
                debug!("Request failed: {}", e);
                JsonRpcResponse::from_server_error(id, &e)
            }
        }
    }

    fn habit_create(&self, params: Value) -> Result<Value, RequestError> {
        let params: api::CreateHabitParams = parse_params(params)?;
        let response = api::create_habit(self.tracker.storage(), params)?;
        Ok(serde_json::to_value(response).map_err(ServerError::Json)?)
    }

    fn habit_get(&self, params: Value) -> Result<Value, RequestError> {
        let params: HabitIdParams = parse_params(params)?;
        let habit = api::get_habit(self.tracker.storage(), params.habit_id)?;
        Ok(serde_json::to_value(habit).map_err(ServerError::Json)?)
    }

    fn habit_list(&self) -> Result<Value, RequestError> {
        let habits = api::list_habits(self.tracker.storage())?;
        Ok(serde_json::to_value(habits).map_err(ServerError::Json)?)
    }

    fn habit_by_frequency(&self, params: Value) -> Result<Value, RequestError> {
        let params: FrequencyParams = parse_params(params)?;
        let habits = api::habits_by_frequency(self.tracker.storage(), params.frequency)?;
        Ok(serde_json::to_value(habits).map_err(ServerError::Json)?)
    }

    fn habit_update(&self, params: Value) -> Result<Value, RequestError> {
        let params: api::UpdateHabitParams = parse_params(params)?;
        api::update_habit(self.tracker.storage(), params)?;
        Ok(json!({"updated": true}))
    }

    fn habit_delete(&self, params: Value) -> Result<Value, RequestError> {
        let params: HabitIdParams = parse_params(params)?;
        api::delete_habit(self.tracker.storage(), params.habit_id)?;
        Ok(json!({"deleted": true}))
    }

    fn record_create(&self, params: Value) -> Result<Value, RequestError> {
        let params: api::CreateRecordParams = parse_params(params)?;
        let response = api::create_record(self.tracker.storage(), params)?;
        Ok(serde_json::to_value(response).map_err(ServerError::Json)?)
    }

    fn record_get(&self, params: Value) -> Result<Value, RequestError> {
        let params: RecordIdParams = parse_params(params)?;
        let record = api::get_record(self.tracker.storage(), params.record_id)?;
        Ok(serde_json::to_value(record).map_err(ServerError::Json)?)
    }

    fn record_list(&self) -> Result<Value, RequestError> {
        let records = api::list_records(self.tracker.storage())?;
        Ok(serde_json::to_value(records).map_err(ServerError::Json)?)
    }

    fn record_for_habit(&self, params: Value) -> Result<Value, RequestError> {
        let params: HabitIdParams = parse_params(params)?;
        let records = api::records_for_habit(self.tracker.storage(), params.habit_id)?;
        Ok(serde_json::to_value(records).map_err(ServerError::Json)?)
    }

    fn record_update(&self, params: Value) -> Result<Value, RequestError> {
        let params: api::UpdateRecordParams = parse_params(params)?;
        api::update_record(self.tracker.storage(), params)?;
        Ok(json!({"updated": true}))
    }

    fn record_delete(&self, params: Value) -> Result<Value, RequestError> {
        let params: RecordIdParams = parse_params(params)?;
        api::delete_record(self.tracker.storage(), params.record_id)?;
        Ok(json!({"deleted": true}))
    }

    fn streak_longest(&self, params: Value) -> Result<Value, RequestError> {
        let params: LongestStreakParams = if params.is_null() {
            LongestStreakParams::default()
        } else {
            parse_params(params)?
        };

        match params.habit_id {
            None => {
                let response = api::longest_streak(self.tracker.storage())?;
                Ok(serde_json::to_value(response).map_err(ServerError::Json)?)
            }
            Some(habit_id) => {
                // A habit with no records is reported as absent rather
                // than as a zero streak
                match api::longest_streak_for(self.tracker.storage(), habit_id)? {
                    Some(longest) => Ok(json!({"longest_streak": longest})),
                    None => Err(RequestError::Server(ServerError::Storage(
                        StorageError::HabitNotFound { habit_id },
                    ))),
                }
            }
        }
    }
}

/// Why a request could not produce a result
enum RequestError {
    /// The params did not deserialize into the expected shape
    Params(serde_json::Error),
    /// The operation itself failed
    Server(ServerError),
}

impl From<ServerError> for RequestError {
    fn from(error: ServerError) -> Self {
        RequestError::Server(error)
    }
}

/// Deserialize method params, treating failures as INVALID_PARAMS
fn parse_params<T: for<'de> Deserialize<'de>>(params: Value) -> Result<T, RequestError> {
    serde_json::from_value(params).map_err(RequestError::Params)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server() -> RpcServer {
        RpcServer::new(HabitTracker::in_memory().unwrap())
    }

    fn call(server: &RpcServer, id: i64, method: &str, params: Value) -> Value {
        let line = serde_json::to_string(&json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        }))
        .unwrap();
        serde_json::to_value(server.process_line(&line).unwrap()).unwrap()
    }

    #[test]
    fn test_unknown_method() {
        let server = server();
        let response = call(&server, 1, "habit.rename", json!({}));
        assert_eq!(response["error"]["code"], error_codes::METHOD_NOT_FOUND);
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let server = server();
        let response = server.process_line("{not json").unwrap();
        let json = serde_json::to_value(response).unwrap();
        assert_eq!(json["error"]["code"], error_codes::PARSE_ERROR);
    }

    #[test]
    fn test_habit_and_record_round_trip() {
        let server = server();

        let created = call(
            &server,
            1,
            "habit.create",
            json!({"name": "Read", "frequency": "daily"}),
        );
        let habit_id = created["result"]["habit_id"].clone();

        let logged = call(
            &server,
            2,
            "record.create",
            json!({"habit_id": habit_id, "status": "completed"}),
        );
        assert_eq!(logged["result"]["current"], 1);
        assert_eq!(logged["result"]["longest"], 1);

        let longest = call(&server, 3, "streak.longest", json!({"habit_id": habit_id}));
        assert_eq!(longest["result"]["longest_streak"], 1);
    }

    #[test]
    fn test_invalid_status_is_invalid_params() {
        let server = server();
        call(&server, 1, "habit.create", json!({"name": "Read", "frequency": "daily"}));

        let response = call(
            &server,
            2,
            "record.create",
            json!({"habit_id": 1, "status": "done"}),
        );
        assert_eq!(response["error"]["code"], error_codes::INVALID_PARAMS);
    }

    #[test]
    fn test_recordless_habit_streak_maps_to_not_found() {
        let server = server();
        let created = call(
            &server,
            1,
            "habit.create",
            json!({"name": "Stretch", "frequency": "weekly"}),
        );
        let habit_id = created["result"]["habit_id"].clone();

        let response = call(&server, 2, "streak.longest", json!({"habit_id": habit_id}));
        assert_eq!(response["error"]["code"], error_codes::NOT_FOUND);

        // The global query stays a plain zero
        let global = call(&server, 3, "streak.longest", Value::Null);
        assert_eq!(global["result"]["longest_streak"], 0);
    }
}
