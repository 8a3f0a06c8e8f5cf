/// JSON-RPC 2.0 message structures and error-code mapping
///
/// This module defines the request/response envelope the server speaks and
/// the mapping from internal errors onto wire error codes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{ServerError, StorageError};

/// JSON-RPC 2.0 request message
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    /// JSON-RPC version (always "2.0")
    #[allow(dead_code)]
    pub jsonrpc: String,
    /// Unique identifier for this request
    pub id: Value,
    /// The method name to call (e.g., "record.create")
    pub method: String,
    /// Parameters for the method call
    pub params: Option<Value>,
}

/// JSON-RPC 2.0 response message
///
/// Contains either a successful result or an error, never both.
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    /// JSON-RPC version (always "2.0")
    pub jsonrpc: String,
    /// Request ID that we're responding to
    pub id: Value,
    /// Successful result (if no error occurred)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error information (if something went wrong)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error information
#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    /// Error code (standard JSON-RPC codes plus application codes)
    pub code: i32,
    /// Human-readable error message
    pub message: String,
    /// Additional error details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

// JSON-RPC error codes
pub mod error_codes {
    /// Parse error - Invalid JSON was received by the server
    pub const PARSE_ERROR: i32 = -32700;
    /// Method not found - The requested method doesn't exist
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// Invalid parameters - Method exists but parameters are wrong
    pub const INVALID_PARAMS: i32 = -32602;
    /// Internal error - Internal JSON-RPC error
    pub const INTERNAL_ERROR: i32 = -32603;

    // Application-specific error codes (JSON-RPC reserves -32000 to -32099
    // for implementation-defined server errors)
    /// The referenced habit or record doesn't exist
    pub const NOT_FOUND: i32 = -32001;
    /// A schema constraint rejected the input (e.g. duplicate habit name)
    pub const CONSTRAINT_VIOLATION: i32 = -32002;
    /// Input validation failed before reaching storage
    pub const VALIDATION_ERROR: i32 = -32003;
    /// Database or storage operation failed
    pub const STORAGE_ERROR: i32 = -32004;
}

impl JsonRpcResponse {
    /// Create a successful response
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response
    pub fn error(id: Value, code: i32, message: String, data: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message,
                data,
            }),
        }
    }

    /// Create an error response from a server error, picking the code
    pub fn from_server_error(id: Value, error: &ServerError) -> Self {
        Self::error(id, server_error_code(error), error.to_string(), None)
    }
}

/// Map internal errors onto wire error codes
///
/// NotFound stays a distinct signal; everything else degrades to a
/// storage/validation/internal bucket without being swallowed.
pub fn server_error_code(error: &ServerError) -> i32 {
    match error {
        ServerError::Storage(storage_error) => match storage_error {
            StorageError::HabitNotFound { .. } | StorageError::RecordNotFound { .. } => {
                error_codes::NOT_FOUND
            }
            StorageError::DuplicateName { .. } => error_codes::CONSTRAINT_VIOLATION,
            StorageError::Connection(_)
            | StorageError::Query(_)
            | StorageError::Migration(_) => error_codes::STORAGE_ERROR,
        },
        ServerError::Domain(_) => error_codes::VALIDATION_ERROR,
        ServerError::Io(_) | ServerError::Json(_) => error_codes::INTERNAL_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;
    use crate::{HabitId, RecordId};

    #[test]
    fn test_not_found_is_a_distinct_code() {
        let habit = ServerError::Storage(StorageError::HabitNotFound { habit_id: HabitId(1) });
        let record = ServerError::Storage(StorageError::RecordNotFound { record_id: RecordId(1) });

        assert_eq!(server_error_code(&habit), error_codes::NOT_FOUND);
        assert_eq!(server_error_code(&record), error_codes::NOT_FOUND);
    }

    #[test]
    fn test_constraint_and_validation_codes() {
        let duplicate = ServerError::Storage(StorageError::DuplicateName {
            name: "Read".to_string(),
        });
        assert_eq!(server_error_code(&duplicate), error_codes::CONSTRAINT_VIOLATION);

        let invalid = ServerError::Domain(DomainError::InvalidStatus("done".to_string()));
        assert_eq!(server_error_code(&invalid), error_codes::VALIDATION_ERROR);
    }

    #[test]
    fn test_error_response_shape() {
        let response = JsonRpcResponse::error(
            serde_json::json!(7),
            error_codes::NOT_FOUND,
            "Habit not found: 3".to_string(),
            None,
        );

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["jsonrpc"], "2.0");
        assert_eq!(json["id"], 7);
        assert_eq!(json["error"]["code"], error_codes::NOT_FOUND);
        assert!(json.get("result").is_none());
    }
}
