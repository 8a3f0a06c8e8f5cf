/// Public library interface for the habitd server
///
/// This module exports the service implementation and public types
/// that can be used by other applications or tests.

use std::path::PathBuf;
use thiserror::Error;

// Internal modules
mod api;
mod domain;
mod rpc;
mod storage;

// Re-export public modules and types
pub use api::*;
pub use domain::*;
pub use storage::{RecordStore, SqliteStorage, StorageError};

/// Errors that can occur during server operation
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Database error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Domain validation error: {0}")]
    Domain(#[from] domain::DomainError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Main habit tracker service
///
/// This service owns the SQLite storage and exposes habit, record and
/// streak operations over a line-delimited JSON-RPC interface on
/// stdin/stdout.
pub struct HabitTracker {
    storage: SqliteStorage,
}

impl HabitTracker {
    /// Create a new habit tracker with the specified database path
    ///
    /// This will initialize the SQLite database with the required schema
    /// if it doesn't already exist.
    pub fn new(db_path: PathBuf) -> Result<Self, ServerError> {
        tracing::info!("Initializing habitd with database: {:?}", db_path);

        let storage = SqliteStorage::new(db_path)?;

        Ok(Self { storage })
    }

    /// Create a habit tracker over an in-memory database (useful for tests)
    pub fn in_memory() -> Result<Self, ServerError> {
        Ok(Self {
            storage: SqliteStorage::open_in_memory()?,
        })
    }

    /// Run the server, handling JSON-RPC requests over stdin/stdout
    ///
    /// This method will block until stdin closes or an error occurs.
    pub async fn run(self) -> Result<(), ServerError> {
        tracing::info!("Starting habitd server...");

        // Test database connectivity
        let habits = self.storage.list_habits()?;
        tracing::info!("Server started successfully, found {} existing habits", habits.len());

        let mut server = rpc::RpcServer::new(self);
        server.run().await?;

        Ok(())
    }

    /// Get a reference to the storage layer (useful for testing)
    pub fn storage(&self) -> &SqliteStorage {
        &self.storage
    }
}
