use std::time::Duration;

use thiserror::Error;

/// Errors that can occur during table store operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{table} record not found: {key}")]
    NotFound { table: String, key: String },
    #[error("{table} record was modified concurrently: {key}")]
    VersionConflict { table: String, key: String },
    #[error("Write condition failed")]
    ConditionFailed,
    #[error("Table not found: {table}")]
    TableNotFound { table: String },
    #[error("Table already exists: {table}")]
    TableAlreadyExists { table: String },
    #[error("Table {table} did not become active within {waited:?}")]
    TableActivationTimeout { table: String, waited: Duration },
    #[error("Batch write to {table} left {count} unprocessed items")]
    UnprocessedItems { table: String, count: usize },
    #[error("Invalid record: {0}")]
    InvalidRecord(String),
    #[error("Invalid scan condition: {0}")]
    InvalidCondition(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Service error: {0}")]
    Service(String),
}

impl StoreError {
    /// Returns true for the "record does not exist" failure of update and delete.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result type for table store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
