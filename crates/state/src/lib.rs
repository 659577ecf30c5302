use ::model::Error;
use async_trait::async_trait;
use model::StateRecord;
use std::fmt::{Display, Formatter};

/// Append-only history of instance states, partitioned by state key
/// and sorted by timestamp.
///
/// Writing a record with an existing key and timestamp replaces it.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// The record with the greatest timestamp, if any exist.
    async fn get_latest(&self, state_key: &str) -> Result<Option<StateRecord>, StateError>;
    async fn put(&self, record: &StateRecord) -> Result<(), StateError>;
    async fn query_count(&self, state_key: &str) -> Result<usize, StateError>;
    /// Remove the record with the smallest timestamp.
    async fn delete_oldest(&self, state_key: &str) -> Result<(), StateError>;
}

/// Errors arising from reading or writing state.
#[derive(Debug)]
pub struct StateError {
    pub state_key: String,

    pub operation: StateOperation,
    pub reason: StateErrorReason,
}

#[derive(Debug)]
pub enum StateErrorReason {
    // An expected state entry was missing.
    MissingEntry,
    // The stored item could not be mapped to a record
    BadState(String),
    // An error from the underlying state store
    BackendFailure(Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateOperation {
    GetLatest,
    Put,
    QueryCount,
    DeleteOldest,
}

impl StateError {
    pub fn new(state_key: &str, operation: StateOperation, reason: StateErrorReason) -> Self {
        StateError {
            state_key: state_key.to_string(),
            operation,
            reason,
        }
    }
}

impl Display for StateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(format!("{:?}", self).as_str())
    }
}

impl std::error::Error for StateError {}
