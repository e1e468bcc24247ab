//! Checkpoint store interface.
//!
//! The checkpoint store is an external durable log of conversation state
//! per thread. The agent only needs three operations from it: load a
//! thread to resume it, append the messages produced by a turn, and list
//! the known thread identifiers. Adapters live in their own crate.

use std::error::Error as StdError;
use std::fmt::{self, Display};

use async_trait::async_trait;
use counsel_model::ModelMessage;

use crate::thread::Thread;

/// The error type for checkpoint store operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreError {
    /// A message could not be encoded or decoded.
    Serialization(String),
    /// The backing store failed.
    Backend(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Serialization(reason) => {
                write!(f, "serialization error: {reason}")
            }
            StoreError::Backend(reason) => {
                write!(f, "store backend error: {reason}")
            }
        }
    }
}

impl StdError for StoreError {}

/// A durable append log of conversation state, keyed by thread
/// identifier.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Loads a thread by its identifier, or `None` if the store has
    /// never seen it.
    async fn load(&self, thread_id: &str)
    -> Result<Option<Thread>, StoreError>;

    /// Appends messages to a thread, creating the thread on first
    /// append. Messages must be stored in the given order, after all
    /// previously appended ones.
    async fn append(
        &self,
        thread_id: &str,
        messages: &[ModelMessage],
    ) -> Result<(), StoreError>;

    /// Lists all known thread identifiers.
    async fn list_threads(&self) -> Result<Vec<String>, StoreError>;
}
