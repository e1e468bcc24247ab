//! Checkpoint store adapters.
//!
//! Two implementations of [`counsel_core::store::CheckpointStore`]: an
//! in-memory store for tests and local development, and a Postgres store
//! for durable conversation history.

#![deny(missing_docs)]

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;
