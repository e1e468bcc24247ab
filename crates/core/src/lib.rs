//! Core logic including the conversation loop, tool execution, and
//! checkpointing.

#![deny(missing_docs)]
#![deny(clippy::missing_safety_doc)]

#[macro_use]
extern crate tracing;

mod agent;
mod model_client;
pub mod store;
pub mod thread;
pub mod tool;

pub use agent::{APOLOGY_MESSAGE, Agent, AgentBuilder, DEFAULT_MAX_TOOL_ROUNDS};
