//! An out-of-the-box university advisory agent that assembles the domain
//! tools, model providers, and checkpoint stores.
//!
//! The crate includes a CLI tool for chatting in the terminal. And you can
//! also use it as a library to bring advisory sessions into your own host
//! apps.

#![deny(missing_docs)]

#[allow(unused_imports)]
#[macro_use]
extern crate tracing;

mod session;
pub mod tools;

pub use session::{Session, SessionBuilder};

/// Re-exports of [`counsel_core`] crate.
pub mod core {
    pub use counsel_core::*;
}
