//! Thread-related types.

use counsel_model::ModelMessage;
use serde::{Deserialize, Serialize};

/// One user's ongoing conversation, identified by a stable key.
///
/// The message log is append-only: messages are added as a turn
/// progresses and are never rewritten, so the persisted log and the
/// in-memory one only ever differ by a suffix.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thread {
    id: String,
    messages: Vec<ModelMessage>,
}

impl Thread {
    /// Creates an empty thread with the given identifier.
    #[inline]
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self {
            id: id.into(),
            messages: vec![],
        }
    }

    /// Reconstructs a thread from a persisted message log.
    #[inline]
    pub fn with_messages<S: Into<String>>(
        id: S,
        messages: Vec<ModelMessage>,
    ) -> Self {
        Self {
            id: id.into(),
            messages,
        }
    }

    /// Returns the thread identifier.
    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the ordered message log.
    #[inline]
    pub fn messages(&self) -> &[ModelMessage] {
        &self.messages
    }

    #[inline]
    pub(crate) fn push(&mut self, msg: ModelMessage) {
        self.messages.push(msg);
    }
}
