use std::sync::Arc;

use counsel_core::store::{CheckpointStore, StoreError};
use counsel_core::thread::Thread;
use counsel_core::{Agent, AgentBuilder};
use counsel_model::ModelProvider;
use sqlx::PgPool;

use crate::tools::*;

const DEFAULT_SYSTEM_PROMPT: &str = include_str!("./system_prompt.md");

/// A session builder.
///
/// See [`Session`].
pub struct SessionBuilder {
    agent_builder: AgentBuilder,
    system_prompt: Option<String>,
    database_pool: Option<PgPool>,
    checkpoint_store: Option<Arc<dyn CheckpointStore>>,
    thread_id: Option<String>,
}

impl SessionBuilder {
    /// Creates a session builder with a specified model provider.
    pub fn with_model_provider<M: ModelProvider + 'static>(
        provider: M,
    ) -> Self {
        let agent_builder = AgentBuilder::with_model_provider(provider);
        Self {
            agent_builder,
            system_prompt: None,
            database_pool: None,
            checkpoint_store: None,
            thread_id: None,
        }
    }

    /// Overrides the default system prompt for the agent.
    #[inline]
    pub fn with_system_prompt<S: Into<String>>(mut self, prompt: S) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Attaches the database pool that backs the university lookup tool.
    ///
    /// Without a pool the session only carries the web search tool.
    #[inline]
    pub fn with_database_pool(mut self, pool: PgPool) -> Self {
        self.database_pool = Some(pool);
        self
    }

    /// Attaches a checkpoint store to persist and resume conversations.
    #[inline]
    pub fn with_checkpoint_store(
        mut self,
        store: Arc<dyn CheckpointStore>,
    ) -> Self {
        self.checkpoint_store = Some(store);
        self
    }

    /// Sets the thread to converse on, defaults to `default`.
    #[inline]
    pub fn with_thread_id<S: Into<String>>(mut self, thread_id: S) -> Self {
        self.thread_id = Some(thread_id.into());
        self
    }

    /// Builds a new session, resuming the thread from the checkpoint
    /// store if it exists there.
    pub async fn build(self) -> Result<Session, StoreError> {
        let thread_id =
            self.thread_id.unwrap_or_else(|| "default".to_owned());

        let mut agent_builder = self
            .agent_builder
            .with_system_prompt(
                self.system_prompt
                    .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_owned()),
            )
            .with_tool(WebSearchTool::new());
        if let Some(pool) = self.database_pool {
            agent_builder =
                agent_builder.with_tool(UniversityLookupTool::new(pool));
        }

        let thread = match &self.checkpoint_store {
            Some(store) => match store.load(&thread_id).await? {
                Some(thread) => {
                    debug!(
                        "resuming thread `{thread_id}` with {} messages",
                        thread.messages().len()
                    );
                    thread
                }
                None => Thread::new(&thread_id),
            },
            None => Thread::new(&thread_id),
        };
        agent_builder = agent_builder.with_thread(thread);
        if let Some(store) = self.checkpoint_store {
            agent_builder = agent_builder.with_checkpoint_store(store);
        }

        Ok(Session {
            agent: agent_builder.build(),
        })
    }
}

/// A chat session, like a window that displays messages and has a input box.
///
/// The session holds a fully configured agent that you can use directly, and
/// it is basically a wrapper around [`Agent`].
pub struct Session {
    agent: Agent,
}

impl Session {
    /// Sends a message to the session and resolves to the agent's answer.
    #[inline]
    pub async fn send_message(&mut self, message: &str) -> String {
        self.agent.handle_user_input(message).await
    }

    /// Returns the id of the thread this session converses on.
    #[inline]
    pub fn thread_id(&self) -> &str {
        self.agent.thread().id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use counsel_store::MemoryStore;
    use counsel_test_model::{PresetResponse, TestModelProvider};

    #[tokio::test]
    async fn test_session_resumes_persisted_thread() {
        let store = Arc::new(MemoryStore::new());

        let mut model_provider = TestModelProvider::default();
        model_provider.add_user_input_step();
        model_provider.add_assistant_response_step(
            PresetResponse::with_content("Hello! How can I help?"),
        );

        let mut session =
            SessionBuilder::with_model_provider(model_provider.clone())
                .with_checkpoint_store(Arc::clone(&store) as Arc<dyn CheckpointStore>)
                .with_thread_id("student-42")
                .build()
                .await
                .unwrap();
        session.send_message("Hi").await;

        let resumed = SessionBuilder::with_model_provider(model_provider)
            .with_checkpoint_store(Arc::clone(&store) as Arc<dyn CheckpointStore>)
            .with_thread_id("student-42")
            .build()
            .await
            .unwrap();
        assert_eq!(resumed.thread_id(), "student-42");
        assert_eq!(resumed.agent.thread().messages().len(), 2);
    }
}
