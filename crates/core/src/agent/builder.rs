use std::sync::Arc;

use counsel_model::ModelProvider;

use super::{Agent, DEFAULT_MAX_TOOL_ROUNDS};
use crate::model_client::ModelClient;
use crate::store::CheckpointStore;
use crate::thread::Thread;
use crate::tool::{AnyTool, Registry, Tool};

/// [`Agent`] builder.
pub struct AgentBuilder {
    model_client: ModelClient,
    system_prompt: Option<String>,
    registry: Registry,
    checkpoint_store: Option<Arc<dyn CheckpointStore>>,
    thread: Option<Thread>,
    max_tool_rounds: usize,
}

impl AgentBuilder {
    /// Creates a new builder with the specified model provider.
    #[inline]
    pub fn with_model_provider<P: ModelProvider + 'static>(
        provider: P,
    ) -> Self {
        Self {
            model_client: ModelClient::new(provider),
            system_prompt: None,
            registry: Registry::default(),
            checkpoint_store: None,
            thread: None,
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
        }
    }

    /// Sets the system prompt for the agent.
    #[inline]
    pub fn with_system_prompt<S: Into<String>>(mut self, prompt: S) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Registers a tool.
    #[inline]
    pub fn with_tool<T: Tool>(mut self, tool: T) -> Self {
        self.registry.add_tool(Box::new(AnyTool(tool)));
        self
    }

    /// Attaches a checkpoint store that receives the messages of every
    /// completed turn.
    #[inline]
    pub fn with_checkpoint_store(
        mut self,
        store: Arc<dyn CheckpointStore>,
    ) -> Self {
        self.checkpoint_store = Some(store);
        self
    }

    /// Sets the thread the agent operates on, typically one loaded from
    /// the checkpoint store to resume a conversation.
    #[inline]
    pub fn with_thread(mut self, thread: Thread) -> Self {
        self.thread = Some(thread);
        self
    }

    /// Overrides the bound on model round trips per user turn.
    #[inline]
    pub fn with_max_tool_rounds(mut self, max_tool_rounds: usize) -> Self {
        self.max_tool_rounds = max_tool_rounds;
        self
    }

    /// Builds the agent.
    #[inline]
    pub fn build(self) -> Agent {
        Agent {
            model_client: self.model_client,
            registry: self.registry,
            system_prompt: self.system_prompt,
            thread: self.thread.unwrap_or_else(|| Thread::new("default")),
            checkpoint_store: self.checkpoint_store,
            max_tool_rounds: self.max_tool_rounds,
        }
    }
}
