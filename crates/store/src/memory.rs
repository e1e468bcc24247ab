use std::collections::HashMap;

use async_trait::async_trait;
use counsel_core::store::{CheckpointStore, StoreError};
use counsel_core::thread::Thread;
use counsel_model::ModelMessage;

/// In-memory checkpoint store for testing and local development.
#[derive(Default)]
pub struct MemoryStore {
    threads: tokio::sync::RwLock<HashMap<String, Vec<ModelMessage>>>,
}

impl MemoryStore {
    /// Creates a new in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CheckpointStore for MemoryStore {
    async fn load(
        &self,
        thread_id: &str,
    ) -> Result<Option<Thread>, StoreError> {
        let threads = self.threads.read().await;
        Ok(threads
            .get(thread_id)
            .map(|msgs| Thread::with_messages(thread_id, msgs.clone())))
    }

    async fn append(
        &self,
        thread_id: &str,
        messages: &[ModelMessage],
    ) -> Result<(), StoreError> {
        let mut threads = self.threads.write().await;
        threads
            .entry(thread_id.to_owned())
            .or_default()
            .extend_from_slice(messages);
        Ok(())
    }

    async fn list_threads(&self) -> Result<Vec<String>, StoreError> {
        let threads = self.threads.read().await;
        let mut ids: Vec<String> = threads.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}
