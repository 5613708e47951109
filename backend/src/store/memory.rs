use async_trait::async_trait;
use shared::Task;
use tokio::sync::RwLock;

use super::BackingStore;
use crate::error::StoreError;

/// Task list held in process memory.
///
/// Nothing is written anywhere: the list is gone when the process exits and
/// each new process starts empty. Use it where the filesystem is read-only or
/// ephemeral and losing tasks on restart is acceptable.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tasks: RwLock<Vec<Task>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            tasks: RwLock::new(tasks),
        }
    }
}

#[async_trait]
impl BackingStore for MemoryStore {
    async fn load(&self) -> Vec<Task> {
        self.tasks.read().await.clone()
    }

    async fn store(&self, tasks: &[Task]) -> Result<(), StoreError> {
        *self.tasks.write().await = tasks.to_vec();
        Ok(())
    }

    fn describe(&self) -> &'static str {
        "memory"
    }
}
