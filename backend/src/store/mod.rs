//! Backing stores for the task list.
//!
//! Every variant holds one document, `{"tasks": [...]}`, and exposes the same
//! two operations:
//!
//! - `load` never fails. Unreadable or malformed data is logged and read as
//!   an empty list, so listing tasks always succeeds.
//! - `store` overwrites the whole document and reports failures.
//!
//! There is no locking between `load` and `store` and no version check. Two
//! concurrent replaces race, and the later write wins.

mod file;
mod memory;
mod redis;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use shared::Task;

use crate::config::{Config, StorageMode};
use crate::error::StoreError;

pub use self::file::FileStore;
pub use self::memory::MemoryStore;
pub use self::redis::RedisStore;

#[async_trait]
pub trait BackingStore: Send + Sync {
    /// Current task list; an empty list when nothing usable is stored.
    async fn load(&self) -> Vec<Task>;

    /// Replaces the stored list with `tasks`.
    async fn store(&self, tasks: &[Task]) -> Result<(), StoreError>;

    /// Short name of the variant, for logs.
    fn describe(&self) -> &'static str;
}

/// On-disk and in-cache shape of the task list.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct TaskDocument {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tasks: Vec<Task>,
}

#[derive(Debug, Serialize)]
pub(crate) struct TaskDocumentRef<'a> {
    pub tasks: &'a [Task],
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Task>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Task>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Builds the store selected by `config`.
pub fn open(config: &Config) -> Result<Arc<dyn BackingStore>, StoreError> {
    let store: Arc<dyn BackingStore> = match config.storage {
        StorageMode::File => Arc::new(FileStore::new(&config.db_path)),
        StorageMode::Memory => Arc::new(MemoryStore::new()),
        StorageMode::Redis => Arc::new(RedisStore::open(&config.redis_url, &config.redis_key)?),
    };
    Ok(store)
}
