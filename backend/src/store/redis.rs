use ::redis::{AsyncCommands, Client};
use async_trait::async_trait;
use shared::Task;

use super::{BackingStore, TaskDocument, TaskDocumentRef};
use crate::error::StoreError;

/// Task document stored as one JSON string under a single Redis key.
///
/// Durability is whatever the Redis server is configured for.
#[derive(Debug, Clone)]
pub struct RedisStore {
    client: Client,
    key: String,
}

impl RedisStore {
    /// Validates the URL; no connection is made until the first request.
    pub fn open(url: &str, key: impl Into<String>) -> Result<Self, StoreError> {
        Ok(Self {
            client: Client::open(url)?,
            key: key.into(),
        })
    }

    async fn read_document(&self) -> Result<Vec<Task>, StoreError> {
        let mut conn = self.client.get_async_connection().await?;
        let raw: Option<String> = conn.get(&self.key).await?;
        match raw {
            Some(json) => Ok(serde_json::from_str::<TaskDocument>(&json)?.tasks),
            None => Ok(Vec::new()),
        }
    }
}

#[async_trait]
impl BackingStore for RedisStore {
    async fn load(&self) -> Vec<Task> {
        match self.read_document().await {
            Ok(tasks) => tasks,
            Err(error) => {
                tracing::warn!(key = %self.key, %error, "error reading tasks from redis, serving an empty list");
                Vec::new()
            }
        }
    }

    async fn store(&self, tasks: &[Task]) -> Result<(), StoreError> {
        let json = serde_json::to_string(&TaskDocumentRef { tasks })?;
        let mut conn = self.client.get_async_connection().await?;
        let () = conn.set(&self.key, json).await?;
        Ok(())
    }

    fn describe(&self) -> &'static str {
        "redis"
    }
}
