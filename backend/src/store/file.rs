use std::path::{Path, PathBuf};

use async_trait::async_trait;
use shared::Task;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use super::{BackingStore, TaskDocument, TaskDocumentRef};
use crate::error::StoreError;

/// Task list kept as a pretty-printed JSON document on disk.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    /// Serializes writes from this process; other processes are not excluded.
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn ensure_document(&self) -> Result<(), StoreError> {
        if fs::try_exists(&self.path).await? {
            return Ok(());
        }

        let _guard = self.write_lock.lock().await;
        if !fs::try_exists(&self.path).await? {
            tracing::info!(path = %self.path.display(), "creating empty task document");
            write_document(&self.path, &[]).await?;
        }
        Ok(())
    }

    async fn read_document(&self) -> Result<Vec<Task>, StoreError> {
        self.ensure_document().await?;
        let raw = fs::read_to_string(&self.path).await?;
        let document: TaskDocument = serde_json::from_str(&raw)?;
        Ok(document.tasks)
    }
}

#[async_trait]
impl BackingStore for FileStore {
    async fn load(&self) -> Vec<Task> {
        match self.read_document().await {
            Ok(tasks) => tasks,
            Err(error) => {
                tracing::warn!(path = %self.path.display(), %error, "error reading tasks, serving an empty list");
                Vec::new()
            }
        }
    }

    async fn store(&self, tasks: &[Task]) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        write_document(&self.path, tasks).await
    }

    fn describe(&self) -> &'static str {
        "file"
    }
}

async fn write_document(path: &Path, tasks: &[Task]) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(&TaskDocumentRef { tasks })?;
    write_atomic(path, json.as_bytes()).await
}

/// Writes to a sibling temp file and renames it over `path`, so readers see
/// either the old document or the new one.
async fn write_atomic(path: &Path, data: &[u8]) -> Result<(), StoreError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }

    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let temp_path = path.with_extension(format!("{extension}.tmp.{}", std::process::id()));

    let result = async {
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(data).await?;
        file.sync_all().await?;
        drop(file);
        fs::rename(&temp_path, path).await
    }
    .await;

    if result.is_err() {
        let _ = fs::remove_file(&temp_path).await;
    }
    Ok(result?)
}
