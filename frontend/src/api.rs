use async_trait::async_trait;
use shared::{ApiReply, Task};
use thiserror::Error;

/// Why a call to the tasks resource did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out after {0} ms")]
    Timeout(u32),

    #[error("HTTP error! status: {0}")]
    Status(u16),

    #[error("server rejected the request: {0}")]
    Rejected(String),

    #[error("unreadable response: {0}")]
    Decode(String),
}

/// The two calls the client makes against `/api/tasks`.
#[async_trait(?Send)]
pub trait TaskApi {
    async fn fetch_tasks(&self) -> Result<Vec<Task>, SyncError>;

    /// Sends the full list. On success, returns the list as the server
    /// normalized it.
    async fn save_tasks(&self, tasks: &[Task]) -> Result<Vec<Task>, SyncError>;
}

/// Reads a raw HTTP reply from the tasks resource.
///
/// A non-2xx status fails first. After that, the body must parse and report
/// `success: true`.
pub fn interpret_reply(status: u16, body: &str) -> Result<Vec<Task>, SyncError> {
    if !(200..300).contains(&status) {
        return Err(SyncError::Status(status));
    }

    let reply: ApiReply =
        serde_json::from_str(body).map_err(|error| SyncError::Decode(error.to_string()))?;

    if reply.success {
        Ok(reply.tasks)
    } else {
        Err(SyncError::Rejected(
            reply.error.unwrap_or_else(|| "Unknown server error".to_string()),
        ))
    }
}
