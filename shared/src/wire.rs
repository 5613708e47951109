use serde::{Deserialize, Serialize};

use crate::task::Task;

pub const TASKS_PATH: &str = "/api/tasks";

pub const MSG_TASKS_UPDATED: &str = "Tasks updated successfully";
pub const ERR_INVALID_JSON: &str = "Invalid JSON in request body";
pub const ERR_TASKS_NOT_ARRAY: &str = "Tasks must be an array";
pub const ERR_SAVE_FAILED: &str = "Failed to save tasks";
pub const ERR_INTERNAL: &str = "Internal server error";

pub fn method_not_allowed(verb: &str) -> String {
    format!("Method {verb} not allowed")
}

/// Body of a full-list replace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplaceRequest {
    pub tasks: Vec<Task>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse {
    pub success: bool,
    pub tasks: Vec<Task>,
    pub count: usize,
}

impl ListResponse {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            success: true,
            count: tasks.len(),
            tasks,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplaceResponse {
    pub success: bool,
    pub message: String,
    pub tasks: Vec<Task>,
    pub count: usize,
}

impl ReplaceResponse {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            success: true,
            message: MSG_TASKS_UPDATED.to_string(),
            count: tasks.len(),
            tasks,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

/// Any reply from the tasks resource, read leniently by the client.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiReply {
    pub success: bool,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
}

impl TaskStats {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let completed = tasks.iter().filter(|task| task.completed).count();
        Self {
            total: tasks.len(),
            completed,
            pending: tasks.len() - completed,
        }
    }
}
