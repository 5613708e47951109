//! Types exchanged between the task API and the browser client.

pub mod task;
pub mod wire;

pub use task::{duplicate_ids, is_truthy, iso_timestamp, normalize_all, Task, TaskId};
pub use wire::{
    method_not_allowed, ApiReply, ErrorBody, ListResponse, ReplaceRequest, ReplaceResponse,
    TaskStats, ERR_INTERNAL, ERR_INVALID_JSON, ERR_SAVE_FAILED, ERR_TASKS_NOT_ARRAY,
    MSG_TASKS_UPDATED, TASKS_PATH,
};
