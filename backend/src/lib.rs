//! TaskFlow server: a single `/api/tasks` resource that reads and replaces
//! the whole task list, backed by a JSON file, process memory, or Redis.

pub mod api;
pub mod config;
pub mod error;
pub mod routes;
pub mod store;

pub use api::AppState;
pub use config::{Config, ConfigError, StorageMode};
pub use error::{ApiError, StoreError};
pub use routes::{api_router, router};
pub use store::{BackingStore, FileStore, MemoryStore, RedisStore};
