//! Browser side of TaskFlow.
//!
//! `store` and `api` hold the client's task cache and its sync rules and
//! build on any target. `http` and `app` are the fetch client and the sauron
//! UI, and are only compiled for `wasm32`.

pub mod api;
pub mod store;

#[cfg(target_arch = "wasm32")]
mod app;
#[cfg(target_arch = "wasm32")]
pub mod http;

pub use api::{interpret_reply, SyncError, TaskApi};
pub use store::{Mutation, Notice, StoreError, TaskStore};

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    sauron::Program::mount_to_body(app::Model::default());
}
