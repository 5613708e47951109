use std::cell::Cell;
use std::rc::Rc;

use async_trait::async_trait;
use gloo_timers::callback::Timeout;
use shared::{ReplaceRequest, Task, TASKS_PATH};
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;
use web_sys::{console, AbortController, Request, RequestInit, Response};

use crate::api::{interpret_reply, SyncError, TaskApi};

pub const DEFAULT_TIMEOUT_MS: u32 = 10_000;

/// [`TaskApi`] over the browser's `fetch`, against the page's own origin.
#[derive(Debug, Clone)]
pub struct HttpTaskApi {
    url: String,
    timeout_ms: u32,
}

impl Default for HttpTaskApi {
    fn default() -> Self {
        Self {
            url: TASKS_PATH.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl HttpTaskApi {
    pub fn new() -> Self {
        Self::default()
    }

    async fn send(&self, method: &str, body: Option<String>) -> Result<Vec<Task>, SyncError> {
        let window = web_sys::window().ok_or_else(|| SyncError::Network("no window".to_string()))?;
        let controller = AbortController::new().map_err(network)?;

        let opts = RequestInit::new();
        opts.set_method(method);
        opts.set_signal(Some(&controller.signal()));
        if let Some(body) = &body {
            opts.set_body(&JsValue::from_str(body));
        }

        let request = Request::new_with_str_and_init(&self.url, &opts).map_err(network)?;
        if body.is_some() {
            request
                .headers()
                .set("Content-Type", "application/json")
                .map_err(network)?;
        }

        // Aborts the request if it has not completed in time. Dropping the
        // timer cancels it.
        let timed_out = Rc::new(Cell::new(false));
        let _timer = {
            let timed_out = timed_out.clone();
            let controller = controller.clone();
            Timeout::new(self.timeout_ms, move || {
                timed_out.set(true);
                controller.abort();
            })
        };
        let failed = |error: JsValue| {
            if timed_out.get() {
                SyncError::Timeout(self.timeout_ms)
            } else {
                network(error)
            }
        };

        let response: Response = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(failed)?
            .into();

        let text_promise = response.text().map_err(failed)?;
        let text = JsFuture::from(text_promise)
            .await
            .map_err(failed)?
            .as_string()
            .ok_or_else(|| SyncError::Decode("response body is not text".to_string()))?;

        interpret_reply(response.status(), &text)
    }
}

#[async_trait(?Send)]
impl TaskApi for HttpTaskApi {
    async fn fetch_tasks(&self) -> Result<Vec<Task>, SyncError> {
        let tasks = self.send("GET", None).await?;
        console::log_1(&format!("Fetched {} tasks", tasks.len()).into());
        Ok(tasks)
    }

    async fn save_tasks(&self, tasks: &[Task]) -> Result<Vec<Task>, SyncError> {
        let request = ReplaceRequest {
            tasks: tasks.to_vec(),
        };
        let body = serde_json::to_string(&request)
            .map_err(|error| SyncError::Decode(error.to_string()))?;
        self.send("POST", Some(body)).await
    }
}

fn network(error: JsValue) -> SyncError {
    SyncError::Network(format!("{error:?}"))
}
