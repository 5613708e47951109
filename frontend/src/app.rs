use chrono::Utc;
use gloo_timers::future::TimeoutFuture;
use sauron::{
    html::{attributes::*, *},
    prelude::*,
};
use shared::{Task, TaskId};
use web_sys::console;

use crate::api::{SyncError, TaskApi};
use crate::http::HttpTaskApi;
use crate::store::{Mutation, StoreError, TaskStore};

const NOTIFICATION_MS: u32 = 3_000;

#[derive(Debug, Clone)]
pub enum Msg {
    LoadTasks,
    TasksLoaded(Result<Vec<Task>, SyncError>),
    SetNewTaskText(String),
    AddTask,
    ToggleTask(TaskId),
    DeleteTask(TaskId),
    Persisted(Mutation, Result<(), SyncError>),
    DismissNotification(u32),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Tone {
    Success,
    Error,
}

#[derive(Debug, Clone)]
struct Notification {
    message: String,
    tone: Tone,
    serial: u32,
}

#[derive(Debug, Clone, Default)]
pub struct Model {
    store: TaskStore,
    new_task_text: String,
    loading: bool,
    // Only one save is outstanding at a time, so rollbacks never interleave.
    saving: bool,
    notification: Option<Notification>,
    serial: u32,
}

impl Application for Model {
    type MSG = Msg;

    fn init(&mut self) -> Cmd<Msg> {
        Cmd::new(async { Msg::LoadTasks })
    }

    fn update(&mut self, msg: Msg) -> Cmd<Msg> {
        match msg {
            Msg::LoadTasks => {
                self.loading = true;
                Cmd::new(async { Msg::TasksLoaded(HttpTaskApi::new().fetch_tasks().await) })
            }
            Msg::TasksLoaded(Ok(tasks)) => {
                self.loading = false;
                self.store.replace_all(tasks);
                Cmd::none()
            }
            Msg::TasksLoaded(Err(error)) => {
                self.loading = false;
                self.fail(StoreError::Load(error))
            }
            Msg::SetNewTaskText(text) => {
                self.new_task_text = text;
                Cmd::none()
            }
            Msg::AddTask => {
                if self.saving {
                    return self.fail(StoreError::Busy);
                }
                match self.store.stage_add(&self.new_task_text, Utc::now()) {
                    Ok(mutation) => self.persist(mutation),
                    Err(error) => self.fail(error),
                }
            }
            Msg::ToggleTask(id) => {
                if self.saving {
                    return self.fail(StoreError::Busy);
                }
                match self.store.stage_toggle(&id) {
                    Some(mutation) => self.persist(mutation),
                    None => Cmd::none(),
                }
            }
            Msg::DeleteTask(id) => {
                if self.saving {
                    return self.fail(StoreError::Busy);
                }
                match self.store.stage_delete(&id) {
                    Some(mutation) => self.persist(mutation),
                    None => Cmd::none(),
                }
            }
            Msg::Persisted(mutation, persisted) => {
                self.saving = false;
                let added = matches!(mutation, Mutation::Added { .. });
                match self.store.settle(mutation, persisted) {
                    Ok(notice) => {
                        if added {
                            self.new_task_text.clear();
                        }
                        self.notify(notice.message(), Tone::Success)
                    }
                    Err(error) => self.fail(error),
                }
            }
            Msg::DismissNotification(serial) => {
                if self
                    .notification
                    .as_ref()
                    .is_some_and(|notification| notification.serial == serial)
                {
                    self.notification = None;
                }
                Cmd::none()
            }
        }
    }

    fn view(&self) -> Node<Msg> {
        div(
            [class("min-h-screen bg-ctp-base text-ctp-text")],
            [div(
                [class("max-w-2xl mx-auto px-6 py-8 space-y-6")],
                [
                    self.view_header(),
                    self.view_create_form(),
                    self.view_task_list(),
                    self.view_notification(),
                ],
            )],
        )
    }
}

impl Model {
    /// Sends the list as it stands after `mutation` was staged.
    fn persist(&mut self, mutation: Mutation) -> Cmd<Msg> {
        self.saving = true;
        let snapshot = self.store.tasks().to_vec();
        Cmd::new(async move {
            let persisted = HttpTaskApi::new()
                .save_tasks(&snapshot)
                .await
                .map(|_| ());
            Msg::Persisted(mutation, persisted)
        })
    }

    fn fail(&mut self, error: StoreError) -> Cmd<Msg> {
        match &error {
            StoreError::Load(cause) | StoreError::Save(cause) => {
                console::error_1(&format!("{error}: {cause}").into());
            }
            StoreError::EmptyText | StoreError::Busy => {}
        }
        self.notify(error.to_string(), Tone::Error)
    }

    fn notify(&mut self, message: String, tone: Tone) -> Cmd<Msg> {
        self.serial = self.serial.wrapping_add(1);
        let serial = self.serial;
        self.notification = Some(Notification {
            message,
            tone,
            serial,
        });
        Cmd::new(async move {
            TimeoutFuture::new(NOTIFICATION_MS).await;
            Msg::DismissNotification(serial)
        })
    }

    fn view_header(&self) -> Node<Msg> {
        let stats = self.store.stats();
        header(
            [class("space-y-2")],
            [
                h1([class("text-3xl font-bold text-ctp-text")], [text("TaskFlow")]),
                p(
                    [class("text-sm text-ctp-subtext1")],
                    [text(format!(
                        "{} total, {} completed, {} pending",
                        stats.total, stats.completed, stats.pending
                    ))],
                ),
            ],
        )
    }

    fn view_create_form(&self) -> Node<Msg> {
        div(
            [class("flex gap-2 p-4 bg-ctp-surface1 rounded-lg border border-ctp-surface2")],
            [
                input(
                    [
                        r#type("text"),
                        placeholder("What needs to be done?"),
                        value(&self.new_task_text),
                        on_input(|event| Msg::SetNewTaskText(event.value())),
                        class("flex-1 px-3 py-2 bg-ctp-surface0 border border-ctp-surface2 rounded-md text-ctp-text placeholder-ctp-subtext0 focus:outline-none focus:ring-2 focus:ring-ctp-blue"),
                    ],
                    [],
                ),
                button(
                    [
                        on_click(|_| Msg::AddTask),
                        class("bg-ctp-blue hover:bg-ctp-sapphire text-ctp-base font-medium px-6 py-2 rounded-md transition-colors duration-200"),
                        disabled(self.saving),
                    ],
                    [text("Add Task")],
                ),
            ],
        )
    }

    fn view_task_list(&self) -> Node<Msg> {
        if self.loading {
            return p([class("text-ctp-subtext0")], [text("Loading tasks...")]);
        }
        if self.store.tasks().is_empty() {
            return p(
                [class("text-center text-ctp-subtext0 py-8")],
                [text("No tasks yet. Add one above!")],
            );
        }

        ul(
            [class("space-y-3")],
            self.store.tasks().iter().map(|task| self.view_task(task)),
        )
    }

    fn view_task(&self, task: &Task) -> Node<Msg> {
        li(
            [
                key(task.id.to_string()),
                class(&format!(
                    "flex items-center gap-4 border rounded-xl p-4 bg-ctp-surface0 {}",
                    if task.completed {
                        "border-ctp-green bg-ctp-green/10"
                    } else {
                        "border-ctp-surface1"
                    }
                )),
            ],
            [
                input(
                    [
                        r#type("checkbox"),
                        checked(task.completed),
                        on_click({
                            let task_id = task.id.clone();
                            move |_| Msg::ToggleTask(task_id.clone())
                        }),
                        disabled(self.saving),
                    ],
                    [],
                ),
                span(
                    [class(&format!(
                        "flex-1 break-words {}",
                        if task.completed {
                            "line-through text-ctp-overlay1"
                        } else {
                            "text-ctp-text"
                        }
                    ))],
                    [text(&task.text)],
                ),
                button(
                    [
                        on_click({
                            let task_id = task.id.clone();
                            move |_| Msg::DeleteTask(task_id.clone())
                        }),
                        class("w-8 h-8 rounded-lg bg-ctp-red/20 text-ctp-red hover:bg-ctp-red/30"),
                        r#type("button"),
                        disabled(self.saving),
                    ],
                    [text("🗑️")],
                ),
            ],
        )
    }

    fn view_notification(&self) -> Node<Msg> {
        match &self.notification {
            Some(notification) => div(
                [class(&format!(
                    "fixed bottom-4 right-4 px-4 py-2 rounded-md shadow-lg {}",
                    match notification.tone {
                        Tone::Success => "bg-ctp-green text-ctp-base",
                        Tone::Error => "bg-ctp-red text-ctp-base",
                    }
                ))],
                [text(&notification.message)],
            ),
            None => span([], []),
        }
    }
}
