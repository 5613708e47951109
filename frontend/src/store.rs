//! The client's cached copy of the task list.
//!
//! Every change is applied to the cache first and then persisted by sending
//! the whole list. If the save fails the change is undone, so the cache
//! matches the last list the server accepted.
//!
//! The UI cannot hold `&mut TaskStore` across an await, so each mutation is
//! split in two: `stage_*` applies it and returns a [`Mutation`], and
//! [`TaskStore::settle`] keeps or undoes it once the save resolves. The
//! async `add`/`toggle`/`delete` methods chain both halves for callers that
//! can hold the borrow.

use chrono::{DateTime, Utc};
use shared::{Task, TaskId, TaskStats};
use thiserror::Error;

use crate::api::{SyncError, TaskApi};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Please enter a task description")]
    EmptyText,

    #[error("Please wait for the current change to finish saving")]
    Busy,

    #[error("Failed to load tasks. Please check your connection.")]
    Load(#[source] SyncError),

    #[error("Failed to save tasks. Please try again.")]
    Save(#[source] SyncError),
}

/// Outcome of an operation that succeeded, for user feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Loaded(usize),
    Added,
    MarkedDone,
    MarkedNotDone,
    Deleted,
}

impl Notice {
    pub fn message(&self) -> String {
        match self {
            Notice::Loaded(count) => format!("Loaded {count} tasks"),
            Notice::Added => "Task added successfully".to_string(),
            Notice::MarkedDone => "Task marked as done".to_string(),
            Notice::MarkedNotDone => "Task marked as not done".to_string(),
            Notice::Deleted => "Task deleted successfully".to_string(),
        }
    }
}

/// A change applied to the cache and not yet confirmed by the server.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    Added { id: TaskId },
    /// `completed` is the state after the toggle.
    Toggled { id: TaskId, completed: bool },
    Deleted { task: Task, index: usize },
}

impl Mutation {
    fn notice(&self) -> Notice {
        match self {
            Mutation::Added { .. } => Notice::Added,
            Mutation::Toggled { completed: true, .. } => Notice::MarkedDone,
            Mutation::Toggled { completed: false, .. } => Notice::MarkedNotDone,
            Mutation::Deleted { .. } => Notice::Deleted,
        }
    }

    fn undo(self, tasks: &mut Vec<Task>) {
        match self {
            Mutation::Added { id } => {
                if let Some(position) = tasks.iter().rposition(|task| task.id == id) {
                    tasks.remove(position);
                }
            }
            Mutation::Toggled { id, completed } => {
                if let Some(task) = tasks.iter_mut().find(|task| task.id == id) {
                    task.completed = !completed;
                }
            }
            Mutation::Deleted { task, index } => {
                let index = index.min(tasks.len());
                tasks.insert(index, task);
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn stats(&self) -> TaskStats {
        TaskStats::from_tasks(&self.tasks)
    }

    /// Replaces the cache wholesale, as after a successful fetch.
    pub fn replace_all(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
    }

    /// Appends a new pending task with the trimmed text.
    pub fn stage_add(&mut self, text: &str, now: DateTime<Utc>) -> Result<Mutation, StoreError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(StoreError::EmptyText);
        }

        let task = Task::new(text, now);
        let id = task.id.clone();
        self.tasks.push(task);
        Ok(Mutation::Added { id })
    }

    /// Flips the first task with `id`. Returns `None` when no task matches.
    pub fn stage_toggle(&mut self, id: &TaskId) -> Option<Mutation> {
        let task = self.tasks.iter_mut().find(|task| &task.id == id)?;
        task.completed = !task.completed;
        Some(Mutation::Toggled {
            id: id.clone(),
            completed: task.completed,
        })
    }

    /// Removes the first task with `id`. Returns `None` when no task matches.
    pub fn stage_delete(&mut self, id: &TaskId) -> Option<Mutation> {
        let index = self.tasks.iter().position(|task| &task.id == id)?;
        let task = self.tasks.remove(index);
        Some(Mutation::Deleted { task, index })
    }

    /// Keeps `mutation` if the save succeeded, otherwise undoes it.
    pub fn settle(
        &mut self,
        mutation: Mutation,
        persisted: Result<(), SyncError>,
    ) -> Result<Notice, StoreError> {
        match persisted {
            Ok(()) => Ok(mutation.notice()),
            Err(error) => {
                mutation.undo(&mut self.tasks);
                Err(StoreError::Save(error))
            }
        }
    }

    /// Fetches the list and replaces the cache. On failure the cache is left
    /// as it was.
    pub async fn load<A: TaskApi + ?Sized>(&mut self, api: &A) -> Result<Notice, StoreError> {
        let tasks = api.fetch_tasks().await.map_err(StoreError::Load)?;
        let count = tasks.len();
        self.tasks = tasks;
        Ok(Notice::Loaded(count))
    }

    pub async fn add<A: TaskApi + ?Sized>(
        &mut self,
        api: &A,
        text: &str,
    ) -> Result<Notice, StoreError> {
        let mutation = self.stage_add(text, Utc::now())?;
        let persisted = self.persist(api).await;
        self.settle(mutation, persisted)
    }

    /// Returns `Ok(None)` without contacting the server when `id` is absent.
    pub async fn toggle<A: TaskApi + ?Sized>(
        &mut self,
        api: &A,
        id: &TaskId,
    ) -> Result<Option<Notice>, StoreError> {
        let Some(mutation) = self.stage_toggle(id) else {
            return Ok(None);
        };
        let persisted = self.persist(api).await;
        self.settle(mutation, persisted).map(Some)
    }

    /// Returns `Ok(None)` without contacting the server when `id` is absent.
    pub async fn delete<A: TaskApi + ?Sized>(
        &mut self,
        api: &A,
        id: &TaskId,
    ) -> Result<Option<Notice>, StoreError> {
        let Some(mutation) = self.stage_delete(id) else {
            return Ok(None);
        };
        let persisted = self.persist(api).await;
        self.settle(mutation, persisted).map(Some)
    }

    // The server's normalized copy is not written back into the cache.
    async fn persist<A: TaskApi + ?Sized>(&self, api: &A) -> Result<(), SyncError> {
        api.save_tasks(&self.tasks).await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use async_trait::async_trait;
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    use super::*;

    /// In-memory server double that records every save.
    #[derive(Default)]
    struct FakeApi {
        remote: RefCell<Vec<Task>>,
        saves: RefCell<Vec<Vec<Task>>>,
        fail_fetch: Cell<bool>,
        fail_save: Cell<bool>,
    }

    impl FakeApi {
        fn save_count(&self) -> usize {
            self.saves.borrow().len()
        }
    }

    #[async_trait(?Send)]
    impl TaskApi for FakeApi {
        async fn fetch_tasks(&self) -> Result<Vec<Task>, SyncError> {
            if self.fail_fetch.get() {
                return Err(SyncError::Network("connection refused".to_string()));
            }
            Ok(self.remote.borrow().clone())
        }

        async fn save_tasks(&self, tasks: &[Task]) -> Result<Vec<Task>, SyncError> {
            self.saves.borrow_mut().push(tasks.to_vec());
            if self.fail_save.get() {
                return Err(SyncError::Status(500));
            }
            *self.remote.borrow_mut() = tasks.to_vec();
            Ok(tasks.to_vec())
        }
    }

    fn task(id: i64, text: &str, completed: bool) -> Task {
        Task {
            id: TaskId::from(id),
            text: text.to_string(),
            completed,
            created_at: "2025-01-01T00:00:00.000Z".to_string(),
        }
    }

    #[fixture]
    fn seeded() -> TaskStore {
        let mut store = TaskStore::new();
        store.replace_all(vec![
            task(1, "write report", false),
            task(2, "buy milk", true),
            task(3, "call mom", false),
        ]);
        store
    }

    // =========================================================================
    // Load
    // =========================================================================

    #[tokio::test]
    async fn load_replaces_cache() {
        let api = FakeApi::default();
        *api.remote.borrow_mut() = vec![task(7, "remote", false)];
        let mut store = TaskStore::new();

        let notice = store.load(&api).await.unwrap();

        assert_eq!(notice, Notice::Loaded(1));
        assert_eq!(store.tasks(), &[task(7, "remote", false)]);
    }

    #[rstest]
    #[tokio::test]
    async fn failed_load_leaves_cache_untouched(seeded: TaskStore) {
        let api = FakeApi::default();
        api.fail_fetch.set(true);
        let mut store = seeded.clone();

        let result = store.load(&api).await;

        assert!(matches!(result, Err(StoreError::Load(SyncError::Network(_)))));
        assert_eq!(store.tasks(), seeded.tasks());
    }

    // =========================================================================
    // Add
    // =========================================================================

    #[tokio::test]
    async fn add_appends_trimmed_pending_task_and_saves_full_list() {
        let api = FakeApi::default();
        let mut store = TaskStore::new();
        store.replace_all(vec![task(1, "first", true)]);

        let notice = store.add(&api, "  second  ").await.unwrap();

        assert_eq!(notice, Notice::Added);
        let tasks = store.tasks();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[1].text, "second");
        assert!(!tasks[1].completed);
        assert_eq!(api.saves.borrow().as_slice(), &[tasks.to_vec()]);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("\t\n")]
    #[tokio::test]
    async fn blank_text_is_rejected_without_saving(#[case] text: &str) {
        let api = FakeApi::default();
        let mut store = TaskStore::new();

        let result = store.add(&api, text).await;

        assert_eq!(result, Err(StoreError::EmptyText));
        assert!(store.tasks().is_empty());
        assert_eq!(api.save_count(), 0);
    }

    #[rstest]
    #[tokio::test]
    async fn failed_add_is_rolled_back(seeded: TaskStore) {
        let api = FakeApi::default();
        api.fail_save.set(true);
        let mut store = seeded.clone();

        let result = store.add(&api, "new").await;

        assert_eq!(result, Err(StoreError::Save(SyncError::Status(500))));
        assert_eq!(store.tasks(), seeded.tasks());
        assert_eq!(api.save_count(), 1);
    }

    #[test]
    fn staged_add_uses_clock_for_id_and_timestamp() {
        let now = Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap();
        let mut store = TaskStore::new();

        let mutation = store.stage_add("tea", now).unwrap();

        let expected = TaskId::from(now.timestamp_millis());
        assert_eq!(mutation, Mutation::Added { id: expected.clone() });
        assert_eq!(store.tasks()[0].id, expected);
        assert_eq!(store.tasks()[0].created_at, "2025-03-14T09:26:53.000Z");
    }

    // =========================================================================
    // Toggle
    // =========================================================================

    #[rstest]
    #[case(1, true, Notice::MarkedDone)]
    #[case(2, false, Notice::MarkedNotDone)]
    #[tokio::test]
    async fn toggle_flips_completion(
        seeded: TaskStore,
        #[case] id: i64,
        #[case] expected: bool,
        #[case] notice: Notice,
    ) {
        let api = FakeApi::default();
        let mut store = seeded;
        let id = TaskId::from(id);

        let result = store.toggle(&api, &id).await;

        assert_eq!(result, Ok(Some(notice)));
        let toggled = store.tasks().iter().find(|task| task.id == id).unwrap();
        assert_eq!(toggled.completed, expected);
        assert_eq!(api.save_count(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn failed_toggle_is_rolled_back(seeded: TaskStore) {
        let api = FakeApi::default();
        api.fail_save.set(true);
        let mut store = seeded.clone();

        let result = store.toggle(&api, &TaskId::from(1)).await;

        assert!(matches!(result, Err(StoreError::Save(_))));
        assert_eq!(store.tasks(), seeded.tasks());
    }

    // =========================================================================
    // Delete
    // =========================================================================

    #[rstest]
    #[tokio::test]
    async fn delete_removes_task_and_keeps_order(seeded: TaskStore) {
        let api = FakeApi::default();
        let mut store = seeded;

        let result = store.delete(&api, &TaskId::from(2)).await;

        assert_eq!(result, Ok(Some(Notice::Deleted)));
        assert_eq!(
            store.tasks(),
            &[task(1, "write report", false), task(3, "call mom", false)]
        );
        assert_eq!(api.remote.borrow().as_slice(), store.tasks());
    }

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(3)]
    #[tokio::test]
    async fn failed_delete_restores_task_at_original_position(
        seeded: TaskStore,
        #[case] id: i64,
    ) {
        let api = FakeApi::default();
        api.fail_save.set(true);
        let mut store = seeded.clone();

        let result = store.delete(&api, &TaskId::from(id)).await;

        assert!(matches!(result, Err(StoreError::Save(_))));
        assert_eq!(store.tasks(), seeded.tasks());
    }

    // =========================================================================
    // Absent ids
    // =========================================================================

    #[rstest]
    #[tokio::test]
    async fn absent_id_is_a_no_op(seeded: TaskStore) {
        let api = FakeApi::default();
        let mut store = seeded.clone();
        let missing = TaskId::from("nope");

        assert_eq!(store.toggle(&api, &missing).await, Ok(None));
        assert_eq!(store.delete(&api, &missing).await, Ok(None));
        assert_eq!(store.tasks(), seeded.tasks());
        assert_eq!(api.save_count(), 0);
    }

    // =========================================================================
    // Stats and messages
    // =========================================================================

    #[rstest]
    fn stats_reflect_cache(seeded: TaskStore) {
        let stats = seeded.stats();

        assert_eq!((stats.total, stats.completed, stats.pending), (3, 1, 2));
    }

    #[test]
    fn each_outcome_has_distinct_message() {
        let messages = [
            Notice::Added,
            Notice::MarkedDone,
            Notice::MarkedNotDone,
            Notice::Deleted,
        ]
        .map(|notice| notice.message());

        for (i, a) in messages.iter().enumerate() {
            for b in &messages[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert_eq!(Notice::Loaded(4).message(), "Loaded 4 tasks");
    }
}
