use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// Identifier of a task. Callers may supply any truthy scalar; ids the
/// server generates are always numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskId {
    Number(Number),
    Text(String),
    Flag(bool),
}

impl TaskId {
    /// Millisecond timestamp offset by the record's position in its batch, so
    /// ids generated within one request stay distinct.
    pub fn generated(now: DateTime<Utc>, index: usize) -> Self {
        let offset = i64::try_from(index).unwrap_or(i64::MAX);
        Self::Number(Number::from(now.timestamp_millis().saturating_add(offset)))
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(text) if !text.is_empty() => Some(Self::Text(text.clone())),
            Value::Number(number) if is_truthy(value) => Some(Self::Number(number.clone())),
            Value::Bool(true) => Some(Self::Flag(true)),
            _ => None,
        }
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskId::Number(number) => write!(f, "{number}"),
            TaskId::Text(text) => f.write_str(text),
            TaskId::Flag(flag) => write!(f, "{flag}"),
        }
    }
}

impl From<i64> for TaskId {
    fn from(value: i64) -> Self {
        Self::Number(Number::from(value))
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    pub completed: bool,
    pub created_at: String,
}

impl Task {
    /// A fresh, not yet completed task as the client creates it.
    pub fn new(text: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: TaskId::generated(now, 0),
            text: text.into(),
            completed: false,
            created_at: iso_timestamp(now),
        }
    }

    /// Fills in defaults for a caller-supplied record.
    ///
    /// Anything that is not an object is treated as an empty record. Each
    /// field is checked on its own, so a bad field never discards the others:
    ///
    /// - `id` is kept when it is a non-empty string, a non-zero number or
    ///   `true`, otherwise generated from `now` and `index`.
    /// - `text` is kept when it is a string. Non-zero numbers and `true` are
    ///   rendered as text, and anything else becomes `""`.
    /// - `completed` is the truthiness of whatever was supplied.
    /// - `createdAt` is kept when it is a non-empty string, otherwise `now`.
    pub fn normalize(raw: &Value, index: usize, now: DateTime<Utc>) -> Self {
        let id = raw
            .get("id")
            .and_then(TaskId::from_value)
            .unwrap_or_else(|| TaskId::generated(now, index));

        let text = match raw.get("text") {
            Some(Value::String(text)) => text.clone(),
            Some(value @ Value::Number(number)) if is_truthy(value) => number.to_string(),
            Some(Value::Bool(true)) => "true".to_string(),
            _ => String::new(),
        };

        let completed = raw.get("completed").is_some_and(is_truthy);

        let created_at = match raw.get("createdAt") {
            Some(Value::String(stamp)) if !stamp.is_empty() => stamp.clone(),
            _ => iso_timestamp(now),
        };

        Self {
            id,
            text,
            completed,
            created_at,
        }
    }
}

/// Normalizes a submitted batch element by element, keeping submission order.
pub fn normalize_all(raw: &[Value], now: DateTime<Utc>) -> Vec<Task> {
    raw.iter()
        .enumerate()
        .map(|(index, record)| Task::normalize(record, index, now))
        .collect()
}

/// Ids that occur more than once, each reported once in first-seen order.
pub fn duplicate_ids(tasks: &[Task]) -> Vec<TaskId> {
    let mut seen = HashSet::with_capacity(tasks.len());
    let mut reported = HashSet::new();
    let mut duplicates = Vec::new();

    for task in tasks {
        let key = task.id.to_string();
        if !seen.insert(key.clone()) && reported.insert(key) {
            duplicates.push(task.id.clone());
        }
    }

    duplicates
}

/// `false`, `null`, `0`, and `""` are falsy. Everything else is truthy,
/// including the string `"false"` and empty containers.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().map_or(true, |n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// ISO-8601 with millisecond precision and a `Z` suffix, e.g.
/// `2025-01-01T00:00:00.000Z`.
pub fn iso_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}
