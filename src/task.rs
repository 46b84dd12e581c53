use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Column a task belongs to.
///
/// The three known statuses map to the board's columns. Anything else the
/// server sends is kept as `Unrecognized` so a single odd record does not
/// fail decoding of the whole task list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TaskStatus {
    ToDo,
    InProgress,
    Done,
    Unrecognized(String),
}

impl TaskStatus {
    /// Left-to-right display order of the board's columns.
    pub const COLUMN_ORDER: [TaskStatus; 3] =
        [TaskStatus::ToDo, TaskStatus::InProgress, TaskStatus::Done];

    pub fn as_str(&self) -> &str {
        match self {
            TaskStatus::ToDo => "To Do",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Done => "Done",
            TaskStatus::Unrecognized(raw) => raw,
        }
    }

    /// Position of this status in [`TaskStatus::COLUMN_ORDER`], if it names a column.
    pub fn column_index(&self) -> Option<usize> {
        match self {
            TaskStatus::ToDo => Some(0),
            TaskStatus::InProgress => Some(1),
            TaskStatus::Done => Some(2),
            TaskStatus::Unrecognized(_) => None,
        }
    }

    pub fn is_recognized(&self) -> bool {
        self.column_index().is_some()
    }
}

impl From<String> for TaskStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "To Do" => TaskStatus::ToDo,
            "In Progress" => TaskStatus::InProgress,
            "Done" => TaskStatus::Done,
            _ => TaskStatus::Unrecognized(raw),
        }
    }
}

impl From<TaskStatus> for String {
    fn from(status: TaskStatus) -> Self {
        match status {
            TaskStatus::Unrecognized(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: TaskStatus,
    #[serde(deserialize_with = "deserialize_order")]
    pub order: i64,
}

/// Body of `POST /tasks`.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct TaskCreate {
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
}

/// Body of `PUT /tasks/{id}`. Status and order only change through a move.
///
/// `description: Some(None)` is sent as an explicit `null`, which clears it.
#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct TaskUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
}

/// Body of `PATCH /tasks/{id}/move`.
#[derive(Debug, Serialize, Clone, Default, PartialEq)]
pub struct TaskMove {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
}

// The API stores order as a float; the board ranks by whole positions.
fn deserialize_order<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawOrder {
        Int(i64),
        Float(f64),
    }

    match RawOrder::deserialize(deserializer)? {
        RawOrder::Int(order) => Ok(order),
        RawOrder::Float(order) if order.is_finite() => Ok(order.round() as i64),
        RawOrder::Float(order) => Err(serde::de::Error::custom(format!(
            "task order must be a finite number, got {order}"
        ))),
    }
}
