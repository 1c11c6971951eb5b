//! Task model definitions
//!
//! These types mirror the JSON the task API sends and accepts.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// Server-assigned task identifier
pub type TaskId = i64;

/// Task status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
}

impl Default for TaskStatus {
    fn default() -> Self {
        Self::Todo
    }
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::Done => "done",
        }
    }

    /// Display label shown on a task card
    pub fn label(self) -> &'static str {
        match self {
            Self::Todo => "TODO",
            Self::InProgress => "In Progress",
            Self::Done => "DONE",
        }
    }
}

impl FromStr for TaskStatus {
    type Err = ClientError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().replace('-', "_").as_str() {
            "todo" => Ok(Self::Todo),
            "in_progress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            _ => Err(ClientError::InvalidInput(format!(
                "Unsupported status '{}'",
                value
            ))),
        }
    }
}

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Now,
    Then,
}

impl Default for TaskPriority {
    fn default() -> Self {
        Self::Then
    }
}

impl TaskPriority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Now => "now",
            Self::Then => "then",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Now => "NOW",
            Self::Then => "THEN",
        }
    }
}

impl FromStr for TaskPriority {
    type Err = ClientError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "now" => Ok(Self::Now),
            "then" => Ok(Self::Then),
            _ => Err(ClientError::InvalidInput(format!(
                "Unsupported priority '{}'",
                value
            ))),
        }
    }
}

/// A task as reported by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    /// Owner username; read-only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    pub title: String,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub done_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn is_done(&self) -> bool {
        self.status == TaskStatus::Done
    }

    /// Copy out every writable field, ready for a whole-object replace
    pub fn fields(&self) -> TaskFields {
        TaskFields {
            title: self.title.clone(),
            status: self.status,
            priority: self.priority,
            due_date: self.due_date,
            comment: self.comment.clone(),
        }
    }
}

/// The writable part of a task; body of create and replace requests
///
/// Optional fields serialize as explicit `null` so a replace never leaves
/// a field out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFields {
    pub title: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<NaiveDate>,
    pub comment: Option<String>,
}

impl TaskFields {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            status: TaskStatus::default(),
            priority: TaskPriority::default(),
            due_date: None,
            comment: None,
        }
    }

    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }
}

/// Equality filters for the task list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<NaiveDate>,
}

impl TaskFilter {
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.priority.is_none() && self.due_date.is_none()
    }

    /// Query string including the leading `?`, or empty when no filter is set
    pub fn query_string(&self) -> String {
        let mut pairs = Vec::new();
        if let Some(status) = self.status {
            pairs.push(format!("status={}", status.as_str()));
        }
        if let Some(priority) = self.priority {
            pairs.push(format!("priority={}", priority.as_str()));
        }
        if let Some(due_date) = self.due_date {
            let date = due_date.format("%Y-%m-%d").to_string();
            pairs.push(format!("due_date={}", urlencoding::encode(&date)));
        }

        if pairs.is_empty() {
            String::new()
        } else {
            format!("?{}", pairs.join("&"))
        }
    }
}
