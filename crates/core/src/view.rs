//! Task board rendering
//!
//! Turns a fetched task list into render instructions. Nothing here talks to
//! the network or mutates tasks; every fetch produces a brand new board.

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::ClientError;
use crate::intent::{EditForm, Intent};
use crate::task::{Task, TaskId, TaskStatus};

pub const ACTIVE_LOADING: &str = "Loading To Do & In Progress tasks...";
pub const DONE_LOADING: &str = "Loading DONE tasks...";
pub const ACTIVE_EMPTY: &str = "No To Do or In Progress tasks.";
pub const DONE_EMPTY: &str = "No DONE tasks.";
pub const LOAD_ERROR: &str = "Error loading tasks.";
pub const CONNECT_ERROR: &str = "Error connecting to server.";

/// Tasks split by completion, in server order
#[derive(Debug, Clone, PartialEq)]
pub struct Partition<'a> {
    pub active: Vec<&'a Task>,
    pub done: Vec<&'a Task>,
}

/// Split tasks into "active" (todo, in progress) and "done"
pub fn partition(tasks: &[Task]) -> Partition<'_> {
    let (done, active) = tasks.iter().partition(|task| task.is_done());
    Partition { active, done }
}

/// What one bucket of the board shows
#[derive(Debug, Clone, PartialEq)]
pub enum Section {
    Loading(&'static str),
    Empty(&'static str),
    Error(&'static str),
    Cleared,
    Cards(Vec<TaskCard>),
}

impl Section {
    fn from_tasks(tasks: &[&Task], empty: &'static str) -> Self {
        if tasks.is_empty() {
            Self::Empty(empty)
        } else {
            Self::Cards(tasks.iter().map(|task| TaskCard::from_task(task)).collect())
        }
    }

    pub fn cards(&self) -> &[TaskCard] {
        match self {
            Self::Cards(cards) => cards,
            _ => &[],
        }
    }

    /// Placeholder text, when the section is not showing cards
    pub fn placeholder(&self) -> Option<&str> {
        match self {
            Self::Loading(text) | Self::Empty(text) | Self::Error(text) => Some(*text),
            Self::Cleared | Self::Cards(_) => None,
        }
    }
}

/// The whole task board: active bucket and done bucket
#[derive(Debug, Clone, PartialEq)]
pub struct BoardView {
    pub active: Section,
    pub done: Section,
}

impl BoardView {
    /// Shown while the task list is being fetched
    pub fn loading() -> Self {
        Self {
            active: Section::Loading(ACTIVE_LOADING),
            done: Section::Loading(DONE_LOADING),
        }
    }

    /// Shown when the task list could not be fetched
    pub fn failed(error: &ClientError) -> Self {
        let message = match error {
            ClientError::Network(_) => CONNECT_ERROR,
            _ => LOAD_ERROR,
        };
        Self {
            active: Section::Error(message),
            done: Section::Cleared,
        }
    }

    /// Find a rendered card by task id
    pub fn card(&self, id: TaskId) -> Option<&TaskCard> {
        self.active
            .cards()
            .iter()
            .chain(self.done.cards())
            .find(|card| card.id == id)
    }
}

/// Render a fresh board from a task list
pub fn render(tasks: &[Task]) -> BoardView {
    let buckets = partition(tasks);
    BoardView {
        active: Section::from_tasks(&buckets.active, ACTIVE_EMPTY),
        done: Section::from_tasks(&buckets.done, DONE_EMPTY),
    }
}

/// Presentational unit for a single task
#[derive(Debug, Clone, PartialEq)]
pub struct TaskCard {
    pub id: TaskId,
    pub title: String,
    pub status: TaskStatus,
    pub status_label: &'static str,
    pub priority_label: &'static str,
    pub due_date: Option<String>,
    pub comment: Option<String>,
    pub created_at: String,
    pub done_at: Option<String>,
    pub intents: Vec<Intent>,
}

impl TaskCard {
    pub fn from_task(task: &Task) -> Self {
        let mut intents = Vec::with_capacity(3);
        if !task.is_done() {
            intents.push(Intent::MarkDone(task.id));
        }
        intents.push(Intent::Edit(EditForm::from_task(task)));
        intents.push(Intent::Delete(task.id));

        Self {
            id: task.id,
            title: task.title.clone(),
            status: task.status,
            status_label: task.status.label(),
            priority_label: task.priority.label(),
            due_date: task.due_date.map(format_date),
            comment: task.comment.clone().filter(|c| !c.trim().is_empty()),
            created_at: format_timestamp(task.created_at),
            done_at: task.done_at.map(format_timestamp),
            intents,
        }
    }

    pub fn can_mark_done(&self) -> bool {
        self.intents
            .iter()
            .any(|intent| matches!(intent, Intent::MarkDone(_)))
    }

    /// The edit intent's pre-populated form
    pub fn edit_form(&self) -> Option<&EditForm> {
        self.intents.iter().find_map(|intent| match intent {
            Intent::Edit(form) => Some(form),
            _ => None,
        })
    }
}

/// Long date form, e.g. `March 14, 2025`
pub fn format_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    format_date(timestamp.date_naive())
}
