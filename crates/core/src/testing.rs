//! In-memory fakes shared by the unit tests

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use crate::error::ClientError;
use crate::gateway::{AuthResponse, Registration, TaskApi};
use crate::sync::Screen;
use crate::task::{Task, TaskFields, TaskFilter, TaskId, TaskPriority, TaskStatus};
use crate::view::BoardView;
use crate::Result;

pub fn sample_task(id: TaskId, status: TaskStatus) -> Task {
    Task {
        id,
        user: Some("sara".to_string()),
        title: format!("Task {}", id),
        status,
        priority: TaskPriority::Then,
        due_date: None,
        comment: None,
        created_at: Utc.with_ymd_and_hms(2025, 1, 10, 8, 0, 0).unwrap(),
        done_at: (status == TaskStatus::Done)
            .then(|| Utc.with_ymd_and_hms(2025, 1, 11, 8, 0, 0).unwrap()),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Register(String),
    Login(String),
    Logout(String),
    List(String),
    Get(TaskId),
    Create(TaskFields),
    Replace(TaskId, TaskFields),
    Delete(TaskId),
}

#[derive(Debug, Clone)]
pub enum Failure {
    Unauthorized,
    Network,
    Status(u16, &'static str),
}

impl Failure {
    fn to_error(&self) -> ClientError {
        match self {
            Self::Unauthorized => ClientError::Unauthorized,
            Self::Network => ClientError::Network("connection refused".to_string()),
            Self::Status(status, body) => ClientError::request_failed(*status, body),
        }
    }
}

/// Task API backed by a vector, recording every call
#[derive(Default)]
pub struct FakeApi {
    tasks: Mutex<Vec<Task>>,
    calls: Mutex<Vec<Call>>,
    failures: Mutex<HashMap<&'static str, Failure>>,
    tokenless_register: Mutex<bool>,
}

impl FakeApi {
    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            tasks: Mutex::new(tasks),
            ..Self::default()
        }
    }

    /// Make every later call to `op` fail
    pub fn fail(&self, op: &'static str, failure: Failure) {
        self.failures.lock().unwrap().insert(op, failure);
    }

    /// Answer registrations with the created user only, like a plain create view
    pub fn register_without_token(&self) {
        *self.tokenless_register.lock().unwrap() = true;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, op: &'static str, call: Call) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        match self.failures.lock().unwrap().get(op) {
            Some(failure) => Err(failure.to_error()),
            None => Ok(()),
        }
    }

    fn not_found() -> ClientError {
        ClientError::request_failed(404, r#"{"detail": "Not found."}"#)
    }
}

#[async_trait]
impl TaskApi for FakeApi {
    async fn register(&self, username: &str, email: &str, _password: &str) -> Result<Registration> {
        self.record("register", Call::Register(username.to_string()))?;
        let token = if *self.tokenless_register.lock().unwrap() {
            None
        } else {
            Some(format!("token-{}", username))
        };
        Ok(Registration {
            token,
            id: Some(1),
            username: Some(username.to_string()),
            email: Some(email.to_string()),
        })
    }

    async fn login(&self, identifier: &str, _password: &str) -> Result<AuthResponse> {
        self.record("login", Call::Login(identifier.to_string()))?;
        Ok(AuthResponse {
            token: format!("token-{}", identifier),
            user_id: Some(1),
            username: Some(identifier.to_string()),
        })
    }

    async fn logout(&self, token: &str) -> Result<()> {
        self.record("logout", Call::Logout(token.to_string()))
    }

    async fn list_tasks(&self, token: &str, filter: &TaskFilter) -> Result<Vec<Task>> {
        self.record("list", Call::List(token.to_string()))?;
        let tasks = self.tasks.lock().unwrap();
        Ok(tasks
            .iter()
            .filter(|t| filter.status.map_or(true, |s| t.status == s))
            .filter(|t| filter.priority.map_or(true, |p| t.priority == p))
            .filter(|t| filter.due_date.map_or(true, |d| t.due_date == Some(d)))
            .cloned()
            .collect())
    }

    async fn get_task(&self, _token: &str, id: TaskId) -> Result<Task> {
        self.record("get", Call::Get(id))?;
        let tasks = self.tasks.lock().unwrap();
        tasks
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(Self::not_found)
    }

    async fn create_task(&self, _token: &str, fields: &TaskFields) -> Result<Task> {
        self.record("create", Call::Create(fields.clone()))?;
        let mut tasks = self.tasks.lock().unwrap();
        let id = tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        let mut task = sample_task(id, fields.status);
        task.title = fields.title.clone();
        task.priority = fields.priority;
        task.due_date = fields.due_date;
        task.comment = fields.comment.clone();
        tasks.push(task.clone());
        Ok(task)
    }

    async fn replace_task(&self, _token: &str, id: TaskId, fields: &TaskFields) -> Result<Task> {
        self.record("replace", Call::Replace(id, fields.clone()))?;
        let mut tasks = self.tasks.lock().unwrap();
        let task = tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(Self::not_found)?;
        task.title = fields.title.clone();
        task.priority = fields.priority;
        task.due_date = fields.due_date;
        task.comment = fields.comment.clone();
        if fields.status == TaskStatus::Done && task.done_at.is_none() {
            task.done_at = Some(Utc.with_ymd_and_hms(2025, 2, 1, 12, 0, 0).unwrap());
        } else if fields.status != TaskStatus::Done {
            task.done_at = None;
        }
        task.status = fields.status;
        Ok(task.clone())
    }

    async fn delete_task(&self, _token: &str, id: TaskId) -> Result<()> {
        self.record("delete", Call::Delete(id))?;
        let mut tasks = self.tasks.lock().unwrap();
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        if tasks.len() == before {
            Err(Self::not_found())
        } else {
            Ok(())
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Board(BoardView),
    Redirect,
}

/// Screen that remembers everything it was asked to show
#[derive(Default)]
pub struct RecordingScreen {
    frames: Mutex<Vec<Frame>>,
}

impl RecordingScreen {
    pub fn frames(&self) -> Vec<Frame> {
        self.frames.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<Frame> {
        self.frames.lock().unwrap().last().cloned()
    }
}

impl Screen for RecordingScreen {
    fn render(&self, board: &BoardView) {
        self.frames.lock().unwrap().push(Frame::Board(board.clone()));
    }

    fn redirect_to_login(&self) {
        self.frames.lock().unwrap().push(Frame::Redirect);
    }
}
