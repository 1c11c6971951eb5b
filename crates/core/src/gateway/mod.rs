//! API gateway
//!
//! Typed access to the remote auth and task endpoints.

mod http;

pub use http::HttpGateway;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::task::{Task, TaskFields, TaskFilter, TaskId};
use crate::Result;

/// Successful login or registration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    #[serde(default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
}

/// Successful registration
///
/// Some servers answer with the created user and no token; the caller then
/// has to log in to start a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// One operation per remote capability
///
/// Every call is a single request. Failures are returned as-is and never
/// retried.
#[async_trait]
pub trait TaskApi: Send + Sync {
    /// `POST /register/`; any 2xx counts as success
    async fn register(&self, username: &str, email: &str, password: &str) -> Result<Registration>;

    /// `POST /login/`; `identifier` is a username or an email
    async fn login(&self, identifier: &str, password: &str) -> Result<AuthResponse>;

    /// `POST /logout/`
    async fn logout(&self, token: &str) -> Result<()>;

    /// `GET /tasks/`
    async fn list_tasks(&self, token: &str, filter: &TaskFilter) -> Result<Vec<Task>>;

    /// `GET /tasks/{id}/`
    async fn get_task(&self, token: &str, id: TaskId) -> Result<Task>;

    /// `POST /tasks/`
    async fn create_task(&self, token: &str, fields: &TaskFields) -> Result<Task>;

    /// `PUT /tasks/{id}/`, replacing every writable field
    async fn replace_task(&self, token: &str, id: TaskId, fields: &TaskFields) -> Result<Task>;

    /// `DELETE /tasks/{id}/`; only HTTP 204 counts as success
    async fn delete_task(&self, token: &str, id: TaskId) -> Result<()>;
}
