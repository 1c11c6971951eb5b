//! Synchronizer implementation

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::Screen;
use crate::error::ClientError;
use crate::gateway::TaskApi;
use crate::session::SessionStore;
use crate::task::{Task, TaskFields, TaskFilter, TaskId, TaskStatus};
use crate::view::{self, BoardView};
use crate::Result;

/// Runs task operations against the API and re-renders after each one
///
/// Operations that need a session fail with `NotAuthenticated` when no token
/// is stored. A 401 from the server clears the stored token. Both cases send
/// the screen to the login surface.
pub struct Synchronizer {
    api: Arc<dyn TaskApi>,
    session: Arc<dyn SessionStore>,
    screen: Arc<dyn Screen>,
    filter: TaskFilter,
}

impl Synchronizer {
    pub fn new(
        api: Arc<dyn TaskApi>,
        session: Arc<dyn SessionStore>,
        screen: Arc<dyn Screen>,
    ) -> Self {
        Self {
            api,
            session,
            screen,
            filter: TaskFilter::default(),
        }
    }

    /// Restrict refreshes to matching tasks
    pub fn with_filter(mut self, filter: TaskFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Return the stored token, or redirect to login when there is none
    pub async fn ensure_authenticated(&self) -> Result<String> {
        match self.session.get().await? {
            Some(token) => Ok(token),
            None => {
                info!("No session token; redirecting to login");
                self.screen.redirect_to_login();
                Err(ClientError::NotAuthenticated)
            }
        }
    }

    /// Clear the session and redirect if the server rejected the token
    async fn checked<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(ClientError::Unauthorized) = &result {
            warn!("Session token rejected; clearing local session");
            if let Err(e) = self.session.clear().await {
                warn!("Failed to clear session: {}", e);
            }
            self.screen.redirect_to_login();
        }
        result
    }

    /// Fetch the task list and render it from scratch
    pub async fn refresh(&self) -> Result<BoardView> {
        let token = self.ensure_authenticated().await?;
        self.screen.render(&BoardView::loading());
        if !self.filter.is_empty() {
            debug!("Fetching tasks matching {}", self.filter.query_string());
        }

        let tasks = match self
            .checked(self.api.list_tasks(&token, &self.filter).await)
            .await
        {
            Ok(tasks) => tasks,
            Err(e) => {
                if !e.redirects_to_login() {
                    warn!("Failed to fetch tasks: {}", e);
                    self.screen.render(&BoardView::failed(&e));
                }
                return Err(e);
            }
        };

        debug!("Fetched {} tasks", tasks.len());
        let board = view::render(&tasks);
        self.screen.render(&board);
        Ok(board)
    }

    /// Fetch one task, e.g. to pre-populate an edit form
    pub async fn load(&self, id: TaskId) -> Result<Task> {
        let token = self.ensure_authenticated().await?;
        self.checked(self.api.get_task(&token, id).await).await
    }

    pub async fn create(&self, fields: &TaskFields) -> Result<BoardView> {
        let token = self.ensure_authenticated().await?;
        let task = self
            .checked(self.api.create_task(&token, fields).await)
            .await?;
        info!("Created task {}", task.id);
        self.refresh().await
    }

    /// Read the task, then replace it with the same fields and `status = done`
    pub async fn mark_done(&self, id: TaskId) -> Result<BoardView> {
        let token = self.ensure_authenticated().await?;
        let current = self.checked(self.api.get_task(&token, id).await).await?;

        let mut fields = current.fields();
        fields.status = TaskStatus::Done;

        self.checked(self.api.replace_task(&token, id, &fields).await)
            .await?;
        info!("Marked task {} as done", id);
        self.refresh().await
    }

    /// Replace a task with a complete, edited set of fields
    pub async fn update(&self, id: TaskId, fields: &TaskFields) -> Result<BoardView> {
        let token = self.ensure_authenticated().await?;
        self.checked(self.api.replace_task(&token, id, fields).await)
            .await?;
        info!("Updated task {}", id);
        self.refresh().await
    }

    pub async fn remove(&self, id: TaskId) -> Result<BoardView> {
        let token = self.ensure_authenticated().await?;
        self.checked(self.api.delete_task(&token, id).await).await?;
        info!("Deleted task {}", id);
        self.refresh().await
    }

    /// Log out remotely if possible, then always clear the local session
    pub async fn logout(&self) -> Result<()> {
        match self.session.get().await {
            Ok(Some(token)) => {
                if let Err(e) = self.api.logout(&token).await {
                    warn!("Remote logout failed: {}", e);
                }
            }
            Ok(None) => debug!("Logout without a stored token"),
            Err(e) => warn!("Failed to read session: {}", e),
        }

        let cleared = self.session.clear().await;
        info!("Local session cleared");
        self.screen.redirect_to_login();
        cleared
    }
}
