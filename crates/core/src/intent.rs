//! User intents raised from task cards
//!
//! Mark-done and delete change server state, so they only run after the
//! injected `Confirm` capability says yes.

use tracing::debug;

use crate::error::ClientError;
use crate::sync::Synchronizer;
use crate::task::{Task, TaskFields, TaskId};
use crate::view::BoardView;
use crate::Result;

pub const MARK_DONE_PROMPT: &str = "Are you sure you want to mark this task as DONE?";
pub const DELETE_PROMPT: &str = "Are you sure you want to delete this task?";

/// Asks the user a yes/no question
pub trait Confirm: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Answers yes without asking
pub struct AlwaysConfirm;

impl Confirm for AlwaysConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

/// Answers no without asking
pub struct NeverConfirm;

impl Confirm for NeverConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        false
    }
}

/// Edit surface contents, pre-populated from a task
#[derive(Debug, Clone, PartialEq)]
pub struct EditForm {
    pub id: TaskId,
    pub fields: TaskFields,
}

impl EditForm {
    pub fn from_task(task: &Task) -> Self {
        Self {
            id: task.id,
            fields: task.fields(),
        }
    }

    /// Submit the whole form as a replace
    pub async fn submit(&self, sync: &Synchronizer) -> Result<BoardView> {
        sync.update(self.id, &self.fields).await
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    MarkDone(TaskId),
    Edit(EditForm),
    Delete(TaskId),
}

/// Result of handling an intent
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatched {
    /// The mutation went through and the board was re-fetched
    Refreshed(BoardView),
    /// The caller should show the edit surface with this form
    OpenEditor(EditForm),
}

/// Route an intent to the synchronizer, asking for confirmation first where needed
///
/// A declined confirmation returns `UserCancelled` without any request.
pub async fn dispatch(
    intent: Intent,
    sync: &Synchronizer,
    confirm: &dyn Confirm,
) -> Result<Dispatched> {
    match intent {
        Intent::MarkDone(id) => {
            if !confirm.confirm(MARK_DONE_PROMPT) {
                debug!("Mark-done of task {} cancelled", id);
                return Err(ClientError::UserCancelled);
            }
            Ok(Dispatched::Refreshed(sync.mark_done(id).await?))
        }
        Intent::Delete(id) => {
            if !confirm.confirm(DELETE_PROMPT) {
                debug!("Delete of task {} cancelled", id);
                return Err(ClientError::UserCancelled);
            }
            Ok(Dispatched::Refreshed(sync.remove(id).await?))
        }
        Intent::Edit(form) => Ok(Dispatched::OpenEditor(form)),
    }
}
