//! Task synchronization
//!
//! Keeps the rendered board in step with the server: every successful
//! mutation is followed by a full re-fetch.

mod synchronizer;

pub use synchronizer::Synchronizer;

use crate::view::BoardView;

/// Where the synchronizer sends its output
pub trait Screen: Send + Sync {
    /// Replace whatever is on screen with `board`
    fn render(&self, board: &BoardView);

    /// Leave the task surface for the login surface
    fn redirect_to_login(&self);
}
