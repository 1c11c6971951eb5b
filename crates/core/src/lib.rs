//! Core library for taskdeck
//!
//! This crate contains the task client, including:
//! - Session token storage
//! - The HTTP gateway to the task API
//! - Synchronization of the task board with the server
//! - Rendering of the board and the intents it exposes

pub mod auth;
pub mod config;
pub mod error;
pub mod gateway;
pub mod intent;
pub mod session;
pub mod sync;
pub mod task;
pub mod view;

#[cfg(test)]
mod testing;

pub use error::{ClientError, FieldMessages};
pub type Result<T> = std::result::Result<T, ClientError>;
