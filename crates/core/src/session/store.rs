//! Session store trait
//!
//! Defines the interface for the persisted auth token slot.

use async_trait::async_trait;

use crate::Result;

/// A single persisted slot holding an opaque session token
///
/// The token is never validated locally; only server responses decide
/// whether it is still good.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Read the stored token; `None` means unauthenticated
    async fn get(&self) -> Result<Option<String>>;

    /// Store a token, replacing any previous one
    async fn set(&self, token: &str) -> Result<()>;

    /// Remove the stored token
    async fn clear(&self) -> Result<()>;
}
