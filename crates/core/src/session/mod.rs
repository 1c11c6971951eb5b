//! Session module
//!
//! Storage for the opaque auth token.

mod file_store;
mod memory_store;
mod store;

pub use file_store::FileSessionStore;
pub use memory_store::MemorySessionStore;
pub use store::SessionStore;
