//! Task module
//!
//! Task resource types shared by the gateway, synchronizer and view.

mod model;

pub use model::*;
