//! # Domain Layer
//!
//! Retail records, chat messages and tool definitions.
//! This layer is independent of transports and storage.

pub mod error;
pub mod models;

pub use error::*;
pub use models::*;
