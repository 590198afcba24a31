//! # Application Layer
//!
//! Interfaces to the outside world and the use cases built on them:
//! tool catalog, tool execution and the conversation turn.

pub mod interfaces;
pub mod use_cases;

pub use interfaces::*;
pub use use_cases::*;
