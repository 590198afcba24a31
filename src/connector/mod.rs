//! # Connector Layer
//!
//! Implementations of the application interfaces and the outer surfaces:
//! - OpenAI-compatible chat client (reqwest) and a scripted stand-in
//! - In-memory retail repository, sample fixture and flat-file loader
//! - Container, CLI router and controllers, axum web front-end

pub mod adapter;
pub mod api;

pub use adapter::*;
pub use api::*;
