pub mod container;
pub mod controller;
pub mod router;
pub mod web;

pub use container::{Container, ContainerConfig};
pub use router::Router;
