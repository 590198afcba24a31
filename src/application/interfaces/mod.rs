mod chat_client;
mod retail_repository;

pub use chat_client::*;
pub use retail_repository::*;
