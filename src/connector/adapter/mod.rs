mod dataset_file;
mod hf_dataset;
mod in_memory_retail_repository;
mod openai_chat_client;
mod sample_data;
mod scripted_chat_client;

pub use dataset_file::*;
pub use hf_dataset::*;
pub use in_memory_retail_repository::*;
pub use openai_chat_client::*;
pub use sample_data::*;
pub use scripted_chat_client::*;
