pub mod application;
pub mod cli;
pub mod connector;
pub mod domain;

pub use cli::{Commands, RecipeCommand};

pub use application::{
    calculate, ChatClient, ChatSession, CompletionRequest, RetailRepository, SessionSettings,
    ToolCatalog, ToolExecutor, ToolInvocation, TurnOutcome,
};

pub use connector::{
    extract_retail_records, generate_sample_dataset, load_dataset_file, load_hf_dataset_file,
    save_dataset_file, Container, ContainerConfig, HfDatasetSource, InMemoryRetailRepository,
    OpenAiChatClient, Router, ScriptedChatClient,
};

pub use domain::{
    split_reasoning, ChatMessage, Conversation, DomainError, Order, OrderStatus, Product,
    RetailDataset, Segment, ToolCall, ToolDefinition, User,
};
