pub mod chat_controller;
pub mod check_controller;
pub mod data_controller;
pub mod recipe_controller;
pub mod serve_controller;
pub mod tools_controller;

pub use chat_controller::{render_outcome, ChatController};
pub use check_controller::CheckController;
pub use data_controller::DataController;
pub use recipe_controller::RecipeController;
pub use serve_controller::ServeController;
pub use tools_controller::ToolsController;
