mod calculator;
mod chat_session;
mod policy;
mod recipes;
mod tool_catalog;
mod tool_executor;

pub use calculator::*;
pub use chat_session::*;
pub use policy::*;
pub use recipes::*;
pub use tool_catalog::*;
pub use tool_executor::*;
