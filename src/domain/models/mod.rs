mod conversation;
mod dataset;
mod message;
mod order;
mod product;
mod reasoning;
mod tool;
mod user;

pub use conversation::*;
pub use dataset::*;
pub use message::*;
pub use order::*;
pub use product::*;
pub use reasoning::*;
pub use tool::*;
pub use user::*;
