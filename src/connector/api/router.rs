use anyhow::Result;

use crate::Commands;

use super::container::Container;
use super::controller::{
    ChatController, CheckController, DataController, RecipeController, ServeController,
    ToolsController,
};

pub struct Router<'a> {
    serve_controller: ServeController<'a>,
    chat_controller: ChatController<'a>,
    check_controller: CheckController<'a>,
    tools_controller: ToolsController<'a>,
    data_controller: DataController<'a>,
    recipe_controller: RecipeController,
}

impl<'a> Router<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self {
            serve_controller: ServeController::new(container),
            chat_controller: ChatController::new(container),
            check_controller: CheckController::new(container),
            tools_controller: ToolsController::new(container),
            data_controller: DataController::new(container),
            recipe_controller: RecipeController::new(),
        }
    }

    pub async fn route(&self, command: Commands) -> Result<String> {
        match command {
            Commands::Serve { host, port } => self.serve_controller.serve(host, port).await,
            Commands::Chat => self.chat_controller.chat().await,
            Commands::Check => self.check_controller.check().await,
            Commands::Tools { json } => self.tools_controller.list(json).await,
            Commands::Data { limit, export } => self.data_controller.show(limit, export).await,
            Commands::Recipe { recipe } => self.recipe_controller.render(recipe).await,
        }
    }
}
