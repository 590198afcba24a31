use anyhow::Result;

use super::super::web;
use super::super::Container;

pub struct ServeController<'a> {
    container: &'a Container,
}

impl<'a> ServeController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    /// Runs the browser front-end until the process is stopped.
    pub async fn serve(&self, host: String, port: u16) -> Result<String> {
        let addr = format!("{}:{}", host, port);
        web::serve(self.container.clone(), &addr).await?;
        Ok("Server stopped.".to_string())
    }
}
