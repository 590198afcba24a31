use anyhow::Result;

use super::super::Container;

pub struct CheckController<'a> {
    container: &'a Container,
}

impl<'a> CheckController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn check(&self) -> Result<String> {
        let client = self.container.client();
        let status = client.test_connection().await?;

        Ok(format!(
            "Endpoint Check\n==============\nEndpoint: {}\nModel:    {}\nStatus:   {}",
            client.base_url(),
            client.model(),
            status
        ))
    }
}
