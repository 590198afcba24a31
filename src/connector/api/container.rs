use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::application::{ChatClient, ChatSession, RetailRepository, SessionSettings, ToolCatalog};
use crate::connector::adapter::{
    generate_sample_dataset, load_dataset_file, load_hf_dataset, HfDatasetSource,
    InMemoryRetailRepository, OpenAiChatClient,
};
use crate::domain::RetailDataset;

pub struct ContainerConfig {
    /// Inference endpoint, including the `/v1` prefix.
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub api_key: Option<String>,
    /// Flat-file dataset; the generated fixture is used when absent.
    pub data_file: Option<PathBuf>,
    /// Hub dataset of agent trajectories to mine for tools and records.
    pub hf_dataset: Option<HfDatasetSource>,
    pub seed: u64,
    pub settings: SessionSettings,
}

/// Wires the chat client, tool catalog and mock dataset together and hands
/// out sessions.
///
/// Cheap to clone: everything shared sits behind an `Arc`. The dataset is a
/// template; every session gets its own repository built from it.
#[derive(Clone)]
pub struct Container {
    client: Arc<dyn ChatClient>,
    catalog: Arc<ToolCatalog>,
    dataset: Arc<RetailDataset>,
    settings: SessionSettings,
    data_file: Option<PathBuf>,
}

impl Container {
    pub async fn new(config: ContainerConfig) -> Result<Self> {
        let client = Arc::new(OpenAiChatClient::from_env_or(
            config.base_url.clone(),
            config.model.clone(),
            config.api_key.clone(),
        ));
        info!("Chat endpoint: {} (model {})", client.base_url(), client.model());

        Self::with_client(config, client).await
    }

    /// Same wiring with a caller-supplied chat client.
    pub async fn with_client(config: ContainerConfig, client: Arc<dyn ChatClient>) -> Result<Self> {
        let fixture = generate_sample_dataset(config.seed);
        let mut catalog = ToolCatalog::retail();

        let mut dataset = match &config.data_file {
            Some(path) => Some(load_dataset_file(path).await?),
            None => None,
        };

        // A failed download leaves the demo on its own data.
        if let Some(source) = &config.hf_dataset {
            match load_hf_dataset(source).await {
                Ok(extract) => {
                    catalog = catalog.merge(extract.tools);
                    dataset
                        .get_or_insert_with(RetailDataset::default)
                        .absorb(extract.dataset);
                }
                Err(e) => warn!("Skipping dataset {}: {}", source.repo_id, e),
            }
        }

        let dataset = match dataset {
            Some(mut dataset) => {
                dataset.top_up_from(&fixture);
                dataset
            }
            None => {
                debug!("Using generated sample dataset (seed {})", config.seed);
                fixture
            }
        };

        let stats = dataset.stats();
        info!(
            "Mock database: {} users, {} orders, {} products",
            stats.users, stats.orders, stats.products
        );

        Ok(Self {
            client,
            catalog: Arc::new(catalog),
            dataset: Arc::new(dataset),
            settings: config.settings,
            data_file: config.data_file,
        })
    }

    pub fn client(&self) -> Arc<dyn ChatClient> {
        self.client.clone()
    }

    pub fn catalog(&self) -> Arc<ToolCatalog> {
        self.catalog.clone()
    }

    pub fn dataset(&self) -> &RetailDataset {
        &self.dataset
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn data_file(&self) -> Option<&PathBuf> {
        self.data_file.as_ref()
    }

    /// A fresh repository holding its own copy of the dataset.
    pub fn new_repository(&self) -> Arc<dyn RetailRepository> {
        Arc::new(InMemoryRetailRepository::from_dataset(
            self.dataset.as_ref().clone(),
        ))
    }

    pub fn new_session(&self) -> ChatSession {
        ChatSession::new(
            self.client.clone(),
            self.new_repository(),
            self.catalog.clone(),
            self.settings.clone(),
        )
    }
}
