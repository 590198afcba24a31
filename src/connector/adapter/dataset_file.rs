use std::path::Path;

use tracing::info;

use crate::domain::{DomainError, RetailDataset};

/// Reads a `{"users": [...], "orders": [...], "products": [...]}` file.
/// Missing sections load as empty.
pub async fn load_dataset_file(path: &Path) -> Result<RetailDataset, DomainError> {
    let raw = tokio::fs::read_to_string(path).await?;
    let dataset: RetailDataset = serde_json::from_str(&raw).map_err(|e| {
        DomainError::invalid_input(format!("{} is not a valid dataset file: {}", path.display(), e))
    })?;

    let stats = dataset.stats();
    info!(
        "Loaded {} users, {} orders, {} products from {}",
        stats.users,
        stats.orders,
        stats.products,
        path.display()
    );
    Ok(dataset)
}

pub async fn save_dataset_file(path: &Path, dataset: &RetailDataset) -> Result<(), DomainError> {
    let json = serde_json::to_string_pretty(dataset)?;
    tokio::fs::write(path, json).await?;
    Ok(())
}
