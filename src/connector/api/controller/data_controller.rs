use std::path::PathBuf;

use anyhow::Result;

use crate::connector::adapter::save_dataset_file;
use crate::domain::RetailDataset;

use super::super::Container;

pub struct DataController<'a> {
    container: &'a Container,
}

impl<'a> DataController<'a> {
    pub fn new(container: &'a Container) -> Self {
        Self { container }
    }

    pub async fn show(&self, limit: usize, export: Option<PathBuf>) -> Result<String> {
        let dataset = self.container.dataset();
        let mut output = self.format_dataset(dataset, limit);

        if let Some(path) = export {
            save_dataset_file(&path, dataset).await?;
            output.push_str(&format!("\n\nExported to {}", path.display()));
        }

        Ok(output)
    }

    fn format_dataset(&self, dataset: &RetailDataset, limit: usize) -> String {
        let stats = dataset.stats();
        let source = self
            .container
            .data_file()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "generated sample data".to_string());

        let mut output = format!(
            "Mock Database\n=============\nUsers:    {}\nOrders:   {}\nProducts: {}\nSource:   {}",
            stats.users, stats.orders, stats.products, source
        );

        output.push_str("\n\nUsers:");
        for user in dataset.users.iter().take(limit) {
            output.push_str(&format!(
                "\n  {} {} <{}> zip {}",
                user.user_id,
                user.full_name(),
                user.email,
                user.address.zip
            ));
        }

        output.push_str("\n\nOrders:");
        for order in dataset.orders.iter().take(limit) {
            output.push_str(&format!(
                "\n  {} [{}] user {} - {} item(s), ${:.2}",
                order.order_id,
                order.status,
                order.user_id,
                order.items.len(),
                order.total()
            ));
        }

        output.push_str("\n\nProducts:");
        for product in dataset.products.iter().take(limit) {
            let price = product
                .price
                .map(|p| format!("${:.2}", p))
                .unwrap_or_else(|| "-".to_string());
            output.push_str(&format!("\n  {} {} {}", product.product_id, product.name, price));
        }

        output
    }
}
