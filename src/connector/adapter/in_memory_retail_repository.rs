use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::application::RetailRepository;
use crate::domain::{DatasetStats, DomainError, Order, Product, RetailDataset, User};

/// Mock retail database kept entirely in memory.
///
/// Each web session gets its own instance, so mutations made through tool
/// calls (cancellations, returns) stay local to that session.
pub struct InMemoryRetailRepository {
    users: Arc<Mutex<BTreeMap<String, User>>>,
    orders: Arc<Mutex<BTreeMap<String, Order>>>,
    products: Arc<Mutex<BTreeMap<String, Product>>>,
}

impl InMemoryRetailRepository {
    pub fn new() -> Self {
        Self::from_dataset(RetailDataset::default())
    }

    pub fn from_dataset(dataset: RetailDataset) -> Self {
        let users = dataset
            .users
            .into_iter()
            .map(|u| (u.user_id.clone(), u))
            .collect();
        let orders = dataset
            .orders
            .into_iter()
            .map(|o| (o.order_id.clone(), o))
            .collect();
        let products = dataset
            .products
            .into_iter()
            .map(|p| (p.product_id.clone(), p))
            .collect();

        Self {
            users: Arc::new(Mutex::new(users)),
            orders: Arc::new(Mutex::new(orders)),
            products: Arc::new(Mutex::new(products)),
        }
    }
}

impl Default for InMemoryRetailRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RetailRepository for InMemoryRetailRepository {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let users = self.users.lock().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_name_zip(
        &self,
        first_name: &str,
        last_name: &str,
        zip: &str,
    ) -> Result<Option<User>, DomainError> {
        let users = self.users.lock().await;
        Ok(users
            .values()
            .find(|u| u.matches_name_zip(first_name, last_name, zip))
            .cloned())
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<User>, DomainError> {
        Ok(self.users.lock().await.get(user_id).cloned())
    }

    async fn get_order(&self, order_id: &str) -> Result<Option<Order>, DomainError> {
        Ok(self.orders.lock().await.get(order_id).cloned())
    }

    async fn get_product(&self, product_id: &str) -> Result<Option<Product>, DomainError> {
        Ok(self.products.lock().await.get(product_id).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, DomainError> {
        Ok(self.users.lock().await.values().cloned().collect())
    }

    async fn list_orders(&self) -> Result<Vec<Order>, DomainError> {
        Ok(self.orders.lock().await.values().cloned().collect())
    }

    async fn list_products(&self) -> Result<Vec<Product>, DomainError> {
        Ok(self.products.lock().await.values().cloned().collect())
    }

    async fn save_user(&self, user: &User) -> Result<(), DomainError> {
        if user.user_id.trim().is_empty() {
            return Err(DomainError::invalid_input("User id must not be empty"));
        }
        self.users
            .lock()
            .await
            .insert(user.user_id.clone(), user.clone());
        debug!("Saved user {}", user.user_id);
        Ok(())
    }

    async fn save_order(&self, order: &Order) -> Result<(), DomainError> {
        if order.order_id.trim().is_empty() {
            return Err(DomainError::invalid_input("Order id must not be empty"));
        }
        self.orders
            .lock()
            .await
            .insert(order.order_id.clone(), order.clone());
        debug!("Saved order {} ({})", order.order_id, order.status);
        Ok(())
    }

    async fn save_product(&self, product: &Product) -> Result<(), DomainError> {
        if product.product_id.trim().is_empty() {
            return Err(DomainError::invalid_input("Product id must not be empty"));
        }
        self.products
            .lock()
            .await
            .insert(product.product_id.clone(), product.clone());
        debug!("Saved product {}", product.product_id);
        Ok(())
    }

    async fn stats(&self) -> Result<DatasetStats, DomainError> {
        Ok(DatasetStats {
            users: self.users.lock().await.len(),
            orders: self.orders.lock().await.len(),
            products: self.products.lock().await.len(),
        })
    }

    async fn snapshot(&self) -> Result<RetailDataset, DomainError> {
        Ok(RetailDataset {
            users: self.list_users().await?,
            orders: self.list_orders().await?,
            products: self.list_products().await?,
        })
    }
}
