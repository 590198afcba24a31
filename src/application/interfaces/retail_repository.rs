use async_trait::async_trait;

use crate::domain::{DatasetStats, DomainError, Order, Product, RetailDataset, User};

/// Access to the mock retail database.
///
/// Conversation logic only talks to this trait, so the in-memory store can be
/// swapped for a real backend without touching dialogue management.
#[async_trait]
pub trait RetailRepository: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    async fn find_user_by_name_zip(
        &self,
        first_name: &str,
        last_name: &str,
        zip: &str,
    ) -> Result<Option<User>, DomainError>;

    async fn get_user(&self, user_id: &str) -> Result<Option<User>, DomainError>;

    async fn get_order(&self, order_id: &str) -> Result<Option<Order>, DomainError>;

    async fn get_product(&self, product_id: &str) -> Result<Option<Product>, DomainError>;

    async fn list_users(&self) -> Result<Vec<User>, DomainError>;

    async fn list_orders(&self) -> Result<Vec<Order>, DomainError>;

    /// Products sorted by id.
    async fn list_products(&self) -> Result<Vec<Product>, DomainError>;

    /// Inserts or replaces by `user_id`.
    async fn save_user(&self, user: &User) -> Result<(), DomainError>;

    /// Inserts or replaces by `order_id`.
    async fn save_order(&self, order: &Order) -> Result<(), DomainError>;

    /// Inserts or replaces by `product_id`.
    async fn save_product(&self, product: &Product) -> Result<(), DomainError>;

    async fn stats(&self) -> Result<DatasetStats, DomainError>;

    async fn snapshot(&self) -> Result<RetailDataset, DomainError>;
}
