use serde::{Deserialize, Serialize};

use super::{Order, Product, User};

/// Below this many records a collection is topped up from the sample fixture.
pub const MIN_RECORDS: usize = 10;

/// A full snapshot of the mock retail database, as stored in a flat file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetailDataset {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub orders: Vec<Order>,
    #[serde(default)]
    pub products: Vec<Product>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetStats {
    pub users: usize,
    pub orders: usize,
    pub products: usize,
}

impl RetailDataset {
    pub fn stats(&self) -> DatasetStats {
        DatasetStats {
            users: self.users.len(),
            orders: self.orders.len(),
            products: self.products.len(),
        }
    }

    /// Adds every record whose id is not already present. Existing records
    /// are kept as they are.
    pub fn absorb(&mut self, other: RetailDataset) {
        for user in other.users {
            if !self.users.iter().any(|u| u.user_id == user.user_id) {
                self.users.push(user);
            }
        }
        for order in other.orders {
            if !self.orders.iter().any(|o| o.order_id == order.order_id) {
                self.orders.push(order);
            }
        }
        for product in other.products {
            if !self.products.iter().any(|p| p.product_id == product.product_id) {
                self.products.push(product);
            }
        }
    }

    /// Fills sparse collections from `fixture` until each has at least
    /// [`MIN_RECORDS`] entries.
    ///
    /// Fixture orders are re-linked to the first user when their own user is
    /// missing, keep only items whose product exists, and are skipped when no
    /// item survives.
    pub fn top_up_from(&mut self, fixture: &RetailDataset) {
        if self.users.len() < MIN_RECORDS {
            for user in &fixture.users {
                if !self.users.iter().any(|u| u.user_id == user.user_id) {
                    self.users.push(user.clone());
                }
            }
        }

        if self.products.len() < MIN_RECORDS {
            for product in &fixture.products {
                if !self.products.iter().any(|p| p.product_id == product.product_id) {
                    self.products.push(product.clone());
                }
            }
        }

        if self.orders.len() < MIN_RECORDS {
            for order in &fixture.orders {
                if self.orders.iter().any(|o| o.order_id == order.order_id) {
                    continue;
                }

                let mut order = order.clone();
                if !self.users.iter().any(|u| u.user_id == order.user_id) {
                    let Some(first) = self.users.first() else {
                        continue;
                    };
                    order.user_id = first.user_id.clone();
                    order.address = first.address.clone();
                }

                order
                    .items
                    .retain(|item| self.products.iter().any(|p| p.product_id == item.product_id));
                if !order.items.is_empty() {
                    self.orders.push(order);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OrderItem, OrderStatus};

    fn fixture() -> RetailDataset {
        let users = (0..12).map(|i| User::new(format!("user_{i}"))).collect();
        let products = (0..12)
            .map(|i| Product::new(format!("PROD{i:03}"), format!("Product {i}")))
            .collect();
        let orders = (0..12)
            .map(|i| {
                Order::new(format!("#W{i}"), format!("user_{i}"), OrderStatus::Pending).with_item(
                    OrderItem {
                        product_id: format!("PROD{i:03}"),
                        name: format!("Product {i}"),
                        quantity: 1,
                        price: Some(1.0),
                    },
                )
            })
            .collect();
        RetailDataset {
            users,
            orders,
            products,
        }
    }

    #[test]
    fn empty_dataset_is_filled_completely() {
        let mut data = RetailDataset::default();
        data.top_up_from(&fixture());
        assert_eq!(
            data.stats(),
            DatasetStats {
                users: 12,
                orders: 12,
                products: 12
            }
        );
    }

    #[test]
    fn existing_records_win_over_fixture() {
        let mut data = RetailDataset {
            users: vec![User::new("user_0").with_email("kept@example.com")],
            ..RetailDataset::default()
        };
        data.top_up_from(&fixture());
        let kept = data.users.iter().find(|u| u.user_id == "user_0").unwrap();
        assert_eq!(kept.email, "kept@example.com");
        assert_eq!(data.users.len(), 12);
    }

    #[test]
    fn absorb_adds_only_new_ids() {
        let mut data = RetailDataset {
            users: vec![User::new("user_0").with_email("kept@example.com")],
            ..RetailDataset::default()
        };
        data.absorb(RetailDataset {
            users: vec![
                User::new("user_0").with_email("other@example.com"),
                User::new("user_1"),
            ],
            products: vec![Product::new("PROD001", "Lamp")],
            ..RetailDataset::default()
        });
        assert_eq!(data.users.len(), 2);
        assert_eq!(data.users[0].email, "kept@example.com");
        assert_eq!(data.products.len(), 1);
    }

    #[test]
    fn large_collections_are_left_alone() {
        let mut data = fixture();
        data.orders.truncate(11);
        data.top_up_from(&RetailDataset {
            orders: vec![Order::new("#EXTRA", "user_0", OrderStatus::Pending)],
            ..RetailDataset::default()
        });
        assert_eq!(data.orders.len(), 11);
    }
}
