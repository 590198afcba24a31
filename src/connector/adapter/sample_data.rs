use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::domain::{
    Address, Order, OrderItem, OrderStatus, PaymentMethod, PaymentRecord, Product, RetailDataset,
    User,
};

pub const DEFAULT_SEED: u64 = 42;

const ORDER_COUNT: usize = 12;
const FIRST_ORDER_NUMBER: u64 = 1_000_000;

const PRODUCTS: &[(&str, &str, f64, &str)] = &[
    ("PROD001", "Wireless Headphones", 79.99, "Premium noise-cancelling wireless headphones"),
    ("PROD002", "Smart Watch", 249.99, "Fitness tracking smartwatch with heart rate monitor"),
    ("PROD003", "Laptop Stand", 34.99, "Adjustable aluminum laptop stand"),
    ("PROD004", "USB-C Cable", 12.99, "6ft USB-C charging cable"),
    ("PROD005", "Wireless Mouse", 29.99, "Ergonomic wireless mouse"),
    ("PROD006", "Mechanical Keyboard", 89.99, "RGB mechanical gaming keyboard"),
    ("PROD007", "Monitor Stand", 45.99, "Dual monitor stand with cable management"),
    ("PROD008", "Webcam HD", 59.99, "1080p HD webcam with microphone"),
    ("PROD009", "Desk Lamp", 39.99, "LED desk lamp with adjustable brightness"),
    ("PROD010", "Phone Stand", 14.99, "Adjustable phone stand for desk"),
    ("PROD011", "External Hard Drive", 89.99, "1TB portable external hard drive"),
    ("PROD012", "Bluetooth Speaker", 49.99, "Portable waterproof Bluetooth speaker"),
];

const USERS: &[(&str, &str, &str, &str)] = &[
    ("john_smith", "John", "Smith", "10001"),
    ("jane_doe", "Jane", "Doe", "90210"),
    ("bob_johnson", "Bob", "Johnson", "60601"),
    ("alice_williams", "Alice", "Williams", "33101"),
    ("charlie_brown", "Charlie", "Brown", "02101"),
    ("diana_prince", "Diana", "Prince", "98101"),
    ("edward_miller", "Edward", "Miller", "75201"),
    ("fiona_davis", "Fiona", "Davis", "30301"),
    ("george_wilson", "George", "Wilson", "19101"),
    ("helen_taylor", "Helen", "Taylor", "94101"),
    ("ivan_martinez", "Ivan", "Martinez", "78701"),
    ("julia_anderson", "Julia", "Anderson", "80201"),
];

/// Builds the demo fixture: 12 products, 12 users and 12 orders linking them.
///
/// Order `i` belongs to user `i mod 12` and cycles through pending,
/// processed, delivered and cancelled. Item picks come from `seed`, so a
/// given seed always produces the same dataset.
pub fn generate_sample_dataset(seed: u64) -> RetailDataset {
    let mut rng = StdRng::seed_from_u64(seed);

    let products: Vec<Product> = PRODUCTS
        .iter()
        .map(|(id, name, price, description)| {
            Product::new(*id, *name)
                .with_price(*price)
                .with_description(*description)
        })
        .collect();

    let users: Vec<User> = USERS
        .iter()
        .enumerate()
        .map(|(idx, (user_id, first, last, zip))| {
            User::new(*user_id)
                .with_email(format!(
                    "{}.{}@example.com",
                    first.to_lowercase(),
                    last.to_lowercase()
                ))
                .with_name(*first, *last)
                .with_address(Address {
                    address1: format!("{} Main Street", 123 + idx),
                    address2: String::new(),
                    city: "New York".to_string(),
                    state: "NY".to_string(),
                    zip: zip.to_string(),
                    country: "USA".to_string(),
                })
                .with_payment_method(PaymentMethod {
                    payment_method_id: format!("credit_card_{}", 1000 + idx),
                    source: "credit_card".to_string(),
                })
        })
        .collect();

    let orders: Vec<Order> = (0..ORDER_COUNT)
        .map(|i| {
            let user = &users[i % users.len()];
            let status = OrderStatus::FIXTURE_CYCLE[i % OrderStatus::FIXTURE_CYCLE.len()];
            let item_count = rng.gen_range(1..=3);

            let mut order = Order::new(
                format!("#W{}", FIRST_ORDER_NUMBER + i as u64),
                user.user_id.clone(),
                status,
            )
            .with_address(user.address.clone());

            let picks: Vec<&Product> = products.choose_multiple(&mut rng, item_count).collect();
            for product in picks {
                order = order.with_item(OrderItem {
                    product_id: product.product_id.clone(),
                    name: product.name.clone(),
                    quantity: rng.gen_range(1..=2),
                    price: product.price,
                });
            }

            if let Some(method) = user.payment_methods.first() {
                order.payment_history.push(PaymentRecord {
                    transaction_type: "payment".to_string(),
                    amount: (order.total() * 100.0).round() / 100.0,
                    payment_method_id: method.payment_method_id.clone(),
                });
            }

            order
        })
        .collect();

    debug!(
        "Generated sample dataset: {} users, {} orders, {} products",
        users.len(),
        orders.len(),
        products.len()
    );

    RetailDataset {
        users,
        orders,
        products,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn same_seed_same_dataset() {
        assert_eq!(generate_sample_dataset(7), generate_sample_dataset(7));
    }

    #[test]
    fn orders_reference_existing_records() {
        let data = generate_sample_dataset(DEFAULT_SEED);
        let stats = data.stats();
        assert_eq!((stats.users, stats.orders, stats.products), (12, 12, 12));

        for order in &data.orders {
            assert!(data.users.iter().any(|u| u.user_id == order.user_id));
            assert!((1..=3).contains(&order.items.len()));
            let distinct: HashSet<_> = order.items.iter().map(|i| &i.product_id).collect();
            assert_eq!(distinct.len(), order.items.len());
            for item in &order.items {
                assert!(data.products.iter().any(|p| p.product_id == item.product_id));
            }
        }
    }

    #[test]
    fn statuses_cycle() {
        let data = generate_sample_dataset(DEFAULT_SEED);
        assert_eq!(data.orders[0].order_id, "#W1000000");
        assert_eq!(data.orders[0].status, OrderStatus::Pending);
        assert_eq!(data.orders[2].status, OrderStatus::Delivered);
        assert_eq!(data.orders[7].status, OrderStatus::Cancelled);
    }
}
