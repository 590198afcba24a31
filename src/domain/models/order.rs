use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::Address;
use crate::domain::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processed,
    Delivered,
    Cancelled,
    #[serde(rename = "return requested")]
    ReturnRequested,
}

impl OrderStatus {
    /// The four statuses the sample fixture cycles through.
    pub const FIXTURE_CYCLE: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Processed,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processed => "processed",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::ReturnRequested => "return requested",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "processed" => Ok(OrderStatus::Processed),
            "delivered" => Ok(OrderStatus::Delivered),
            "cancelled" | "canceled" => Ok(OrderStatus::Cancelled),
            "return requested" | "return_requested" => Ok(OrderStatus::ReturnRequested),
            other => Err(DomainError::invalid_input(format!(
                "Unknown order status: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: String,
    pub name: String,
    #[serde(default = "one")]
    pub quantity: u32,
    #[serde(default)]
    pub price: Option<f64>,
}

fn one() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub transaction_type: String,
    pub amount: f64,
    pub payment_method_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub items: Vec<OrderItem>,
    #[serde(default)]
    pub address: Address,
    #[serde(default)]
    pub payment_history: Vec<PaymentRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub return_items: Vec<String>,
}

impl Order {
    pub fn new(order_id: impl Into<String>, user_id: impl Into<String>, status: OrderStatus) -> Self {
        Self {
            order_id: order_id.into(),
            user_id: user_id.into(),
            status,
            items: Vec::new(),
            address: Address::default(),
            payment_history: Vec::new(),
            cancel_reason: None,
            return_items: Vec::new(),
        }
    }

    pub fn with_item(mut self, item: OrderItem) -> Self {
        self.items.push(item);
        self
    }

    pub fn with_address(mut self, address: Address) -> Self {
        self.address = address;
        self
    }

    pub fn total(&self) -> f64 {
        self.items
            .iter()
            .map(|i| i.price.unwrap_or(0.0) * f64::from(i.quantity))
            .sum()
    }

    /// Only pending orders can be cancelled.
    pub fn cancel(&mut self, reason: impl Into<String>) -> Result<(), DomainError> {
        if self.status != OrderStatus::Pending {
            return Err(DomainError::invalid_state(format!(
                "Order {} is {} and cannot be cancelled; only pending orders can be cancelled",
                self.order_id, self.status
            )));
        }
        self.status = OrderStatus::Cancelled;
        self.cancel_reason = Some(reason.into());
        Ok(())
    }

    /// Only delivered orders accept returns, and every item id must be on the order.
    pub fn request_return(&mut self, item_ids: &[String]) -> Result<(), DomainError> {
        if self.status != OrderStatus::Delivered {
            return Err(DomainError::invalid_state(format!(
                "Order {} is {}; only delivered orders can be returned",
                self.order_id, self.status
            )));
        }
        if item_ids.is_empty() {
            return Err(DomainError::invalid_input("No item ids given for the return"));
        }
        if let Some(missing) = item_ids
            .iter()
            .find(|id| !self.items.iter().any(|item| &item.product_id == *id))
        {
            return Err(DomainError::invalid_input(format!(
                "Item {} is not part of order {}",
                missing, self.order_id
            )));
        }

        self.status = OrderStatus::ReturnRequested;
        self.return_items = item_ids.to_vec();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str) -> OrderItem {
        OrderItem {
            product_id: id.to_string(),
            name: id.to_string(),
            quantity: 2,
            price: Some(10.0),
        }
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&OrderStatus::ReturnRequested).unwrap();
        assert_eq!(json, "\"return requested\"");
        let parsed: OrderStatus = serde_json::from_str("\"delivered\"").unwrap();
        assert_eq!(parsed, OrderStatus::Delivered);
    }

    #[test]
    fn status_from_str_rejects_unknown() {
        assert_eq!("Canceled".parse::<OrderStatus>().unwrap(), OrderStatus::Cancelled);
        assert!("shipped".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn cancel_only_from_pending() {
        let mut order = Order::new("#W1", "u", OrderStatus::Pending);
        order.cancel("no longer needed").unwrap();
        assert_eq!(order.status, OrderStatus::Cancelled);
        assert_eq!(order.cancel_reason.as_deref(), Some("no longer needed"));

        let err = order.cancel("again").unwrap_err();
        assert!(matches!(err, DomainError::InvalidState(_)));
    }

    #[test]
    fn return_checks_status_and_items() {
        let mut order = Order::new("#W2", "u", OrderStatus::Delivered).with_item(item("PROD001"));
        assert!(order.request_return(&[]).is_err());
        assert!(order.request_return(&["PROD999".to_string()]).is_err());
        assert_eq!(order.status, OrderStatus::Delivered);

        order.request_return(&["PROD001".to_string()]).unwrap();
        assert_eq!(order.status, OrderStatus::ReturnRequested);
        assert_eq!(order.return_items, vec!["PROD001".to_string()]);
    }

    #[test]
    fn total_multiplies_quantity() {
        let order = Order::new("#W3", "u", OrderStatus::Pending)
            .with_item(item("A"))
            .with_item(item("B"));
        assert!((order.total() - 40.0).abs() < f64::EPSILON);
    }
}
