use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub address1: String,
    #[serde(default)]
    pub address2: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip: String,
    #[serde(default)]
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub payment_method_id: String,
    pub source: String,
}

/// A customer of the mock store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub address: Address,
    #[serde(default)]
    pub payment_methods: Vec<PaymentMethod>,
}

impl User {
    /// Builds a user the way the "Add User" form does: blank fields fall back
    /// to placeholders derived from the id.
    pub fn new(user_id: impl Into<String>) -> Self {
        let user_id = user_id.into();
        Self {
            email: format!("{}@example.com", user_id),
            first_name: "Unknown".to_string(),
            last_name: "User".to_string(),
            address: Address {
                country: "USA".to_string(),
                ..Address::default()
            },
            payment_methods: Vec::new(),
            user_id,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        let email = email.into();
        if !email.is_empty() {
            self.email = email;
        }
        self
    }

    pub fn with_name(mut self, first: impl Into<String>, last: impl Into<String>) -> Self {
        let (first, last) = (first.into(), last.into());
        if !first.is_empty() {
            self.first_name = first;
        }
        if !last.is_empty() {
            self.last_name = last;
        }
        self
    }

    pub fn with_address(mut self, address: Address) -> Self {
        self.address = address;
        self
    }

    pub fn with_payment_method(mut self, method: PaymentMethod) -> Self {
        self.payment_methods.push(method);
        self
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Case-insensitive name match plus exact zip match.
    pub fn matches_name_zip(&self, first_name: &str, last_name: &str, zip: &str) -> bool {
        self.first_name.eq_ignore_ascii_case(first_name)
            && self.last_name.eq_ignore_ascii_case(last_name)
            && self.address.zip == zip
    }
}
