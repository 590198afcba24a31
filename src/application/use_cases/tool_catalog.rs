use std::collections::BTreeSet;

use schemars::{schema_for, JsonSchema};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::domain::ToolDefinition;

pub const FIND_USER_ID_BY_EMAIL: &str = "find_user_id_by_email";
pub const FIND_USER_ID_BY_NAME_ZIP: &str = "find_user_id_by_name_zip";
pub const GET_USER_DETAILS: &str = "get_user_details";
pub const GET_ORDER_DETAILS: &str = "get_order_details";
pub const GET_PRODUCT_DETAILS: &str = "get_product_details";
pub const LIST_ALL_PRODUCT_TYPES: &str = "list_all_product_types";
pub const GET_RETURN_POLICY: &str = "get_return_policy";
pub const CANCEL_PENDING_ORDER: &str = "cancel_pending_order";
pub const RETURN_DELIVERED_ORDER_ITEMS: &str = "return_delivered_order_items";
pub const CALCULATE: &str = "calculate";
pub const TRANSFER_TO_HUMAN_AGENTS: &str = "transfer_to_human_agents";

#[derive(Debug, Deserialize, JsonSchema)]
pub struct FindUserByEmailArgs {
    /// The email of the user, such as 'something@example.com'.
    pub email: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct FindUserByNameZipArgs {
    /// The first name of the customer, such as 'John'.
    pub first_name: String,
    /// The last name of the customer, such as 'Doe'.
    pub last_name: String,
    /// The zip code of the customer, such as '12345'.
    pub zip: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UserIdArgs {
    /// The user id, such as 'sara_doe_496'.
    pub user_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct OrderIdArgs {
    /// The order id, such as '#W0000000'. Be careful there is a '#' symbol at the beginning of the order id.
    pub order_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ProductIdArgs {
    /// The product id, such as 'PROD001'.
    pub product_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CancelOrderArgs {
    /// The order id, such as '#W0000000'. Be careful there is a '#' symbol at the beginning of the order id.
    pub order_id: String,
    /// The reason for cancellation, such as 'no longer needed' or 'ordered by mistake'.
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ReturnItemsArgs {
    /// The order id, such as '#W0000000'. Be careful there is a '#' symbol at the beginning of the order id.
    pub order_id: String,
    /// The product ids of the items to return, such as ['PROD001', 'PROD004'].
    pub item_ids: Vec<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CalculateArgs {
    /// The arithmetic expression to evaluate, such as '79.99 * 2 - 10'. Only numbers, + - * /, parentheses and spaces are allowed.
    pub expression: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct TransferArgs {
    /// A summary of the user's issue.
    pub summary: String,
}

/// JSON schema of an argument struct, stripped to what a function declaration needs.
fn parameters_of<T: JsonSchema>() -> Value {
    let mut value = serde_json::to_value(schema_for!(T)).unwrap_or_else(|_| no_parameters());
    if let Some(object) = value.as_object_mut() {
        object.remove("$schema");
        object.remove("title");
        object.remove("description");
    }
    value
}

fn no_parameters() -> Value {
    json!({"type": "object", "properties": {}, "required": []})
}

/// The declared tool surface of the retail agent.
#[derive(Debug, Clone)]
pub struct ToolCatalog {
    tools: Vec<ToolDefinition>,
}

impl ToolCatalog {
    pub fn new(tools: Vec<ToolDefinition>) -> Self {
        Self { tools }
    }

    pub fn retail() -> Self {
        Self::new(vec![
            ToolDefinition::function(
                FIND_USER_ID_BY_EMAIL,
                "Find user id by email. If the user is not found, the function will return an error message.",
                parameters_of::<FindUserByEmailArgs>(),
            ),
            ToolDefinition::function(
                FIND_USER_ID_BY_NAME_ZIP,
                "Find user id by first name, last name, and zip code. If the user is not found, the function will return an error message. By default, find user id by email, and only call this function if the user is not found by email or cannot remember email.",
                parameters_of::<FindUserByNameZipArgs>(),
            ),
            ToolDefinition::function(
                GET_USER_DETAILS,
                "Get the details of a user, including their address and payment methods.",
                parameters_of::<UserIdArgs>(),
            ),
            ToolDefinition::function(
                GET_ORDER_DETAILS,
                "Get the status and details of an order.",
                parameters_of::<OrderIdArgs>(),
            ),
            ToolDefinition::function(
                GET_PRODUCT_DETAILS,
                "Get the inventory details of a product.",
                parameters_of::<ProductIdArgs>(),
            ),
            ToolDefinition::function(
                LIST_ALL_PRODUCT_TYPES,
                "List the name and product id of all product types.",
                no_parameters(),
            ),
            ToolDefinition::function(
                GET_RETURN_POLICY,
                "Explain the store's return policy.",
                no_parameters(),
            ),
            ToolDefinition::function(
                CANCEL_PENDING_ORDER,
                "Cancel a pending order. If the order is already processed or delivered, it cannot be cancelled. The agent needs to explain the cancellation detail and ask for explicit user confirmation (yes/no) to proceed.",
                parameters_of::<CancelOrderArgs>(),
            ),
            ToolDefinition::function(
                RETURN_DELIVERED_ORDER_ITEMS,
                "Return some items of a delivered order. The order status will be changed to 'return requested'. The agent needs to explain the return detail and ask for explicit user confirmation (yes/no) to proceed.",
                parameters_of::<ReturnItemsArgs>(),
            ),
            ToolDefinition::function(
                CALCULATE,
                "Calculate the result of a mathematical expression.",
                parameters_of::<CalculateArgs>(),
            ),
            ToolDefinition::function(
                TRANSFER_TO_HUMAN_AGENTS,
                "Transfer the user to a human agent, with a summary of the user's issue. Only transfer if the user explicitly asks for a human agent, or the issue cannot be resolved with the available tools.",
                parameters_of::<TransferArgs>(),
            ),
        ])
    }

    /// Appends tools whose names are not declared yet.
    pub fn merge(mut self, extra: Vec<ToolDefinition>) -> Self {
        for tool in extra {
            if !self.contains(tool.name()) {
                self.tools.push(tool);
            }
        }
        self
    }

    pub fn tools(&self) -> &[ToolDefinition] {
        &self.tools
    }

    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.tools.iter().find(|t| t.name() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name().to_string()).collect()
    }

    /// Enabled tools in catalog order.
    pub fn select(&self, enabled: &BTreeSet<String>) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .filter(|t| enabled.contains(t.name()))
            .cloned()
            .collect()
    }
}

impl Default for ToolCatalog {
    fn default() -> Self {
        Self::retail()
    }
}
