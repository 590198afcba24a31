use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::domain::{
    Address, DomainError, Order, OrderItem, OrderStatus, PaymentMethod, PaymentRecord, Product,
    RetailDataset, ToolDefinition, User,
};

pub const DEFAULT_HF_DATASET: &str = "Salesforce/APIGen-MT-5k";
pub const DEFAULT_HF_DATASET_FILE: &str = "apigen-mt_5k.json";

/// Entries scanned per load.
const MAX_ENTRIES: usize = 2000;

const RETAIL_KEYWORDS: [&str; 7] = [
    "retail",
    "order",
    "product",
    "customer",
    "user_id",
    "order_id",
    "product_id",
];

const RETAIL_TOOL_MARKERS: [&str; 8] = [
    "find_user",
    "get_order",
    "get_product",
    "cancel_order",
    "modify_order",
    "return_order",
    "exchange_order",
    "list_product",
];

/// Where to fetch agent-trajectory data from on the Hugging Face Hub.
#[derive(Debug, Clone, PartialEq)]
pub struct HfDatasetSource {
    pub repo_id: String,
    pub filename: String,
}

impl HfDatasetSource {
    pub fn new(repo_id: impl Into<String>) -> Self {
        Self {
            repo_id: repo_id.into(),
            filename: DEFAULT_HF_DATASET_FILE.to_string(),
        }
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }
}

impl Default for HfDatasetSource {
    fn default() -> Self {
        Self::new(DEFAULT_HF_DATASET)
    }
}

/// Tool schemas and retail records recovered from a trajectory dataset.
#[derive(Debug, Clone, Default)]
pub struct HfExtract {
    pub tools: Vec<ToolDefinition>,
    pub dataset: RetailDataset,
}

/// Downloads the dataset file into the hub cache (or reuses the cached copy)
/// and extracts its retail content.
pub async fn load_hf_dataset(source: &HfDatasetSource) -> Result<HfExtract, DomainError> {
    let path = download_hf_dataset(source).await?;
    load_hf_dataset_file(&path).await
}

pub async fn download_hf_dataset(source: &HfDatasetSource) -> Result<PathBuf, DomainError> {
    info!(
        "Fetching {} from dataset {}",
        source.filename, source.repo_id
    );
    let source = source.clone();

    tokio::task::spawn_blocking(move || {
        let api = hf_hub::api::sync::ApiBuilder::new()
            .with_progress(true)
            .build()
            .map_err(|e| DomainError::endpoint(format!("Failed to create HF API: {}", e)))?;

        api.dataset(source.repo_id.clone())
            .get(&source.filename)
            .map_err(|e| {
                DomainError::endpoint(format!(
                    "Failed to download {} from {}: {}",
                    source.filename, source.repo_id, e
                ))
            })
    })
    .await
    .map_err(|e| DomainError::internal(format!("Download task failed: {}", e)))?
}

pub async fn load_hf_dataset_file(path: &Path) -> Result<HfExtract, DomainError> {
    let raw = tokio::fs::read_to_string(path).await?;
    let extract = extract_retail_records(&raw)?;

    let stats = extract.dataset.stats();
    info!(
        "Extracted {} users, {} orders, {} products, {} tools from {}",
        stats.users,
        stats.orders,
        stats.products,
        extract.tools.len(),
        path.display()
    );
    Ok(extract)
}

/// Scans up to the first 2000 entries of a JSON array or JSON-lines file of
/// trajectories. Non-retail entries and unparseable turns are skipped.
pub fn extract_retail_records(raw: &str) -> Result<HfExtract, DomainError> {
    let entries = parse_entries(raw)?;
    let mut extractor = Extractor::default();

    for entry in entries.iter().take(MAX_ENTRIES) {
        extractor.absorb_entry(entry);
    }

    Ok(extractor.finish())
}

fn parse_entries(raw: &str) -> Result<Vec<Value>, DomainError> {
    let trimmed = raw.trim_start();
    if trimmed.starts_with('[') {
        let entries: Vec<Value> = serde_json::from_str(trimmed).map_err(|e| {
            DomainError::invalid_input(format!("Dataset is not a JSON array of entries: {}", e))
        })?;
        return Ok(entries);
    }

    Ok(trimmed
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| match serde_json::from_str::<Value>(line) {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!("Skipping malformed dataset line: {}", e);
                None
            }
        })
        .collect())
}

/// Strings arrive either as JSON text or already decoded.
fn decode(value: &Value) -> Option<Value> {
    match value {
        Value::String(s) => serde_json::from_str(s).ok(),
        other => Some(other.clone()),
    }
}

fn str_field<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|k| obj.get(*k).and_then(Value::as_str))
        .find(|s| !s.is_empty())
}

fn id_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    str_field(obj, &[key]).map(str::to_string)
}

fn price_field(obj: &Map<String, Value>) -> Option<f64> {
    obj.get("price").and_then(Value::as_f64)
}

fn address_field(obj: &Map<String, Value>) -> Option<Address> {
    obj.get("address")
        .filter(|v| v.is_object())
        .and_then(|v| serde_json::from_value(v.clone()).ok())
}

fn non_empty(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| match v {
        Value::Null => false,
        Value::Object(m) => !m.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::String(s) => !s.is_empty(),
        _ => true,
    })
}

/// `jane_doe_1234` reads as Jane / Doe.
fn names_from_id(user_id: &str) -> (String, String) {
    let mut parts = user_id.split('_').filter(|p| !p.is_empty());
    let first = parts.next().map(title_case).unwrap_or_else(|| "Unknown".to_string());
    let last = parts.next().map(title_case).unwrap_or_else(|| "User".to_string());
    (first, last)
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// First `local@domain.tld` token in free text.
fn find_email(text: &str) -> Option<&str> {
    text.split(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | '<' | '>' | '(' | ')' | '"' | '\''))
        .map(|token| token.trim_matches(|c: char| !(c.is_alphanumeric() || c == '_')))
        .find(|token| {
            let Some((local, domain)) = token.split_once('@') else {
                return false;
            };
            let valid = |c: char| c.is_alphanumeric() || matches!(c, '.' | '_' | '-');
            !local.is_empty()
                && local.chars().all(valid)
                && domain.chars().all(valid)
                && domain
                    .rsplit_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        })
}

fn payment_method(id: Option<&str>, obj: &Map<String, Value>) -> Option<PaymentMethod> {
    let id = id.or_else(|| str_field(obj, &["id", "payment_method_id"]))?;
    Some(PaymentMethod {
        payment_method_id: id.to_string(),
        source: str_field(obj, &["source"]).unwrap_or("unknown").to_string(),
    })
}

fn payment_methods(value: Option<&Value>) -> Vec<PaymentMethod> {
    match value {
        Some(Value::Array(list)) => list
            .iter()
            .filter_map(Value::as_object)
            .filter_map(|obj| payment_method(None, obj))
            .collect(),
        // Keyed by payment method id.
        Some(Value::Object(map)) => map
            .iter()
            .filter_map(|(id, v)| v.as_object().and_then(|obj| payment_method(Some(id.as_str()), obj)))
            .collect(),
        _ => Vec::new(),
    }
}

fn payment_history(value: Option<&Value>) -> Vec<PaymentRecord> {
    value
        .and_then(Value::as_array)
        .map(|list| {
            list.iter()
                .filter_map(|v| serde_json::from_value(v.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}

#[derive(Default)]
struct Extractor {
    tools: Vec<ToolDefinition>,
    users: BTreeMap<String, User>,
    orders: BTreeMap<String, Order>,
    products: BTreeMap<String, Product>,
}

impl Extractor {
    fn absorb_entry(&mut self, entry: &Value) {
        let Some(entry) = entry.as_object() else {
            return;
        };

        let tools: Vec<Value> = entry
            .get("tools")
            .and_then(decode)
            .and_then(|v| v.as_array().cloned())
            .unwrap_or_default();

        if !is_retail(entry, &tools) {
            return;
        }

        for tool in tools.iter().filter_map(Value::as_object) {
            self.absorb_tool(tool);
        }

        let turns = entry
            .get("conversations")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        for turn in turns.iter().filter_map(Value::as_object) {
            let Some(value) = turn.get("value") else {
                continue;
            };
            match turn.get("from").and_then(Value::as_str) {
                Some("observation") => self.absorb_observation(value),
                Some("human") => {
                    if let Some(text) = value.as_str() {
                        self.absorb_human_text(text);
                    }
                }
                _ => {}
            }
        }
    }

    fn absorb_tool(&mut self, tool: &Map<String, Value>) {
        let Some(name) = str_field(tool, &["name"]) else {
            return;
        };
        if self.tools.iter().any(|t| t.name() == name) {
            return;
        }
        let parameters = tool
            .get("parameters")
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new()));
        self.tools.push(ToolDefinition::function(
            name,
            str_field(tool, &["description"]).unwrap_or_default(),
            parameters,
        ));
    }

    fn absorb_observation(&mut self, value: &Value) {
        let Some(decoded) = decode(value) else {
            return;
        };
        let items = match decoded {
            Value::Array(list) => list,
            single => vec![single],
        };

        for obj in items.iter().filter_map(Value::as_object) {
            if obj.contains_key("order_id") {
                self.absorb_order(obj);
            } else if obj.contains_key("product_id") {
                self.absorb_product(obj);
            } else if obj.contains_key("user_id")
                || (obj.contains_key("email") && obj.contains_key("name"))
            {
                self.absorb_user(obj);
            }

            if let Some(orders) = obj.get("orders").and_then(Value::as_array) {
                for order in orders.iter().filter_map(Value::as_object) {
                    self.absorb_order(order);
                }
            }
            if let Some(products) = obj.get("products").and_then(Value::as_array) {
                for product in products.iter().filter_map(Value::as_object) {
                    self.absorb_product(product);
                }
            }
        }
    }

    fn absorb_user(&mut self, obj: &Map<String, Value>) {
        let email = str_field(obj, &["email"]);
        let Some(user_id) = id_field(obj, "user_id")
            .or_else(|| email.map(|e| e.split('@').next().unwrap_or(e).replace('.', "_")))
        else {
            return;
        };

        let name = obj.get("name").and_then(Value::as_object);
        let first = str_field(obj, &["first_name", "firstname"])
            .or_else(|| name.and_then(|n| str_field(n, &["first_name", "first"])));
        let last = str_field(obj, &["last_name", "lastname"])
            .or_else(|| name.and_then(|n| str_field(n, &["last_name", "last"])));

        if let Some(existing) = self.users.get_mut(&user_id) {
            if let Some(email) = email {
                if existing.email.ends_with("@example.com") {
                    existing.email = email.to_string();
                }
            }
            if existing.address == Address::default() {
                if let Some(address) = address_field(obj) {
                    existing.address = address;
                }
            }
            if let Some(first) = first {
                existing.first_name = first.to_string();
            }
            if let Some(last) = last {
                existing.last_name = last.to_string();
            }
            return;
        }

        let (first, last) = match (first, last) {
            (None, None) => names_from_id(&user_id),
            (f, l) => (f.unwrap_or_default().to_string(), l.unwrap_or_default().to_string()),
        };
        let mut user = User::new(user_id.clone())
            .with_email(email.unwrap_or_default())
            .with_name(first, last);
        if let Some(address) = address_field(obj) {
            user = user.with_address(address);
        }
        user.payment_methods = payment_methods(obj.get("payment_methods"));

        self.users.insert(user_id, user);
    }

    fn absorb_order(&mut self, obj: &Map<String, Value>) {
        let Some(order_id) = id_field(obj, "order_id").or_else(|| id_field(obj, "id")) else {
            return;
        };
        let status = str_field(obj, &["status"]).and_then(|s| s.parse::<OrderStatus>().ok());
        let raw_items = non_empty(obj.get("items"))
            .or_else(|| non_empty(obj.get("order_items")))
            .and_then(Value::as_array);
        let items: Option<Vec<OrderItem>> =
            raw_items.map(|list| list.iter().filter_map(|v| self.absorb_order_item(v)).collect());

        if let Some(existing) = self.orders.get_mut(&order_id) {
            if let Some(status) = status {
                existing.status = status;
            }
            if let Some(items) = items.filter(|i| !i.is_empty()) {
                existing.items = items;
            }
            if existing.user_id.is_empty() {
                if let Some(user_id) = str_field(obj, &["user_id"]) {
                    existing.user_id = user_id.to_string();
                }
            }
            return;
        }

        let mut order = Order::new(
            order_id.clone(),
            str_field(obj, &["user_id"]).unwrap_or_default(),
            status.unwrap_or_default(),
        );
        order.items = items.unwrap_or_default();
        if let Some(address) = address_field(obj) {
            order.address = address;
        }
        order.payment_history = payment_history(obj.get("payment_history"));

        self.orders.insert(order_id, order);
    }

    /// Order lines also seed the product table.
    fn absorb_order_item(&mut self, value: &Value) -> Option<OrderItem> {
        let obj = value.as_object()?;
        let product_id = str_field(obj, &["product_id", "id"])?.to_string();
        let name = str_field(obj, &["name", "product_name"]);
        let price = price_field(obj);

        if let Some(name) = name {
            self.products
                .entry(product_id.clone())
                .or_insert_with(|| {
                    let mut product = Product::new(product_id.clone(), name).with_description(
                        str_field(obj, &["description"]).unwrap_or_default(),
                    );
                    product.price = price;
                    if let Some(variants) = non_empty(obj.get("variants")) {
                        product.variants = variants.clone();
                    }
                    product
                });
        }

        Some(OrderItem {
            name: name.unwrap_or(&product_id).to_string(),
            quantity: obj
                .get("quantity")
                .and_then(Value::as_u64)
                .and_then(|q| u32::try_from(q).ok())
                .unwrap_or(1),
            price,
            product_id,
        })
    }

    fn absorb_product(&mut self, obj: &Map<String, Value>) {
        let Some(product_id) = id_field(obj, "product_id").or_else(|| id_field(obj, "id")) else {
            return;
        };
        let Some(name) = str_field(obj, &["name", "product_name", "title"]) else {
            return;
        };
        let description = str_field(obj, &["description", "desc"]);
        let variants = non_empty(obj.get("variants"));

        if let Some(existing) = self.products.get_mut(&product_id) {
            if existing.price.is_none() {
                existing.price = price_field(obj);
            }
            if existing.description.is_empty() {
                if let Some(description) = description {
                    existing.description = description.to_string();
                }
            }
            if let Some(variants) = variants {
                existing.variants = variants.clone();
            }
            return;
        }

        let mut product =
            Product::new(product_id.clone(), name).with_description(description.unwrap_or_default());
        product.price = price_field(obj);
        if let Some(variants) = variants {
            product.variants = variants.clone();
        }
        self.products.insert(product_id, product);
    }

    fn absorb_human_text(&mut self, text: &str) {
        let Some(email) = find_email(text) else {
            return;
        };
        let user_id = email.split('@').next().unwrap_or(email).replace('.', "_");
        if self.users.contains_key(&user_id) {
            return;
        }
        let (first, last) = names_from_id(&user_id);
        let user = User::new(user_id.clone())
            .with_email(email)
            .with_name(first, last);
        self.users.insert(user_id, user);
    }

    fn finish(self) -> HfExtract {
        HfExtract {
            tools: self.tools,
            dataset: RetailDataset {
                users: self.users.into_values().collect(),
                orders: self.orders.into_values().collect(),
                products: self.products.into_values().collect(),
            },
        }
    }
}

fn is_retail(entry: &Map<String, Value>, tools: &[Value]) -> bool {
    let system = entry
        .get("system")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_lowercase();
    if RETAIL_KEYWORDS.iter().any(|k| system.contains(k)) {
        return true;
    }

    tools
        .iter()
        .filter_map(|t| t.get("name").and_then(Value::as_str))
        .map(str::to_lowercase)
        .any(|name| RETAIL_TOOL_MARKERS.iter().any(|m| name.contains(m)))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn retail_entry() -> Value {
        let tools = json!([
            {
                "name": "get_order_details",
                "description": "Get the status and details of an order.",
                "parameters": {"type": "object", "properties": {"order_id": {"type": "string"}}, "required": ["order_id"]}
            },
            {
                "name": "exchange_delivered_order_items",
                "description": "Exchange items in a delivered order.",
                "parameters": {"type": "object", "properties": {}}
            }
        ]);
        json!({
            "system": "You are a retail agent helping customers.",
            "tools": tools.to_string(),
            "conversations": [
                {"from": "human", "value": "Hi, my email is mia.garcia@example.org, thanks."},
                {"from": "function_call", "value": "{\"name\": \"find_user_id_by_email\"}"},
                {"from": "observation", "value": json!({
                    "user_id": "mia_garcia_4516",
                    "name": {"first_name": "Mia", "last_name": "Garcia"},
                    "email": "mia.garcia@example.org",
                    "address": {"address1": "1 Main St", "city": "Austin", "state": "TX", "zip": "78701", "country": "USA"},
                    "payment_methods": {"credit_card_1": {"source": "credit_card", "brand": "visa"}}
                }).to_string()},
                {"from": "observation", "value": json!({
                    "order_id": "#W1234567",
                    "user_id": "mia_garcia_4516",
                    "status": "delivered",
                    "items": [{"name": "Water Bottle", "product_id": "8310926033", "item_id": "1", "price": 24.5}],
                    "payment_history": [{"transaction_type": "payment", "amount": 24.5, "payment_method_id": "credit_card_1"}]
                }).to_string()},
                {"from": "observation", "value": "not json at all"}
            ]
        })
    }

    #[test]
    fn extracts_tools_and_records_from_retail_entry() {
        let raw = json!([retail_entry()]).to_string();
        let extract = extract_retail_records(&raw).unwrap();

        let names: Vec<&str> = extract.tools.iter().map(|t| t.name()).collect();
        assert_eq!(names, vec!["get_order_details", "exchange_delivered_order_items"]);

        let user = extract
            .dataset
            .users
            .iter()
            .find(|u| u.user_id == "mia_garcia_4516")
            .unwrap();
        assert_eq!(user.full_name(), "Mia Garcia");
        assert_eq!(user.address.zip, "78701");
        assert_eq!(user.payment_methods[0].payment_method_id, "credit_card_1");

        let order = &extract.dataset.orders[0];
        assert_eq!(order.order_id, "#W1234567");
        assert_eq!(order.status, OrderStatus::Delivered);
        assert_eq!(order.items[0].product_id, "8310926033");
        assert_eq!(order.payment_history.len(), 1);

        let product = &extract.dataset.products[0];
        assert_eq!(product.name, "Water Bottle");
        assert_eq!(product.price, Some(24.5));
    }

    #[test]
    fn email_in_human_turn_becomes_user() {
        let raw = json!([retail_entry()]).to_string();
        let extract = extract_retail_records(&raw).unwrap();

        let user = extract
            .dataset
            .users
            .iter()
            .find(|u| u.user_id == "mia_garcia")
            .unwrap();
        assert_eq!(user.email, "mia.garcia@example.org");
        assert_eq!(user.full_name(), "Mia Garcia");
    }

    #[test]
    fn non_retail_entries_are_skipped() {
        let entry = json!({
            "system": "You are an airline booking assistant.",
            "tools": [{"name": "book_flight", "description": "Book", "parameters": {}}],
            "conversations": [
                {"from": "observation", "value": {"user_id": "pilot_1", "email": "p@air.com"}}
            ]
        });
        let extract = extract_retail_records(&json!([entry]).to_string()).unwrap();
        assert!(extract.tools.is_empty());
        assert!(extract.dataset.users.is_empty());
    }

    #[test]
    fn json_lines_are_accepted() {
        let raw = format!("{}\n\n{}\nnot json\n", retail_entry(), retail_entry());
        let extract = extract_retail_records(&raw).unwrap();
        assert_eq!(extract.tools.len(), 2);
        assert_eq!(extract.dataset.orders.len(), 1);
    }

    #[test]
    fn later_observations_update_orders() {
        let entry = json!({
            "system": "retail",
            "tools": "[]",
            "conversations": [
                {"from": "observation", "value": {"order_id": "#W1", "status": "pending"}},
                {"from": "observation", "value": {"order_id": "#W1", "status": "cancelled", "user_id": "sam_lee_1"}}
            ]
        });
        let extract = extract_retail_records(&json!([entry]).to_string()).unwrap();
        let order = &extract.dataset.orders[0];
        assert_eq!(order.status, OrderStatus::Cancelled);
        assert_eq!(order.user_id, "sam_lee_1");
    }

    #[test]
    fn broken_array_is_an_error() {
        assert!(extract_retail_records("[{\"system\": ").is_err());
    }

    #[test]
    fn email_finder_ignores_bare_at_signs() {
        assert_eq!(find_email("reach me at a@b.co."), Some("a@b.co"));
        assert_eq!(find_email("meet @ noon"), None);
        assert_eq!(find_email("user@localhost"), None);
    }
}
