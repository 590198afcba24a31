use std::sync::Arc;

use serde_json::{json, Map, Value};

use toolchat::connector::adapter::DEFAULT_SEED;
use toolchat::{
    generate_sample_dataset, InMemoryRetailRepository, OrderStatus, RetailRepository,
    ToolExecutor,
};

fn executor() -> (ToolExecutor, Arc<InMemoryRetailRepository>) {
    let repository = Arc::new(InMemoryRetailRepository::from_dataset(generate_sample_dataset(
        DEFAULT_SEED,
    )));
    (ToolExecutor::new(repository.clone()), repository)
}

fn args(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn error_of(result: &Value) -> &str {
    result["error"].as_str().unwrap_or_default()
}

#[tokio::test]
async fn test_find_user_by_email() {
    let (executor, _) = executor();

    let found = executor
        .execute("find_user_id_by_email", &args(json!({"email": "jane.doe@example.com"})))
        .await;
    assert_eq!(found, json!({"user_id": "jane_doe"}));

    let missing = executor
        .execute("find_user_id_by_email", &args(json!({"email": "nobody@example.com"})))
        .await;
    assert!(error_of(&missing).contains("nobody@example.com"));
}

#[tokio::test]
async fn test_missing_arguments_are_reported() {
    let (executor, _) = executor();

    let result = executor.execute("get_order_details", &Map::new()).await;

    assert!(error_of(&result).starts_with("Invalid arguments for get_order_details"));
}

#[tokio::test]
async fn test_list_all_product_types_is_sorted_summary() {
    let (executor, _) = executor();

    let result = executor.execute("list_all_product_types", &Map::new()).await;

    let products = result["products"].as_array().unwrap();
    assert_eq!(products.len(), 12);
    assert_eq!(products[0], json!({"product_id": "PROD001", "name": "Wireless Headphones"}));
    let ids: Vec<&str> = products.iter().map(|p| p["product_id"].as_str().unwrap()).collect();
    let mut sorted = ids.clone();
    sorted.sort();
    assert_eq!(ids, sorted);
}

#[tokio::test]
async fn test_return_policy_is_static_text() {
    let (executor, _) = executor();

    let result = executor.execute("get_return_policy", &Map::new()).await;

    assert!(!result["policy"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_cancel_without_reason_uses_default() {
    let (executor, repository) = executor();

    let result = executor
        .execute("cancel_pending_order", &args(json!({"order_id": "#W1000004"})))
        .await;

    assert_eq!(result["status"], "cancelled");
    let order = repository.get_order("#W1000004").await.unwrap().unwrap();
    assert_eq!(order.cancel_reason.as_deref(), Some("no longer needed"));
}

#[tokio::test]
async fn test_cancel_non_pending_order_is_refused() {
    let (executor, repository) = executor();

    let result = executor
        .execute("cancel_pending_order", &args(json!({"order_id": "#W1000001"})))
        .await;

    assert!(error_of(&result).contains("cannot be cancelled"));
    let order = repository.get_order("#W1000001").await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Processed);
}

#[tokio::test]
async fn test_return_with_unknown_or_empty_items_is_refused() {
    let (executor, repository) = executor();

    let unknown = executor
        .execute(
            "return_delivered_order_items",
            &args(json!({"order_id": "#W1000002", "item_ids": ["PROD999"]})),
        )
        .await;
    assert!(error_of(&unknown).contains("PROD999"));

    let empty = executor
        .execute(
            "return_delivered_order_items",
            &args(json!({"order_id": "#W1000002", "item_ids": []})),
        )
        .await;
    assert!(empty.get("error").is_some());

    let order = repository.get_order("#W1000002").await.unwrap().unwrap();
    assert_eq!(order.status, OrderStatus::Delivered);
}

#[tokio::test]
async fn test_calculate() {
    let (executor, _) = executor();

    let result = executor
        .execute("calculate", &args(json!({"expression": "(79.99 + 12.99) * 2"})))
        .await;
    assert_eq!(result["result"], 185.96);

    let bad = executor
        .execute("calculate", &args(json!({"expression": "import os"})))
        .await;
    assert!(bad.get("error").is_some());

    let div = executor
        .execute("calculate", &args(json!({"expression": "1/0"})))
        .await;
    assert!(div.get("error").is_some());
}

#[tokio::test]
async fn test_calculate_rejects_deeply_nested_expression() {
    let (executor, _) = executor();
    let depth = 200_000;
    let expression = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));

    let result = executor
        .execute("calculate", &args(json!({ "expression": expression })))
        .await;
    assert!(error_of(&result).contains("nested too deeply"));

    let signs = format!("{}5", "-".repeat(depth));
    let result = executor
        .execute("calculate", &args(json!({ "expression": signs })))
        .await;
    assert!(result.get("error").is_some());
}

#[tokio::test]
async fn test_transfer_to_human_agents() {
    let (executor, _) = executor();

    let result = executor
        .execute(
            "transfer_to_human_agents",
            &args(json!({"summary": "User wants to dispute a charge"})),
        )
        .await;

    assert_eq!(result["status"], "success");
}

#[tokio::test]
async fn test_unknown_tool_gets_mock_success() {
    let (executor, _) = executor();

    let result = executor
        .execute("exchange_delivered_order_items", &args(json!({"order_id": "#W1000002"})))
        .await;

    assert_eq!(result["status"], "success");
    assert!(result["message"]
        .as_str()
        .unwrap()
        .contains("exchange_delivered_order_items"));
    assert!(result["note"].as_str().unwrap().contains("mock"));
}
