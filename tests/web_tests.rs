//! The browser front-end's JSON API, served on an ephemeral port with a
//! scripted chat client behind it.

use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::{json, Value};

use toolchat::application::SessionSettings;
use toolchat::connector::web::{build_router, WebState};
use toolchat::{ChatMessage, Container, ContainerConfig, ScriptedChatClient, ToolCall};

struct TestServer {
    base: String,
    http: reqwest::Client,
}

impl TestServer {
    async fn start(client: ScriptedChatClient) -> Self {
        let config = ContainerConfig {
            base_url: None,
            model: None,
            api_key: None,
            data_file: None,
            hf_dataset: None,
            seed: 42,
            settings: SessionSettings::default(),
        };
        let container = Container::with_client(config, Arc::new(client)).await.unwrap();
        let app = build_router(Arc::new(WebState::new(container)));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base: format!("http://{}", addr),
            http: reqwest::Client::new(),
        }
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        let res = self.http.get(format!("{}{}", self.base, path)).send().await.unwrap();
        let status = res.status();
        (status, res.json().await.unwrap_or(Value::Null))
    }

    async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let res = self
            .http
            .post(format!("{}{}", self.base, path))
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = res.status();
        (status, res.json().await.unwrap_or(Value::Null))
    }

    async fn new_session(&self) -> String {
        let (status, body) = self.post("/api/session", json!({})).await;
        assert_eq!(status, StatusCode::OK);
        body["session_id"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
async fn test_health_and_index() {
    let server = TestServer::start(ScriptedChatClient::new()).await;

    let (status, body) = server.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));

    let page = server
        .http
        .get(format!("{}/", server.base))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("Clear Chat"));
}

#[tokio::test]
async fn test_chat_turn_with_tool_call() {
    let client = ScriptedChatClient::new()
        .with_reply(ChatMessage::assistant("").with_tool_calls(vec![ToolCall::new(
            "call_1",
            "cancel_pending_order",
            r##"{"order_id":"#W1000000"}"##,
        )]))
        .with_reply(ChatMessage::assistant("Cancelled."));
    let server = TestServer::start(client).await;
    let session_id = server.new_session().await;

    let (status, outcome) = server
        .post(
            "/api/chat",
            json!({"session_id": session_id, "message": "cancel #W1000000"}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["reply"], "Cancelled.");
    assert_eq!(outcome["tool_invocations"][0]["name"], "cancel_pending_order");
    assert_eq!(outcome["tool_invocations"][0]["result"]["status"], "cancelled");

    let (_, history) = server
        .get(&format!("/api/history?session_id={}", session_id))
        .await;
    assert_eq!(history["messages"].as_array().unwrap().len(), 4);

    let (_, data) = server.get(&format!("/api/data?session_id={}", session_id)).await;
    let order = data["orders"]
        .as_array()
        .unwrap()
        .iter()
        .find(|o| o["order_id"] == "#W1000000")
        .unwrap()
        .clone();
    assert_eq!(order["status"], "cancelled");
}

#[tokio::test]
async fn test_sessions_do_not_share_database() {
    let client = ScriptedChatClient::new()
        .with_reply(ChatMessage::assistant("").with_tool_calls(vec![ToolCall::new(
            "call_1",
            "cancel_pending_order",
            r##"{"order_id":"#W1000000"}"##,
        )]))
        .with_reply(ChatMessage::assistant("Cancelled."));
    let server = TestServer::start(client).await;
    let first = server.new_session().await;
    let second = server.new_session().await;
    assert_ne!(first, second);

    server
        .post("/api/chat", json!({"session_id": first, "message": "cancel it"}))
        .await;

    let (_, data) = server.get(&format!("/api/data?session_id={}", second)).await;
    let order = data["orders"]
        .as_array()
        .unwrap()
        .iter()
        .find(|o| o["order_id"] == "#W1000000")
        .unwrap()
        .clone();
    assert_eq!(order["status"], "pending");
}

#[tokio::test]
async fn test_unknown_session_is_404() {
    let server = TestServer::start(ScriptedChatClient::new()).await;

    let (status, body) = server
        .post("/api/chat", json!({"session_id": "nope", "message": "hi"}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("nope"));

    let (status, _) = server.get("/api/history?session_id=nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_endpoint_failure_is_502() {
    let server = TestServer::start(ScriptedChatClient::new().with_error("connection refused")).await;
    let session_id = server.new_session().await;

    let (status, body) = server
        .post("/api/chat", json!({"session_id": session_id, "message": "hi"}))
        .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].as_str().unwrap().contains("connection refused"));

    // The user turn stays in the history.
    let (_, history) = server
        .get(&format!("/api/history?session_id={}", session_id))
        .await;
    assert_eq!(history["messages"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_tool_toggles() {
    let server = TestServer::start(ScriptedChatClient::new()).await;
    let session_id = server.new_session().await;

    let (_, tools) = server.get(&format!("/api/tools?session_id={}", session_id)).await;
    let tools = tools["tools"].as_array().unwrap().clone();
    assert_eq!(tools.len(), 11);
    assert!(tools.iter().all(|t| t["enabled"] == true));

    let (status, body) = server
        .post(
            "/api/tools",
            json!({"session_id": session_id, "enabled": ["calculate"]}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["enabled"], json!(["calculate"]));

    let (_, tools) = server.get(&format!("/api/tools?session_id={}", session_id)).await;
    let enabled: Vec<&str> = tools["tools"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|t| t["enabled"] == true)
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    assert_eq!(enabled, vec!["calculate"]);

    let (status, _) = server
        .post(
            "/api/tools",
            json!({"session_id": session_id, "enabled": ["launch_rocket"]}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_database_management() {
    let server = TestServer::start(ScriptedChatClient::new()).await;
    let session_id = server.new_session().await;

    let (status, user) = server
        .post(
            "/api/data/users",
            json!({"session_id": session_id, "user_id": "zoe_kim", "zip": "12345"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["email"], "zoe_kim@example.com");
    assert_eq!(user["first_name"], "Unknown");
    assert_eq!(user["address"]["zip"], "12345");

    let (status, order) = server
        .post(
            "/api/data/orders",
            json!({"session_id": session_id, "order_id": "#W9999999", "user_id": "zoe_kim", "status": "delivered"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["status"], "delivered");

    let (status, _) = server
        .post(
            "/api/data/products",
            json!({"session_id": session_id, "product_id": "PROD100", "name": "Standing Desk"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, data) = server.get(&format!("/api/data?session_id={}", session_id)).await;
    assert_eq!(data["stats"], json!({"users": 13, "orders": 13, "products": 13}));

    let (status, _) = server
        .post(
            "/api/data/orders",
            json!({"session_id": session_id, "order_id": "#W1", "status": "lost"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = server
        .post("/api/data/users", json!({"session_id": session_id, "user_id": " "}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_reset_and_connection() {
    let client = ScriptedChatClient::new().with_reply(ChatMessage::assistant("Hello"));
    let server = TestServer::start(client).await;
    let session_id = server.new_session().await;

    server
        .post("/api/chat", json!({"session_id": session_id, "message": "hi"}))
        .await;
    let (status, _) = server.post("/api/reset", json!({"session_id": session_id})).await;
    assert_eq!(status, StatusCode::OK);

    let (_, history) = server
        .get(&format!("/api/history?session_id={}", session_id))
        .await;
    assert!(history["messages"].as_array().unwrap().is_empty());

    let (status, connection) = server.get("/api/connection").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(connection["ok"], true);
    assert_eq!(connection["model"], "scripted");
}
