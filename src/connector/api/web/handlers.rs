use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::application::TurnOutcome;
use crate::domain::{Address, DomainError, Order, OrderStatus, Product, User};

use super::{ApiError, WebState};

const INDEX_HTML: &str = include_str!("index.html");

/// Records per collection shown in the sidebar.
const SAMPLE_LIMIT: usize = 10;

type ApiResult<T> = Result<Json<T>, ApiError>;

#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    pub session_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub session_id: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ToolsRequest {
    pub session_id: String,
    #[serde(default)]
    pub enabled: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct NewUserRequest {
    pub session_id: String,
    pub user_id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
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
}

#[derive(Debug, Deserialize)]
pub struct NewOrderRequest {
    pub session_id: String,
    pub order_id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default = "default_order_status")]
    pub status: String,
}

fn default_order_status() -> String {
    OrderStatus::Pending.as_str().to_string()
}

#[derive(Debug, Deserialize)]
pub struct NewProductRequest {
    pub session_id: String,
    pub product_id: String,
    #[serde(default)]
    pub name: String,
}

pub async fn index() -> impl IntoResponse {
    Html(INDEX_HTML)
}

pub async fn health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

pub async fn create_session(State(state): State<Arc<WebState>>) -> ApiResult<Value> {
    let session_id = state.create_session().await;
    Ok(Json(json!({ "session_id": session_id })))
}

pub async fn chat(
    State(state): State<Arc<WebState>>,
    Json(req): Json<ChatRequest>,
) -> ApiResult<TurnOutcome> {
    if req.message.trim().is_empty() {
        return Err(DomainError::invalid_input("Message must not be empty").into());
    }

    let session = state.session(&req.session_id).await?;
    let mut session = session.lock().await;
    debug!("Turn in session {}", req.session_id);

    let outcome = session.send(&req.message).await?;
    Ok(Json(outcome))
}

pub async fn history(
    State(state): State<Arc<WebState>>,
    Query(query): Query<SessionQuery>,
) -> ApiResult<Value> {
    let session = state.session(&query.session_id).await?;
    let session = session.lock().await;
    Ok(Json(json!({ "messages": session.conversation().messages() })))
}

pub async fn list_tools(
    State(state): State<Arc<WebState>>,
    Query(query): Query<SessionQuery>,
) -> ApiResult<Value> {
    let session = state.session(&query.session_id).await?;
    let session = session.lock().await;

    let tools: Vec<Value> = session
        .catalog()
        .tools()
        .iter()
        .map(|tool| {
            json!({
                "name": tool.name(),
                "description": tool.description(),
                "parameters": tool.parameters(),
                "enabled": session.is_enabled(tool.name()),
            })
        })
        .collect();

    Ok(Json(json!({ "tools": tools })))
}

pub async fn set_tools(
    State(state): State<Arc<WebState>>,
    Json(req): Json<ToolsRequest>,
) -> ApiResult<Value> {
    let session = state.session(&req.session_id).await?;
    let mut session = session.lock().await;
    session.set_enabled_tools(req.enabled)?;
    Ok(Json(json!({ "enabled": session.enabled_tools() })))
}

pub async fn data(
    State(state): State<Arc<WebState>>,
    Query(query): Query<SessionQuery>,
) -> ApiResult<Value> {
    let session = state.session(&query.session_id).await?;
    let repository = session.lock().await.repository().clone();

    let stats = repository.stats().await?;
    let users: Vec<User> = repository.list_users().await?.into_iter().take(SAMPLE_LIMIT).collect();
    let orders: Vec<Order> = repository.list_orders().await?.into_iter().take(SAMPLE_LIMIT).collect();
    let products: Vec<Product> = repository
        .list_products()
        .await?
        .into_iter()
        .take(SAMPLE_LIMIT)
        .collect();

    Ok(Json(json!({
        "stats": stats,
        "users": users,
        "orders": orders,
        "products": products,
    })))
}

pub async fn add_user(
    State(state): State<Arc<WebState>>,
    Json(req): Json<NewUserRequest>,
) -> ApiResult<User> {
    let session = state.session(&req.session_id).await?;
    let repository = session.lock().await.repository().clone();

    let user = User::new(req.user_id.trim())
        .with_email(req.email)
        .with_name(req.first_name, req.last_name)
        .with_address(Address {
            address1: req.address1,
            address2: req.address2,
            city: req.city,
            state: req.state,
            zip: req.zip,
            country: "USA".to_string(),
        });
    repository.save_user(&user).await?;
    Ok(Json(user))
}

pub async fn add_order(
    State(state): State<Arc<WebState>>,
    Json(req): Json<NewOrderRequest>,
) -> ApiResult<Order> {
    let session = state.session(&req.session_id).await?;
    let repository = session.lock().await.repository().clone();

    let status: OrderStatus = req.status.parse()?;
    let order = Order::new(req.order_id.trim(), req.user_id.trim(), status);
    repository.save_order(&order).await?;
    Ok(Json(order))
}

pub async fn add_product(
    State(state): State<Arc<WebState>>,
    Json(req): Json<NewProductRequest>,
) -> ApiResult<Product> {
    let session = state.session(&req.session_id).await?;
    let repository = session.lock().await.repository().clone();

    let product = Product::new(req.product_id.trim(), req.name);
    repository.save_product(&product).await?;
    Ok(Json(product))
}

pub async fn reset(
    State(state): State<Arc<WebState>>,
    Json(req): Json<SessionQuery>,
) -> ApiResult<Value> {
    let session = state.session(&req.session_id).await?;
    session.lock().await.reset();
    Ok(Json(json!({ "status": "ok" })))
}

pub async fn connection(State(state): State<Arc<WebState>>) -> impl IntoResponse {
    let client = state.container().client();
    let (ok, message) = match client.test_connection().await {
        Ok(status) => (true, status),
        Err(e) => (false, e.to_string()),
    };

    Json(json!({
        "ok": ok,
        "message": message,
        "base_url": client.base_url(),
        "model": client.model(),
    }))
}
