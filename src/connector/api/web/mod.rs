//! Browser front-end: a single-page chat UI over a small JSON API.
//!
//! Routes:
//! - `GET  /`                       chat page
//! - `GET  /health`
//! - `POST /api/session`            new session (own history, own database copy)
//! - `POST /api/chat`               one conversation turn
//! - `GET  /api/history`
//! - `GET  /api/tools`, `POST /api/tools`
//! - `GET  /api/data`, `POST /api/data/{users,orders,products}`
//! - `POST /api/reset`
//! - `GET  /api/connection`         connection test

mod error;
mod handlers;
mod state;

use std::sync::Arc;

use axum::routing::{get, post};
use tracing::info;

pub use error::ApiError;
pub use state::WebState;

use super::Container;

pub fn build_router(state: Arc<WebState>) -> axum::Router {
    axum::Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/api/session", post(handlers::create_session))
        .route("/api/chat", post(handlers::chat))
        .route("/api/history", get(handlers::history))
        .route("/api/tools", get(handlers::list_tools).post(handlers::set_tools))
        .route("/api/data", get(handlers::data))
        .route("/api/data/users", post(handlers::add_user))
        .route("/api/data/orders", post(handlers::add_order))
        .route("/api/data/products", post(handlers::add_product))
        .route("/api/reset", post(handlers::reset))
        .route("/api/connection", get(handlers::connection))
        .with_state(state)
}

/// Binds `addr` and serves until the process is stopped.
pub async fn serve(container: Container, addr: &str) -> anyhow::Result<()> {
    let app = build_router(Arc::new(WebState::new(container)));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Chat front-end listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
