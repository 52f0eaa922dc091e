//! Stockroom API Library
//!
//! Backend for a warehouse inventory administration panel: catalog
//! management, inbound receiving, scan-to-complete outbound fulfillment,
//! and a cursor-paginated transaction log with faceted search.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod migrator;
pub mod services;
pub mod sku;

use axum::{response::Json, routing::get, Router};
use dashmap::DashMap;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use services::fulfillment::PickSession;

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub services: handlers::AppServices,
    /// Active pick sessions, keyed by session id. Working state lives here
    /// only; nothing touches the database until finalize.
    pub sessions: Arc<DashMap<Uuid, PickSession>>,
}

// Common response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
        }
    }
}

/// Full v1 API surface.
pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .nest("/products", handlers::products::routes())
        .nest("/inbound", handlers::inbound::routes())
        .nest("/outbound", handlers::outbound::routes())
        .nest("/logs", handlers::logs::routes())
}

/// Liveness probe.
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Router helper used by `main` and the integration tests.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "stockroom-api up" }))
        .route("/health", get(health))
        .nest("/api/v1", api_v1_routes())
        .with_state(state)
}
