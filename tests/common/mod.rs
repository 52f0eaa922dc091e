#![allow(dead_code)]

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use tokio::sync::mpsc;
use uuid::Uuid;

use dashmap::DashMap;
use stockroom_api::{
    config::AppConfig,
    db::{self, DbConfig},
    entities::order::{self, DeliveryType, OrderLine, OrderLines, OrderStatus},
    events::EventSender,
    handlers::AppServices,
    services::catalog::CreateProductRequest,
    AppState,
};

/// Spins the service bundle up over a fresh in-memory SQLite database.
/// SQLite keeps one memory database per connection, so the pool is pinned
/// to a single connection.
pub async fn setup() -> (Arc<DatabaseConnection>, AppServices) {
    let config = DbConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        min_connections: 1,
        ..Default::default()
    };

    let db = Arc::new(
        db::establish_connection_with_config(&config)
            .await
            .expect("Failed to create DB pool"),
    );
    db::run_migrations(db.as_ref())
        .await
        .expect("Failed to run migrations");

    // Drain events so senders never block on a full channel.
    let (tx, mut rx) = mpsc::channel(100);
    tokio::spawn(async move { while rx.recv().await.is_some() {} });
    let event_sender = EventSender::new(tx);

    let services = AppServices::new(db.clone(), event_sender);
    (db, services)
}

/// Full application state over a fresh in-memory database, for tests that
/// drive the HTTP surface.
pub async fn setup_app() -> AppState {
    let (db, services) = setup().await;

    let (tx, mut rx) = mpsc::channel(100);
    tokio::spawn(async move { while rx.recv().await.is_some() {} });

    AppState {
        db,
        config: test_config(),
        event_sender: EventSender::new(tx),
        services,
        sessions: Arc::new(DashMap::new()),
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
        environment: "test".to_string(),
        log_level: "info".to_string(),
        log_json: false,
        auto_migrate: true,
        db_max_connections: 1,
        db_min_connections: 1,
    }
}

pub fn product(sku: &str, name: &str, stock: i32) -> CreateProductRequest {
    CreateProductRequest {
        sku: sku.to_string(),
        name: name.to_string(),
        category: "Test".to_string(),
        stock,
        link: None,
        image: None,
    }
}

pub fn line(sku: &str, name: &str, qty: i32) -> OrderLine {
    OrderLine {
        sku: Some(sku.to_string()),
        name: Some(name.to_string()),
        qty,
        ..Default::default()
    }
}

pub async fn insert_order(
    db: &DatabaseConnection,
    order_number: &str,
    tracking: &str,
    delivery: DeliveryType,
    status: OrderStatus,
    customer: &str,
    lines: Vec<OrderLine>,
) -> order::Model {
    let now = Utc::now();
    let model = order::ActiveModel {
        id: Set(Uuid::new_v4()),
        order_number: Set(order_number.to_string()),
        tracking: Set(tracking.to_string()),
        delivery_type: Set(delivery.as_str().to_string()),
        status: Set(status.as_str().to_string()),
        name: Set(customer.to_string()),
        receiver: Set(Some(customer.to_string())),
        phone: Set(Some("010-0000-0000".to_string())),
        address: Set(None),
        items: Set(OrderLines(lines)),
        created_at: Set(now),
        updated_at: Set(Some(now)),
    };

    model.insert(db).await.expect("Failed to insert order")
}
