//! Seeds the local database with a demo catalog and two READY orders so
//! the panel has something to work against.

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use tokio::sync::mpsc;
use tracing::info;
use uuid::Uuid;

use stockroom_api as api;
use stockroom_api::entities::order::{self, DeliveryType, OrderLine, OrderLines, OrderStatus};
use stockroom_api::errors::ServiceError;
use stockroom_api::events::EventSender;
use stockroom_api::services::catalog::{CatalogService, CreateProductRequest};

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = api::config::load_config()?;
    api::config::init_tracing(&cfg.log_level, cfg.log_json);

    let db = Arc::new(api::db::establish_connection_from_app_config(&cfg).await?);
    api::db::run_migrations(&db).await?;

    let (event_tx, mut event_rx) = mpsc::channel(64);
    tokio::spawn(async move { while event_rx.recv().await.is_some() {} });
    let catalog = CatalogService::new(db.clone(), EventSender::new(event_tx));

    let products = [
        ("NX-1001", "Premium Leather Desk Mat", "Desk Accessories", 142),
        ("NX-1002", "Aluminum Laptop Stand", "Stands", 8),
        ("NX-2001", "Mechanical Keyboard (Red Switch)", "Peripherals", 55),
        ("NX-2002", "Wireless Ergonomic Mouse", "Peripherals", 32),
        ("NX-3001", "USB-C Hub 7-in-1", "Accessories", 3),
        ("NX-3002", "4K HDMI Cable (2m)", "Cables", 210),
    ];

    for (sku, name, category, stock) in products {
        let request = CreateProductRequest {
            sku: sku.to_string(),
            name: name.to_string(),
            category: category.to_string(),
            stock,
            link: None,
            image: None,
        };
        match catalog.create(request).await {
            Ok(_) => info!(sku, "seeded product"),
            Err(ServiceError::DuplicateSku(_)) => info!(sku, "product already present"),
            Err(e) => return Err(e.into()),
        }
    }

    seed_order(
        &db,
        "ORD-2023-8821",
        "TRK998877",
        DeliveryType::Post,
        "Alice Kim",
        vec![
            ("NX-1001", "Premium Leather Desk Mat", 1),
            ("NX-2002", "Wireless Ergonomic Mouse", 1),
        ],
    )
    .await?;

    seed_order(
        &db,
        "ORD-2023-8822",
        "TRK112233",
        DeliveryType::Pickup,
        "Min-su Park",
        vec![
            ("NX-3001", "USB-C Hub 7-in-1", 2),
            ("NX-3002", "4K HDMI Cable (2m)", 5),
            ("NX-1002", "Aluminum Laptop Stand", 1),
        ],
    )
    .await?;

    info!("seed complete");
    Ok(())
}

async fn seed_order(
    db: &DatabaseConnection,
    number: &str,
    tracking: &str,
    delivery: DeliveryType,
    customer: &str,
    lines: Vec<(&str, &str, i32)>,
) -> Result<()> {
    let existing = order::Entity::find()
        .filter(order::Column::OrderNumber.eq(number))
        .one(db)
        .await?;
    if existing.is_some() {
        info!(number, "order already present");
        return Ok(());
    }

    let now = Utc::now();
    let model = order::ActiveModel {
        id: Set(Uuid::new_v4()),
        order_number: Set(number.to_string()),
        tracking: Set(tracking.to_string()),
        delivery_type: Set(delivery.as_str().to_string()),
        status: Set(OrderStatus::Ready.as_str().to_string()),
        name: Set(customer.to_string()),
        receiver: Set(Some(customer.to_string())),
        phone: Set(None),
        address: Set(None),
        items: Set(OrderLines(
            lines
                .into_iter()
                .map(|(line_sku, line_name, qty)| OrderLine {
                    sku: Some(line_sku.to_string()),
                    name: Some(line_name.to_string()),
                    qty,
                    ..Default::default()
                })
                .collect(),
        )),
        created_at: Set(now),
        updated_at: Set(Some(now)),
    };
    model.insert(db).await?;

    info!(number, "seeded order");
    Ok(())
}
