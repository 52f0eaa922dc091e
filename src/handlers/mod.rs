pub mod inbound;
pub mod logs;
pub mod outbound;
pub mod products;

use std::sync::Arc;

use crate::{
    db::DbPool,
    events::EventSender,
    services::{
        catalog::CatalogService, fulfillment::FulfillmentService, inbound::InboundService,
        logs::LogService, orders::OrderService,
    },
};

/// Shared service bundle injected into every handler.
#[derive(Clone)]
pub struct AppServices {
    pub catalog: CatalogService,
    pub orders: OrderService,
    pub logs: LogService,
    pub inbound: InboundService,
    pub fulfillment: FulfillmentService,
}

impl AppServices {
    pub fn new(db: Arc<DbPool>, event_sender: EventSender) -> Self {
        let catalog = CatalogService::new(db.clone(), event_sender.clone());
        let orders = OrderService::new(db.clone());
        let logs = LogService::new(db);
        let inbound = InboundService::new(catalog.clone(), logs.clone(), event_sender.clone());
        let fulfillment = FulfillmentService::new(
            event_sender,
            catalog.clone(),
            orders.clone(),
            logs.clone(),
        );

        Self {
            catalog,
            orders,
            logs,
            inbound,
            fulfillment,
        }
    }
}
