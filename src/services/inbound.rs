use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    entities::{product, transaction_log},
    errors::ServiceError,
    events::{Event, EventSender},
    services::{catalog::CatalogService, logs::LogService},
    sku,
};

/// Minimum typed length before the live SKU lookup fires. Shorter
/// fragments match too broadly to be useful at the receiving desk.
pub const MIN_LOOKUP_LEN: usize = 4;

/// Outcome of a registered receipt, echoed back to the receiving form.
#[derive(Debug, Serialize)]
pub struct InboundReceipt {
    pub sku: String,
    pub product_name: String,
    pub quantity: i32,
    pub new_stock: i32,
    pub log_id: Uuid,
}

/// Receiving workflow: live SKU lookup plus registration of stock
/// increments.
#[derive(Clone)]
pub struct InboundService {
    catalog: CatalogService,
    logs: LogService,
    event_sender: EventSender,
}

impl InboundService {
    /// Creates a new inbound service instance
    pub fn new(catalog: CatalogService, logs: LogService, event_sender: EventSender) -> Self {
        Self {
            catalog,
            logs,
            event_sender,
        }
    }

    /// Live lookup for the receiving form. Returns nothing until the typed
    /// fragment reaches [`MIN_LOOKUP_LEN`]; then prefix-matches the
    /// normalized fragment against the catalog.
    #[instrument(skip(self))]
    pub async fn lookup(&self, partial_sku: &str) -> Result<Option<product::Model>, ServiceError> {
        let key = sku::normalize(partial_sku);
        if key.chars().count() < MIN_LOOKUP_LEN {
            return Ok(None);
        }

        self.catalog.find_by_sku_prefix(&key).await
    }

    /// Registers a receipt: exactly one atomic stock increment plus one
    /// INBOUND log entry.
    #[instrument(skip(self))]
    pub async fn register(
        &self,
        sku_input: &str,
        quantity: i32,
        operator: &str,
    ) -> Result<InboundReceipt, ServiceError> {
        if quantity <= 0 {
            return Err(ServiceError::ValidationError(
                "Inbound quantity must be positive".to_string(),
            ));
        }

        let key = sku::normalize(sku_input);
        let product = self
            .catalog
            .get(&key)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product with SKU {} not found", key)))?;

        self.catalog.adjust_stock(&key, quantity).await?;
        let entry = self.logs.append_inbound(&key, quantity, operator).await?;

        self.event_sender
            .send(Event::InboundRecorded {
                sku: key.clone(),
                quantity,
                log_id: entry.id,
            })
            .await
            .map_err(ServiceError::EventError)?;

        // Re-read for the refreshed stock figure shown in the form.
        let new_stock = self
            .catalog
            .get(&key)
            .await?
            .map(|p| p.stock)
            .unwrap_or(product.stock + quantity);

        info!(sku = %key, quantity, "Inbound registered");

        Ok(InboundReceipt {
            sku: key,
            product_name: product.name,
            quantity,
            new_stock,
            log_id: entry.id,
        })
    }

    /// Receiving history, newest first.
    pub async fn history(&self) -> Result<Vec<transaction_log::Model>, ServiceError> {
        self.logs.inbound_history().await
    }
}
