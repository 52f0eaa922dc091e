use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::info;
use uuid::Uuid;

/// Cloneable handle for publishing domain events onto the in-process channel.
#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

// Define the various events that can occur in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    // Catalog events
    ProductCreated { sku: String },
    ProductUpdated { sku: String },
    ProductDeleted { sku: String },
    StockAdjusted { sku: String, delta: i32 },

    // Receiving events
    InboundRecorded {
        sku: String,
        quantity: i32,
        log_id: Uuid,
    },

    // Fulfillment events
    OrderCompleted {
        order_id: Uuid,
        log_id: Uuid,
    },
}

/// Drains the event channel for the lifetime of the process.
///
/// The panel has no downstream consumers of its own; events surface in the
/// structured log so external tooling can tail them.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    while let Some(event) = rx.recv().await {
        match &event {
            Event::StockAdjusted { sku, delta } => {
                info!(sku = %sku, delta = %delta, "stock adjusted");
            }
            Event::InboundRecorded { sku, quantity, log_id } => {
                info!(sku = %sku, quantity = %quantity, log_id = %log_id, "inbound recorded");
            }
            Event::OrderCompleted { order_id, log_id } => {
                info!(order_id = %order_id, log_id = %log_id, "order completed");
            }
            other => info!(event = ?other, "event"),
        }
    }
}
