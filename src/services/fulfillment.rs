use serde::Serialize;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    entities::order::{self, DeliveryType, OrderStatus},
    entities::transaction_log::LogItem,
    errors::ServiceError,
    events::{Event, EventSender},
    services::{
        catalog::CatalogService,
        logs::{LogService, OutboundRecord},
        orders::OrderService,
    },
    sku,
};

/// Fixed page size of the pending-order list.
pub const PENDING_PAGE_SIZE: usize = 10;

/// How many page numbers the pagination strip shows around the current
/// page.
pub const PAGE_WINDOW: usize = 5;

/// Lifecycle of a pick session. IDLE is the absence of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    OrderLoaded,
    Complete,
}

/// One line of the working copy: how many units the order requires versus
/// how many the operator has scanned so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkingItem {
    pub sku: String,
    pub name: String,
    pub required_qty: i32,
    pub scanned_qty: i32,
}

impl WorkingItem {
    pub fn is_fulfilled(&self) -> bool {
        self.scanned_qty == self.required_qty
    }

    pub fn is_over_fulfilled(&self) -> bool {
        self.scanned_qty > self.required_qty
    }
}

/// Ephemeral working copy of one order's lines. Lives in process memory
/// only; nothing is persisted until finalize.
#[derive(Debug, Clone, Serialize)]
pub struct PickSession {
    pub order_id: Uuid,
    pub order_number: String,
    pub tracking: String,
    pub delivery_type: DeliveryType,
    pub customer_name: String,
    pub items: Vec<WorkingItem>,
}

impl PickSession {
    fn from_order(order: &order::Model, delivery: DeliveryType) -> Self {
        // Lines whose SKU cannot be resolved from any upstream field are
        // dropped; there is nothing scannable to match them against.
        let items = order
            .items
            .0
            .iter()
            .filter_map(|line| {
                let item_sku = line.resolve_sku()?;
                Some(WorkingItem {
                    name: line
                        .name
                        .clone()
                        .filter(|n| !n.trim().is_empty())
                        .unwrap_or_else(|| item_sku.clone()),
                    sku: item_sku,
                    required_qty: line.qty,
                    scanned_qty: 0,
                })
            })
            .collect();

        Self {
            order_id: order.id,
            order_number: order.order_number.clone(),
            tracking: order.tracking.clone(),
            delivery_type: delivery,
            customer_name: order.name.clone(),
            items,
        }
    }

    pub fn state(&self) -> SessionState {
        if self.is_complete() {
            SessionState::Complete
        } else {
            SessionState::OrderLoaded
        }
    }

    /// Registers one scanned unit against the matching line. An unknown SKU
    /// is a transient error: the working state is left untouched and the
    /// consuming UI dismisses the message on its own.
    pub fn record_scan(&mut self, sku_input: &str) -> Result<(), ServiceError> {
        let key = sku::normalize(sku_input);
        match self.items.iter_mut().find(|i| i.sku == key) {
            Some(item) => {
                item.scanned_qty = item.scanned_qty.saturating_add(1);
                Ok(())
            }
            None => Err(ServiceError::ItemNotInOrder(key)),
        }
    }

    /// Nudges a line's scanned count. Clamped at zero; over-scan is allowed
    /// and flagged, not blocked. Unknown SKUs are ignored, matching the
    /// panel's plus/minus controls.
    pub fn adjust_quantity(&mut self, sku_input: &str, delta: i32) {
        let key = sku::normalize(sku_input);
        if let Some(item) = self.items.iter_mut().find(|i| i.sku == key) {
            item.scanned_qty = item.scanned_qty.saturating_add(delta).max(0);
        }
    }

    /// Direct override of a line's scanned count, clamped at zero.
    pub fn set_quantity(&mut self, sku_input: &str, value: i32) {
        let key = sku::normalize(sku_input);
        if let Some(item) = self.items.iter_mut().find(|i| i.sku == key) {
            item.scanned_qty = value.max(0);
        }
    }

    /// Complete iff every line's scanned count strictly equals its required
    /// count. Both under- and over-scan block completion.
    pub fn is_complete(&self) -> bool {
        self.items.iter().all(|i| i.scanned_qty == i.required_qty)
    }

    pub fn total_required(&self) -> i32 {
        self.items.iter().map(|i| i.required_qty).sum()
    }

    pub fn total_scanned(&self) -> i32 {
        self.items.iter().map(|i| i.scanned_qty).sum()
    }

    pub fn pending(&self) -> i32 {
        (self.total_required() - self.total_scanned()).max(0)
    }

    pub fn progress_percent(&self) -> f64 {
        let required = self.total_required();
        if required <= 0 {
            return 0.0;
        }
        (f64::from(self.total_scanned()) / f64::from(required) * 100.0).min(100.0)
    }
}

/// Drives the outbound scan-to-complete workflow: loading an order into a
/// working session and finalizing the finished session back into the
/// stores.
#[derive(Clone)]
pub struct FulfillmentService {
    event_sender: EventSender,
    catalog: CatalogService,
    orders: OrderService,
    logs: LogService,
}

impl FulfillmentService {
    /// Creates a new fulfillment service instance
    pub fn new(
        event_sender: EventSender,
        catalog: CatalogService,
        orders: OrderService,
        logs: LogService,
    ) -> Self {
        Self {
            event_sender,
            catalog,
            orders,
            logs,
        }
    }

    /// Builds a working session for the single order matching the scanned
    /// tracking code and delivery type. A COMPLETED match is reported
    /// distinctly from no match at all.
    #[instrument(skip(self))]
    pub async fn load_order_by_tracking(
        &self,
        tracking: &str,
        delivery: DeliveryType,
    ) -> Result<PickSession, ServiceError> {
        let order = self
            .orders
            .find_by_tracking(tracking, delivery)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "No order found for tracking number {}",
                    tracking.trim()
                ))
            })?;

        self.session_from(order, delivery)
    }

    /// Builds a working session for an order picked from the pending list
    /// (the VALEX/PICKUP flows have no tracking-scan entry point).
    #[instrument(skip(self))]
    pub async fn load_order(&self, order_id: Uuid) -> Result<PickSession, ServiceError> {
        let order = self
            .orders
            .get(order_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))?;

        let delivery = order.delivery().ok_or_else(|| {
            ServiceError::InternalError(format!(
                "Order {} has unrecognized delivery type {}",
                order_id, order.delivery_type
            ))
        })?;

        self.session_from(order, delivery)
    }

    fn session_from(
        &self,
        order: order::Model,
        delivery: DeliveryType,
    ) -> Result<PickSession, ServiceError> {
        if order.status() == Some(OrderStatus::Completed) {
            return Err(ServiceError::AlreadyCompleted(order.order_number));
        }

        Ok(PickSession::from_order(&order, delivery))
    }

    /// All READY orders for list-driven flows.
    #[instrument(skip(self))]
    pub async fn pending_orders(
        &self,
        delivery: DeliveryType,
    ) -> Result<Vec<order::Model>, ServiceError> {
        self.orders.list_ready(delivery).await
    }

    /// Finalizes a completed session: per-line stock decrements by the
    /// actually-scanned quantity, then one aggregated log entry, then the
    /// READY→COMPLETED flip. The writes are sequential; a failure after the
    /// first decrement is reported as `PartialFailure` and nothing is
    /// rolled back.
    #[instrument(skip(self, session), fields(order_id = %session.order_id))]
    pub async fn finalize(
        &self,
        session: &PickSession,
        operator: &str,
    ) -> Result<Uuid, ServiceError> {
        if !session.is_complete() {
            return Err(ServiceError::InvalidOperation(
                "Cannot finalize: scanned quantities do not match the order".to_string(),
            ));
        }

        // Stock leaves the warehouse by what was actually scanned, never by
        // what the order required.
        for (idx, item) in session.items.iter().enumerate() {
            if let Err(e) = self.catalog.adjust_stock(&item.sku, -item.scanned_qty).await {
                error!(sku = %item.sku, error = %e, "Stock decrement failed during finalize");
                if idx == 0 {
                    return Err(e);
                }
                return Err(ServiceError::PartialFailure(format!(
                    "stock decremented for {} of {} lines before failing on {}; applied decrements are not rolled back",
                    idx,
                    session.items.len(),
                    item.sku
                )));
            }
        }

        // Product names and links are resolved now, not at load time.
        let mut lines = Vec::with_capacity(session.items.len());
        for item in &session.items {
            let product = self
                .catalog
                .get(&item.sku)
                .await
                .map_err(|e| self.partial("product lookup", &e))?;
            let (name, link) = match product {
                Some(p) => (p.name, p.link),
                None => (String::new(), None),
            };
            lines.push(LogItem {
                sku: item.sku.clone(),
                name,
                quantity: item.scanned_qty,
                link,
            });
        }

        let record = OutboundRecord {
            delivery_type: session.delivery_type,
            order_number: session.order_number.clone(),
            tracking_number: session.tracking.clone(),
            customer_name: session.customer_name.clone(),
            operator: operator.to_string(),
            items: lines,
        };

        let entry = self
            .logs
            .append_outbound(record)
            .await
            .map_err(|e| self.partial("log append", &e))?;

        self.orders
            .complete(session.order_id)
            .await
            .map_err(|e| self.partial("order status update", &e))?;

        if let Err(e) = self
            .event_sender
            .send(Event::OrderCompleted {
                order_id: session.order_id,
                log_id: entry.id,
            })
            .await
        {
            warn!(error = %e, order_id = %session.order_id, "Failed to send order completed event");
        }

        info!(order_id = %session.order_id, log_id = %entry.id, "Outbound finalized");

        Ok(entry.id)
    }

    fn partial(&self, step: &str, cause: &ServiceError) -> ServiceError {
        error!(step, error = %cause, "Finalize failed after stock decrements were applied");
        ServiceError::PartialFailure(format!(
            "{} failed after stock decrements were applied ({}); decrements are not rolled back",
            step, cause
        ))
    }
}

/// Keyword filter over the pending list: matches orderer name, receiver,
/// order number, or phone, case-insensitively. Applied client-side to the
/// already-fetched list.
pub fn filter_pending<'a>(orders: &'a [order::Model], keyword: &str) -> Vec<&'a order::Model> {
    let needle = keyword.trim().to_lowercase();
    if needle.is_empty() {
        return orders.iter().collect();
    }

    orders
        .iter()
        .filter(|o| {
            o.name.to_lowercase().contains(&needle)
                || o.receiver
                    .as_deref()
                    .is_some_and(|r| r.to_lowercase().contains(&needle))
                || o.order_number.to_lowercase().contains(&needle)
                || o.phone.as_deref().is_some_and(|p| p.contains(&needle))
        })
        .collect()
}

/// Fixed-size page slice of an already-filtered list. Pages are 1-based; an
/// out-of-range page is empty.
pub fn page_slice<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    let start = page.saturating_sub(1).saturating_mul(page_size);
    if start >= items.len() {
        return &[];
    }
    let end = (start + page_size).min(items.len());
    &items[start..end]
}

/// One mark of the pagination strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "page")]
pub enum PageMark {
    Page(usize),
    Gap,
}

/// Pagination strip marks: a limited run of page numbers around the current
/// page, with an ellipsis on each side whose run does not reach the
/// corresponding end.
pub fn page_window(current: usize, total_pages: usize, window: usize) -> Vec<PageMark> {
    if total_pages == 0 {
        return Vec::new();
    }
    let window = window.max(1);
    let current = current.clamp(1, total_pages);

    let mut start = current.saturating_sub(window / 2).max(1);
    let end = (start + window - 1).min(total_pages);
    start = end.saturating_sub(window - 1).max(1);

    let mut marks = Vec::with_capacity(window + 2);
    if start > 1 {
        marks.push(PageMark::Gap);
    }
    for page in start..=end {
        marks.push(PageMark::Page(page));
    }
    if end < total_pages {
        marks.push(PageMark::Gap);
    }
    marks
}
