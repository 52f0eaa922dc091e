use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    Select, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{error, instrument};
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::order::DeliveryType,
    entities::transaction_log::{
        self, Column as LogColumn, Entity as LogEntity, LogItem, LogItems,
    },
    errors::ServiceError,
    sku,
};

/// Default viewer page size.
pub const DEFAULT_PAGE_SIZE: u64 = 50;

/// Search dimension over the outbound log. Each facet maps to an equality
/// or whole-token containment filter on a denormalized column; there is no
/// substring or fuzzy matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SearchFacet {
    OrderId,
    TrackingNumber,
    Sku,
    CustomerName,
    ProductNameToken,
}

/// Opaque pagination cursor: position of the last returned row under
/// `(created_at, id)` descending order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogCursor {
    pub created_at: DateTime<Utc>,
    pub id: Uuid,
}

impl LogCursor {
    fn from_entry(entry: &transaction_log::Model) -> Self {
        Self {
            created_at: entry.created_at,
            id: entry.id,
        }
    }

    /// Encodes to the wire form handed to clients.
    pub fn encode(&self) -> String {
        let bytes = serde_json::to_vec(self).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(bytes)
    }

    pub fn decode(raw: &str) -> Result<Self, ServiceError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(raw)
            .map_err(|_| ServiceError::InvalidInput("Malformed pagination cursor".to_string()))?;
        serde_json::from_slice(&bytes)
            .map_err(|_| ServiceError::InvalidInput("Malformed pagination cursor".to_string()))
    }
}

/// One page of log entries plus the cursor for the next page. The cursor is
/// present whenever the page is non-empty; the fetch past the final page
/// comes back empty.
#[derive(Debug, Serialize)]
pub struct LogPage {
    pub entries: Vec<transaction_log::Model>,
    pub next_cursor: Option<String>,
}

/// Fields of an outbound log entry supplied by the fulfillment engine.
#[derive(Debug, Clone)]
pub struct OutboundRecord {
    pub delivery_type: DeliveryType,
    pub order_number: String,
    pub tracking_number: String,
    pub customer_name: String,
    pub operator: String,
    pub items: Vec<LogItem>,
}

/// Append-only store for the transaction log, plus the faceted search and
/// cursor pagination the viewer is built on.
#[derive(Clone)]
pub struct LogService {
    db_pool: Arc<DbPool>,
}

impl LogService {
    /// Creates a new log service instance
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Appends one INBOUND entry.
    #[instrument(skip(self))]
    pub async fn append_inbound(
        &self,
        sku: &str,
        quantity: i32,
        operator: &str,
    ) -> Result<transaction_log::Model, ServiceError> {
        let db = &*self.db_pool;

        let entry = transaction_log::ActiveModel {
            id: Set(Uuid::new_v4()),
            entry_type: Set(transaction_log::INBOUND.to_string()),
            delivery_type: Set(None),
            order_number: Set(None),
            tracking_number: Set(None),
            customer_name: Set(None),
            customer_name_lower: Set(None),
            operator: Set(operator.to_string()),
            sku: Set(Some(sku.to_string())),
            quantity: Set(Some(quantity)),
            items: Set(LogItems::default()),
            // Search fields are populated on outbound entries only; every
            // facet query constrains entry type to the outbound kinds.
            sku_list: Set(" ".to_string()),
            product_name_tokens: Set(" ".to_string()),
            created_at: Set(Utc::now()),
        };

        let model = entry.insert(db).await.map_err(|e| {
            error!(error = %e, "Failed to append inbound log entry");
            ServiceError::DatabaseError(e)
        })?;

        Ok(model)
    }

    /// Appends one outbound entry aggregating every fulfilled line of one
    /// order, with the denormalized search fields computed here.
    #[instrument(skip(self, record), fields(order_number = %record.order_number))]
    pub async fn append_outbound(
        &self,
        record: OutboundRecord,
    ) -> Result<transaction_log::Model, ServiceError> {
        let db = &*self.db_pool;

        let sku_list =
            transaction_log::pad_terms(record.items.iter().map(|i| sku::normalize(&i.sku)));
        let names = record
            .items
            .iter()
            .map(|i| i.name.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let product_name_tokens = transaction_log::pad_terms(transaction_log::tokenize(&names));

        let entry = transaction_log::ActiveModel {
            id: Set(Uuid::new_v4()),
            entry_type: Set(record.delivery_type.as_str().to_string()),
            delivery_type: Set(Some(record.delivery_type.as_str().to_string())),
            order_number: Set(Some(record.order_number.clone())),
            tracking_number: Set(Some(record.tracking_number)),
            customer_name_lower: Set(Some(record.customer_name.to_lowercase())),
            customer_name: Set(Some(record.customer_name)),
            operator: Set(record.operator),
            sku: Set(None),
            quantity: Set(None),
            items: Set(LogItems(record.items)),
            sku_list: Set(sku_list),
            product_name_tokens: Set(product_name_tokens),
            created_at: Set(Utc::now()),
        };

        let model = entry.insert(db).await.map_err(|e| {
            error!(error = %e, "Failed to append outbound log entry");
            ServiceError::DatabaseError(e)
        })?;

        Ok(model)
    }

    /// Default viewer page: all outbound entries, newest first.
    #[instrument(skip(self))]
    pub async fn outbound_page(
        &self,
        page_size: u64,
        cursor: Option<LogCursor>,
    ) -> Result<LogPage, ServiceError> {
        self.page(outbound_query(), page_size, cursor).await
    }

    /// Facet search over the outbound log.
    #[instrument(skip(self))]
    pub async fn search(
        &self,
        facet: SearchFacet,
        term: &str,
        page_size: u64,
        cursor: Option<LogCursor>,
    ) -> Result<LogPage, ServiceError> {
        let query = match facet {
            SearchFacet::OrderId => {
                outbound_query().filter(LogColumn::OrderNumber.eq(term.trim()))
            }
            SearchFacet::TrackingNumber => {
                outbound_query().filter(LogColumn::TrackingNumber.eq(term.trim()))
            }
            SearchFacet::Sku => outbound_query().filter(
                LogColumn::SkuList.contains(transaction_log::padded_term(&sku::normalize(term))),
            ),
            SearchFacet::CustomerName => outbound_query()
                .filter(LogColumn::CustomerNameLower.eq(term.trim().to_lowercase())),
            SearchFacet::ProductNameToken => outbound_query().filter(
                LogColumn::ProductNameTokens
                    .contains(transaction_log::padded_term(&term.trim().to_lowercase())),
            ),
        };

        self.page(query, page_size, cursor).await
    }

    /// INBOUND entries, newest first. The receiving page shows the full
    /// history; it is small compared to the outbound stream.
    #[instrument(skip(self))]
    pub async fn inbound_history(&self) -> Result<Vec<transaction_log::Model>, ServiceError> {
        let db = &*self.db_pool;

        let entries = LogEntity::find()
            .filter(LogColumn::EntryType.eq(transaction_log::INBOUND))
            .order_by_desc(LogColumn::CreatedAt)
            .order_by_desc(LogColumn::Id)
            .all(db)
            .await?;

        Ok(entries)
    }

    async fn page(
        &self,
        query: Select<LogEntity>,
        page_size: u64,
        cursor: Option<LogCursor>,
    ) -> Result<LogPage, ServiceError> {
        let db = &*self.db_pool;

        let mut query = query
            .order_by_desc(LogColumn::CreatedAt)
            .order_by_desc(LogColumn::Id);

        if let Some(cursor) = cursor {
            query = query.filter(
                Condition::any()
                    .add(LogColumn::CreatedAt.lt(cursor.created_at))
                    .add(
                        Condition::all()
                            .add(LogColumn::CreatedAt.eq(cursor.created_at))
                            .add(LogColumn::Id.lt(cursor.id)),
                    ),
            );
        }

        let entries = query.limit(page_size).all(db).await?;
        let next_cursor = entries.last().map(|e| LogCursor::from_entry(e).encode());

        Ok(LogPage {
            entries,
            next_cursor,
        })
    }
}

fn outbound_query() -> Select<LogEntity> {
    LogEntity::find().filter(
        LogColumn::EntryType.is_in(DeliveryType::ALL.iter().map(|d| d.as_str())),
    )
}

/// Delivery-type post-filter applied to an already-fetched page, as the
/// viewer does client-side. A filtered page may show fewer rows than the
/// page size; it is not refetched.
pub fn filter_by_delivery<'a>(
    entries: &'a [transaction_log::Model],
    delivery: Option<DeliveryType>,
) -> Vec<&'a transaction_log::Model> {
    entries
        .iter()
        .filter(|entry| match delivery {
            None => true,
            Some(d) => {
                entry.delivery_type.as_deref().unwrap_or(&entry.entry_type) == d.as_str()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_round_trips() {
        let cursor = LogCursor {
            created_at: Utc::now(),
            id: Uuid::new_v4(),
        };
        let decoded = LogCursor::decode(&cursor.encode()).unwrap();
        assert_eq!(decoded, cursor);
    }

    #[test]
    fn malformed_cursor_is_rejected() {
        assert!(LogCursor::decode("not a cursor").is_err());
    }
}
