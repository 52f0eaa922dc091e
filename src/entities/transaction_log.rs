use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// `entry_type` value for receiving entries. Outbound entries store their
/// delivery type (POST/VALEX/PICKUP) in `entry_type` instead, mirroring the
/// upstream data shape.
pub const INBOUND: &str = "INBOUND";

/// Append-only transaction log entry. One table holds both inbound receipts
/// (single SKU + quantity) and outbound shipments (aggregated item lines
/// plus denormalized search fields). Entries are never mutated after
/// creation.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transaction_logs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// "INBOUND", or the outbound delivery type.
    pub entry_type: String,

    /// Duplicated delivery type on outbound entries.
    pub delivery_type: Option<String>,

    pub order_number: Option<String>,
    pub tracking_number: Option<String>,
    pub customer_name: Option<String>,
    /// Lower-cased copy of `customer_name`, for exact-match search.
    pub customer_name_lower: Option<String>,

    pub operator: String,

    /// Inbound entries: the received SKU.
    pub sku: Option<String>,
    /// Inbound entries: the received quantity.
    pub quantity: Option<i32>,

    /// Outbound entries: the fulfilled lines (actually-scanned quantities).
    #[sea_orm(column_type = "Json")]
    pub items: LogItems,

    /// Space-padded normalized SKUs of all item lines, for whole-token
    /// containment search.
    pub sku_list: String,

    /// Space-padded lower-cased product-name tokens.
    pub product_name_tokens: String,

    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct LogItems(pub Vec<LogItem>);

/// One fulfilled line of an outbound entry, with the product name and link
/// resolved at finalize time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogItem {
    pub sku: String,
    pub name: String,
    pub quantity: i32,
    pub link: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_inbound(&self) -> bool {
        self.entry_type == INBOUND
    }
}

/// Joins terms into the padded text form used by the containment columns:
/// `" A B C "`. Padding both ends of the column and both ends of the search
/// term makes substring matching equivalent to whole-token containment.
pub fn pad_terms<I, S>(terms: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::from(" ");
    for term in terms {
        let term = term.as_ref();
        if !term.is_empty() {
            out.push_str(term);
            out.push(' ');
        }
    }
    out
}

/// Wraps a single term for containment matching against a padded column.
pub fn padded_term(term: &str) -> String {
    format!(" {} ", term)
}

/// Whitespace-tokenizes product names, lower-cased, empty tokens dropped.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(|t| t.to_string())
        .collect()
}
