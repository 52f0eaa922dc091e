use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Catalog product, keyed by normalized SKU.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Primary key: trimmed, uppercased SKU. Callers normalize before any
    /// keyed access.
    #[sea_orm(primary_key, auto_increment = false)]
    pub sku: String,

    #[validate(length(
        min = 1,
        max = 255,
        message = "Product name must be between 1 and 255 characters"
    ))]
    pub name: String,

    pub category: String,

    /// On-hand quantity. May go negative; outbound decrements are never
    /// floored.
    pub stock: i32,

    pub low_stock_threshold: i32,

    /// Optional product page URL
    pub link: Option<String>,

    /// Optional display image URL
    pub image: Option<String>,

    pub created_at: DateTime<Utc>,
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Stock has dropped below the configured reorder threshold.
    pub fn is_low_stock(&self) -> bool {
        self.stock < self.low_stock_threshold
    }
}
