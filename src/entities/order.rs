use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::sku;

/// Carrier/handoff channel for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DeliveryType {
    Post,
    Valex,
    Pickup,
}

impl DeliveryType {
    pub const ALL: [DeliveryType; 3] = [Self::Post, Self::Valex, Self::Pickup];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryType::Post => "POST",
            DeliveryType::Valex => "VALEX",
            DeliveryType::Pickup => "PICKUP",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "POST" => Some(DeliveryType::Post),
            "VALEX" => Some(DeliveryType::Valex),
            "PICKUP" => Some(DeliveryType::Pickup),
            _ => None,
        }
    }
}

/// Order lifecycle status. READY orders are eligible for fulfillment;
/// COMPLETED is terminal (no reverse transition).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    Ready,
    Completed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Ready => "READY",
            OrderStatus::Completed => "COMPLETED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "READY" => Some(OrderStatus::Ready),
            "COMPLETED" => Some(OrderStatus::Completed),
            _ => None,
        }
    }
}

/// Customer order as received from the upstream order feed. Created
/// externally; this service only reads orders and flips their status.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, Validate)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Operator-facing order identifier
    #[validate(length(
        min = 1,
        max = 50,
        message = "Order number must be between 1 and 50 characters"
    ))]
    pub order_number: String,

    /// Carrier tracking number
    pub tracking: String,

    pub delivery_type: String,
    pub status: String,

    /// Orderer name
    pub name: String,
    pub receiver: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,

    /// Raw order lines, kept as received.
    #[sea_orm(column_type = "Json")]
    pub items: OrderLines,

    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct OrderLines(pub Vec<OrderLine>);

/// One required line of an order, as supplied upstream. Depending on which
/// system produced the order, the SKU can arrive under any of four field
/// names; see [`OrderLine::resolve_sku`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(
        default,
        alias = "productSku",
        skip_serializing_if = "Option::is_none"
    )]
    pub product_sku: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub qty: i32,
}

impl OrderLine {
    /// Resolves the line's SKU from the upstream field variants, in priority
    /// order `sku` > `productSku` > `id` > `code`. Compatibility shim for
    /// heterogeneous order feeds; blank values count as absent. The result
    /// is normalized.
    pub fn resolve_sku(&self) -> Option<String> {
        [
            self.sku.as_deref(),
            self.product_sku.as_deref(),
            self.id.as_deref(),
            self.code.as_deref(),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(sku::normalize)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn status(&self) -> Option<OrderStatus> {
        OrderStatus::from_str(&self.status)
    }

    pub fn delivery(&self) -> Option<DeliveryType> {
        DeliveryType::from_str(&self.delivery_type)
    }
}
