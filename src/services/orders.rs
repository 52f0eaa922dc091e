use std::sync::Arc;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::order::{self, Column as OrderColumn, DeliveryType, Entity as OrderEntity, OrderStatus},
    errors::ServiceError,
};

/// Read side of the externally-owned orders collection, plus the single
/// status transition this service performs. Orders are never created or
/// deleted here.
#[derive(Clone)]
pub struct OrderService {
    db_pool: Arc<DbPool>,
}

impl OrderService {
    /// Creates a new order service instance
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Single order matching tracking number + delivery type, any status.
    /// The caller distinguishes READY from COMPLETED.
    #[instrument(skip(self))]
    pub async fn find_by_tracking(
        &self,
        tracking: &str,
        delivery: DeliveryType,
    ) -> Result<Option<order::Model>, ServiceError> {
        let db = &*self.db_pool;

        let order = OrderEntity::find()
            .filter(OrderColumn::Tracking.eq(tracking.trim()))
            .filter(OrderColumn::DeliveryType.eq(delivery.as_str()))
            .one(db)
            .await
            .map_err(|e| {
                error!(error = %e, "Database error when fetching order by tracking");
                ServiceError::DatabaseError(e)
            })?;

        Ok(order)
    }

    /// Retrieves an order by ID
    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<Option<order::Model>, ServiceError> {
        let db = &*self.db_pool;

        let order = OrderEntity::find_by_id(id).one(db).await?;

        Ok(order)
    }

    /// All READY orders for one delivery type, oldest first.
    #[instrument(skip(self))]
    pub async fn list_ready(
        &self,
        delivery: DeliveryType,
    ) -> Result<Vec<order::Model>, ServiceError> {
        let db = &*self.db_pool;

        let orders = OrderEntity::find()
            .filter(OrderColumn::Status.eq(OrderStatus::Ready.as_str()))
            .filter(OrderColumn::DeliveryType.eq(delivery.as_str()))
            .order_by_asc(OrderColumn::CreatedAt)
            .all(db)
            .await?;

        Ok(orders)
    }

    /// Flips an order to COMPLETED. One-way; there is no reverse
    /// transition.
    #[instrument(skip(self))]
    pub async fn complete(&self, id: Uuid) -> Result<(), ServiceError> {
        let db = &*self.db_pool;

        let order = OrderEntity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", id)))?;

        let mut order: order::ActiveModel = order.into();
        order.status = Set(OrderStatus::Completed.as_str().to_string());
        order.updated_at = Set(Some(Utc::now()));

        order.update(db).await.map_err(|e| {
            error!(order_id = %id, error = %e, "Failed to mark order completed");
            ServiceError::DatabaseError(e)
        })?;

        info!(order_id = %id, "Order marked completed");

        Ok(())
    }
}
