use std::sync::Arc;

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    TransactionTrait,
};
use serde::Deserialize;
use tracing::{error, info, instrument};
use validator::Validate;

use crate::{
    db::DbPool,
    entities::product::{self, Column as ProductColumn, Entity as Product},
    errors::ServiceError,
    events::{Event, EventSender},
    sku,
};

/// Low-stock threshold applied when a product is created.
const DEFAULT_LOW_STOCK_THRESHOLD: i32 = 10;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(length(
        min = 1,
        max = 100,
        message = "SKU must be between 1 and 100 characters"
    ))]
    pub sku: String,
    #[validate(length(
        min = 1,
        max = 255,
        message = "Product name must be between 1 and 255 characters"
    ))]
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub stock: i32,
    pub link: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub stock: Option<i32>,
    pub low_stock_threshold: Option<i32>,
    pub link: Option<String>,
    pub image: Option<String>,
}

/// Service for managing the product catalog, keyed by normalized SKU.
#[derive(Clone)]
pub struct CatalogService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl CatalogService {
    /// Creates a new catalog service instance
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Looks a product up by normalized SKU.
    #[instrument(skip(self))]
    pub async fn get(&self, sku_input: &str) -> Result<Option<product::Model>, ServiceError> {
        let db = &*self.db_pool;
        let key = sku::normalize(sku_input);

        let product = Product::find_by_id(key).one(db).await.map_err(|e| {
            error!(error = %e, "Database error when fetching product");
            ServiceError::DatabaseError(e)
        })?;

        Ok(product)
    }

    /// First product whose SKU starts with the given normalized prefix.
    /// Ties resolve in SKU order.
    #[instrument(skip(self))]
    pub async fn find_by_sku_prefix(
        &self,
        prefix: &str,
    ) -> Result<Option<product::Model>, ServiceError> {
        let db = &*self.db_pool;
        let key = sku::normalize(prefix);
        if key.is_empty() {
            return Ok(None);
        }

        let product = Product::find()
            .filter(ProductColumn::Sku.starts_with(key.as_str()))
            .order_by_asc(ProductColumn::Sku)
            .limit(1)
            .one(db)
            .await?;

        Ok(product)
    }

    /// Full catalog scan, SKU order. The catalog is small enough that the
    /// panel lists it without pagination.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<product::Model>, ServiceError> {
        let db = &*self.db_pool;

        let products = Product::find()
            .order_by_asc(ProductColumn::Sku)
            .all(db)
            .await?;

        Ok(products)
    }

    /// Creates a new product. SKU collisions are rejected rather than
    /// silently overwritten.
    #[instrument(skip(self, request), fields(sku = %request.sku))]
    pub async fn create(
        &self,
        request: CreateProductRequest,
    ) -> Result<product::Model, ServiceError> {
        request.validate()?;

        let db = &*self.db_pool;
        let key = sku::normalize(&request.sku);
        if key.is_empty() {
            return Err(ServiceError::ValidationError(
                "SKU must not be blank".to_string(),
            ));
        }

        let existing = Product::find_by_id(key.clone()).one(db).await?;
        if existing.is_some() {
            error!(sku = %key, "Attempted to create product with duplicate SKU");
            return Err(ServiceError::DuplicateSku(key));
        }

        let now = Utc::now();
        let product = product::ActiveModel {
            sku: Set(key.clone()),
            name: Set(request.name),
            category: Set(request.category),
            stock: Set(request.stock),
            low_stock_threshold: Set(DEFAULT_LOW_STOCK_THRESHOLD),
            link: Set(request.link),
            image: Set(request.image),
            created_at: Set(now),
            last_updated: Set(Some(now)),
        };

        let created = product.insert(db).await.map_err(|e| {
            error!(sku = %key, error = %e, "Failed to create product");
            ServiceError::DatabaseError(e)
        })?;

        self.event_sender
            .send(Event::ProductCreated {
                sku: created.sku.clone(),
            })
            .await
            .map_err(ServiceError::EventError)?;

        info!(sku = %created.sku, name = %created.name, "Product created successfully");

        Ok(created)
    }

    /// Merges the provided fields into an existing product and refreshes
    /// `last_updated`.
    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        sku_input: &str,
        request: UpdateProductRequest,
    ) -> Result<product::Model, ServiceError> {
        let db = &*self.db_pool;
        let key = sku::normalize(sku_input);

        let product = Product::find_by_id(key.clone())
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product with SKU {} not found", key)))?;

        let mut product: product::ActiveModel = product.into();

        if let Some(name) = request.name {
            product.name = Set(name);
        }

        if let Some(category) = request.category {
            product.category = Set(category);
        }

        if let Some(stock) = request.stock {
            product.stock = Set(stock);
        }

        if let Some(threshold) = request.low_stock_threshold {
            product.low_stock_threshold = Set(threshold);
        }

        if let Some(link) = request.link {
            product.link = Set(Some(link));
        }

        if let Some(image) = request.image {
            product.image = Set(Some(image));
        }

        product.last_updated = Set(Some(Utc::now()));

        let updated = product.update(db).await.map_err(|e| {
            error!(sku = %key, error = %e, "Failed to update product");
            ServiceError::DatabaseError(e)
        })?;

        self.event_sender
            .send(Event::ProductUpdated {
                sku: updated.sku.clone(),
            })
            .await
            .map_err(ServiceError::EventError)?;

        info!(sku = %updated.sku, "Product updated successfully");

        Ok(updated)
    }

    /// Adjusts stock by `delta` relative to the stored value, as a single
    /// SQL increment. Concurrent writers cannot lose updates; no floor is
    /// applied, so stock may go negative.
    #[instrument(skip(self))]
    pub async fn adjust_stock(&self, sku_input: &str, delta: i32) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let key = sku::normalize(sku_input);

        let result = Product::update_many()
            .col_expr(
                ProductColumn::Stock,
                Expr::col(ProductColumn::Stock).add(delta),
            )
            .col_expr(ProductColumn::LastUpdated, Expr::value(Utc::now()))
            .filter(ProductColumn::Sku.eq(key.clone()))
            .exec(db)
            .await?;

        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Product with SKU {} not found",
                key
            )));
        }

        self.event_sender
            .send(Event::StockAdjusted { sku: key, delta })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(())
    }

    /// Deletes one product by SKU.
    #[instrument(skip(self))]
    pub async fn delete(&self, sku_input: &str) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let key = sku::normalize(sku_input);

        let result = Product::delete_by_id(key.clone()).exec(db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Product with SKU {} not found",
                key
            )));
        }

        self.event_sender
            .send(Event::ProductDeleted { sku: key.clone() })
            .await
            .map_err(ServiceError::EventError)?;

        info!(sku = %key, "Product deleted successfully");

        Ok(())
    }

    /// Deletes a batch of products inside one transaction: either every
    /// matching row is deleted or none are.
    #[instrument(skip(self, skus))]
    pub async fn delete_many(&self, skus: &[String]) -> Result<u64, ServiceError> {
        let db = &*self.db_pool;

        let keys: Vec<String> = skus
            .iter()
            .map(|s| sku::normalize(s))
            .filter(|k| !k.is_empty())
            .collect();
        if keys.is_empty() {
            return Ok(0);
        }

        let txn = db.begin().await?;
        let result = Product::delete_many()
            .filter(ProductColumn::Sku.is_in(keys.clone()))
            .exec(&txn)
            .await?;
        txn.commit().await?;

        for key in keys {
            self.event_sender
                .send(Event::ProductDeleted { sku: key })
                .await
                .map_err(ServiceError::EventError)?;
        }

        info!(deleted = result.rows_affected, "Batch delete committed");

        Ok(result.rows_affected)
    }
}
