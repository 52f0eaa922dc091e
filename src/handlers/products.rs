use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::{
    entities::product,
    errors::ServiceError,
    services::catalog::{CreateProductRequest, UpdateProductRequest},
    ApiResponse, AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/batch-delete", post(batch_delete))
        .route(
            "/:sku",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/:sku/adjust", post(adjust_stock))
}

/// Catalog row plus the low-stock flag the inventory page highlights on.
#[derive(Debug, Serialize)]
pub struct ProductView {
    #[serde(flatten)]
    pub product: product::Model,
    pub low_stock: bool,
}

impl From<product::Model> for ProductView {
    fn from(product: product::Model) -> Self {
        let low_stock = product.is_low_stock();
        Self { product, low_stock }
    }
}

async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ProductView>>>, ServiceError> {
    let products = state.services.catalog.list().await?;
    Ok(Json(ApiResponse::success(
        products.into_iter().map(Into::into).collect(),
    )))
}

async fn get_product(
    State(state): State<AppState>,
    Path(sku): Path<String>,
) -> Result<Json<ApiResponse<ProductView>>, ServiceError> {
    let product = state
        .services
        .catalog
        .get(&sku)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Product with SKU {} not found", sku)))?;

    Ok(Json(ApiResponse::success(product.into())))
}

async fn create_product(
    State(state): State<AppState>,
    Json(request): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ProductView>>), ServiceError> {
    let created = state.services.catalog.create(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(created.into())),
    ))
}

async fn update_product(
    State(state): State<AppState>,
    Path(sku): Path<String>,
    Json(request): Json<UpdateProductRequest>,
) -> Result<Json<ApiResponse<ProductView>>, ServiceError> {
    let updated = state.services.catalog.update(&sku, request).await?;
    Ok(Json(ApiResponse::success(updated.into())))
}

#[derive(Debug, Deserialize)]
struct AdjustStockRequest {
    delta: i32,
}

async fn adjust_stock(
    State(state): State<AppState>,
    Path(sku): Path<String>,
    Json(request): Json<AdjustStockRequest>,
) -> Result<Json<ApiResponse<ProductView>>, ServiceError> {
    state
        .services
        .catalog
        .adjust_stock(&sku, request.delta)
        .await?;

    let product = state
        .services
        .catalog
        .get(&sku)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Product with SKU {} not found", sku)))?;

    Ok(Json(ApiResponse::success(product.into())))
}

async fn delete_product(
    State(state): State<AppState>,
    Path(sku): Path<String>,
) -> Result<Json<ApiResponse<()>>, ServiceError> {
    state.services.catalog.delete(&sku).await?;
    Ok(Json(ApiResponse::message("Product deleted")))
}

#[derive(Debug, Deserialize)]
struct BatchDeleteRequest {
    skus: Vec<String>,
}

#[derive(Debug, Serialize)]
struct BatchDeleteResponse {
    deleted: u64,
}

async fn batch_delete(
    State(state): State<AppState>,
    Json(request): Json<BatchDeleteRequest>,
) -> Result<Json<ApiResponse<BatchDeleteResponse>>, ServiceError> {
    let deleted = state.services.catalog.delete_many(&request.skus).await?;
    Ok(Json(ApiResponse::success(BatchDeleteResponse { deleted })))
}
