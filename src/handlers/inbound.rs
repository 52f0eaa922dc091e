use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::{
    entities::{product, transaction_log},
    errors::ServiceError,
    services::inbound::InboundReceipt,
    ApiResponse, AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(register_inbound))
        .route("/lookup", get(lookup_sku))
        .route("/history", get(inbound_history))
}

#[derive(Debug, Deserialize)]
struct LookupQuery {
    sku: String,
}

async fn lookup_sku(
    State(state): State<AppState>,
    Query(query): Query<LookupQuery>,
) -> Result<Json<ApiResponse<Option<product::Model>>>, ServiceError> {
    let found = state.services.inbound.lookup(&query.sku).await?;
    Ok(Json(ApiResponse::success(found)))
}

#[derive(Debug, Deserialize)]
struct RegisterInboundRequest {
    sku: String,
    quantity: i32,
    #[serde(default = "default_operator")]
    operator: String,
}

fn default_operator() -> String {
    "Admin".to_string()
}

async fn register_inbound(
    State(state): State<AppState>,
    Json(request): Json<RegisterInboundRequest>,
) -> Result<(StatusCode, Json<ApiResponse<InboundReceipt>>), ServiceError> {
    let receipt = state
        .services
        .inbound
        .register(&request.sku, request.quantity, &request.operator)
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::success(receipt))))
}

async fn inbound_history(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<transaction_log::Model>>>, ServiceError> {
    let history = state.services.inbound.history().await?;
    Ok(Json(ApiResponse::success(history)))
}
