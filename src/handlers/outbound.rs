use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    entities::order::{self, DeliveryType},
    errors::ServiceError,
    services::fulfillment::{
        self, PickSession, SessionState, PAGE_WINDOW, PENDING_PAGE_SIZE,
    },
    ApiResponse, AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/pending", get(pending_orders))
        .route("/sessions", post(start_session))
        .route("/sessions/:id", get(get_session).delete(cancel_session))
        .route("/sessions/:id/scan", post(scan_item))
        .route("/sessions/:id/quantity", post(change_quantity))
        .route("/sessions/:id/finalize", post(finalize_session))
}

#[derive(Debug, Serialize)]
struct WorkingItemView {
    sku: String,
    name: String,
    required_qty: i32,
    scanned_qty: i32,
    fulfilled: bool,
    over_fulfilled: bool,
}

/// Session snapshot returned by every session endpoint, including the
/// summary totals of the packing panel.
#[derive(Debug, Serialize)]
struct SessionView {
    session_id: Uuid,
    state: SessionState,
    order_id: Uuid,
    order_number: String,
    tracking: String,
    delivery_type: DeliveryType,
    customer_name: String,
    items: Vec<WorkingItemView>,
    total_required: i32,
    total_scanned: i32,
    pending: i32,
    progress_percent: f64,
    complete: bool,
}

fn session_view(session_id: Uuid, session: &PickSession) -> SessionView {
    SessionView {
        session_id,
        state: session.state(),
        order_id: session.order_id,
        order_number: session.order_number.clone(),
        tracking: session.tracking.clone(),
        delivery_type: session.delivery_type,
        customer_name: session.customer_name.clone(),
        items: session
            .items
            .iter()
            .map(|item| WorkingItemView {
                sku: item.sku.clone(),
                name: item.name.clone(),
                required_qty: item.required_qty,
                scanned_qty: item.scanned_qty,
                fulfilled: item.is_fulfilled(),
                over_fulfilled: item.is_over_fulfilled(),
            })
            .collect(),
        total_required: session.total_required(),
        total_scanned: session.total_scanned(),
        pending: session.pending(),
        progress_percent: session.progress_percent(),
        complete: session.is_complete(),
    }
}

#[derive(Debug, Deserialize)]
struct PendingQuery {
    delivery_type: DeliveryType,
    keyword: Option<String>,
    #[serde(default = "default_page")]
    page: usize,
}

fn default_page() -> usize {
    1
}

#[derive(Debug, Serialize)]
struct PendingPage {
    orders: Vec<order::Model>,
    page: usize,
    total_pages: usize,
    total: usize,
    window: Vec<fulfillment::PageMark>,
}

async fn pending_orders(
    State(state): State<AppState>,
    Query(query): Query<PendingQuery>,
) -> Result<Json<ApiResponse<PendingPage>>, ServiceError> {
    let orders = state
        .services
        .fulfillment
        .pending_orders(query.delivery_type)
        .await?;

    let filtered =
        fulfillment::filter_pending(&orders, query.keyword.as_deref().unwrap_or(""));
    let total = filtered.len();
    let total_pages = total.div_ceil(PENDING_PAGE_SIZE);
    let slice = fulfillment::page_slice(&filtered, query.page, PENDING_PAGE_SIZE);
    let window = fulfillment::page_window(query.page, total_pages, PAGE_WINDOW);

    Ok(Json(ApiResponse::success(PendingPage {
        orders: slice.iter().map(|o| (*o).clone()).collect(),
        page: query.page,
        total_pages,
        total,
        window,
    })))
}

#[derive(Debug, Deserialize)]
struct StartSessionRequest {
    /// Tracking-scan entry point (POST flow).
    tracking: Option<String>,
    /// List-selection entry point (VALEX/PICKUP flows).
    order_id: Option<Uuid>,
    delivery_type: DeliveryType,
}

async fn start_session(
    State(state): State<AppState>,
    Json(request): Json<StartSessionRequest>,
) -> Result<(StatusCode, Json<ApiResponse<SessionView>>), ServiceError> {
    let session = match (&request.tracking, request.order_id) {
        (Some(tracking), _) if !tracking.trim().is_empty() => {
            state
                .services
                .fulfillment
                .load_order_by_tracking(tracking, request.delivery_type)
                .await?
        }
        (_, Some(order_id)) => state.services.fulfillment.load_order(order_id).await?,
        _ => {
            return Err(ServiceError::InvalidInput(
                "Either a tracking number or an order id is required".to_string(),
            ))
        }
    };

    let session_id = Uuid::new_v4();
    let view = session_view(session_id, &session);
    state.sessions.insert(session_id, session);

    Ok((StatusCode::CREATED, Json(ApiResponse::success(view))))
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<SessionView>>, ServiceError> {
    let session = state
        .sessions
        .get(&id)
        .ok_or_else(|| ServiceError::NotFound(format!("No active pick session {}", id)))?;

    Ok(Json(ApiResponse::success(session_view(id, &session))))
}

async fn cancel_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ServiceError> {
    state
        .sessions
        .remove(&id)
        .ok_or_else(|| ServiceError::NotFound(format!("No active pick session {}", id)))?;

    Ok(Json(ApiResponse::message("Session cancelled")))
}

#[derive(Debug, Deserialize)]
struct ScanRequest {
    sku: String,
}

async fn scan_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ScanRequest>,
) -> Result<Json<ApiResponse<SessionView>>, ServiceError> {
    let mut session = state
        .sessions
        .get_mut(&id)
        .ok_or_else(|| ServiceError::NotFound(format!("No active pick session {}", id)))?;

    session.record_scan(&request.sku)?;

    Ok(Json(ApiResponse::success(session_view(id, &session))))
}

/// Either a relative nudge (`delta`) or a direct override (`set`).
#[derive(Debug, Deserialize)]
struct QuantityRequest {
    sku: String,
    delta: Option<i32>,
    set: Option<i32>,
}

async fn change_quantity(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<QuantityRequest>,
) -> Result<Json<ApiResponse<SessionView>>, ServiceError> {
    let mut session = state
        .sessions
        .get_mut(&id)
        .ok_or_else(|| ServiceError::NotFound(format!("No active pick session {}", id)))?;

    match (request.set, request.delta) {
        (Some(value), _) => session.set_quantity(&request.sku, value),
        (None, Some(delta)) => session.adjust_quantity(&request.sku, delta),
        (None, None) => {
            return Err(ServiceError::InvalidInput(
                "Either 'delta' or 'set' is required".to_string(),
            ))
        }
    }

    Ok(Json(ApiResponse::success(session_view(id, &session))))
}

#[derive(Debug, Deserialize)]
struct FinalizeRequest {
    #[serde(default = "default_operator")]
    operator: String,
}

impl Default for FinalizeRequest {
    fn default() -> Self {
        Self {
            operator: default_operator(),
        }
    }
}

fn default_operator() -> String {
    "Admin".to_string()
}

#[derive(Debug, Serialize)]
struct FinalizeResponse {
    order_id: Uuid,
    log_id: Uuid,
}

async fn finalize_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    request: Option<Json<FinalizeRequest>>,
) -> Result<Json<ApiResponse<FinalizeResponse>>, ServiceError> {
    let request = request.map(|Json(r)| r).unwrap_or_default();

    // Work on a snapshot so the session lock is not held across the writes;
    // the session is only discarded once finalize reports success.
    let session = state
        .sessions
        .get(&id)
        .map(|s| s.value().clone())
        .ok_or_else(|| ServiceError::NotFound(format!("No active pick session {}", id)))?;

    let log_id = state
        .services
        .fulfillment
        .finalize(&session, &request.operator)
        .await?;

    state.sessions.remove(&id);

    Ok(Json(ApiResponse::success(FinalizeResponse {
        order_id: session.order_id,
        log_id,
    })))
}
