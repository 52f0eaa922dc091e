use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::{
    entities::order::DeliveryType,
    entities::transaction_log,
    errors::ServiceError,
    services::logs::{self, LogCursor, SearchFacet, DEFAULT_PAGE_SIZE},
    ApiResponse, AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new().route("/", get(list_logs))
}

#[derive(Debug, Deserialize)]
struct LogsQuery {
    facet: Option<SearchFacet>,
    term: Option<String>,
    cursor: Option<String>,
    #[serde(default = "default_page_size")]
    page_size: u64,
    /// Client-side post-filter: POST, VALEX, PICKUP, or ALL.
    delivery: Option<String>,
}

fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}

#[derive(Debug, Serialize)]
struct LogsPage {
    entries: Vec<transaction_log::Model>,
    next_cursor: Option<String>,
}

async fn list_logs(
    State(state): State<AppState>,
    Query(query): Query<LogsQuery>,
) -> Result<Json<ApiResponse<LogsPage>>, ServiceError> {
    let cursor = query
        .cursor
        .as_deref()
        .map(LogCursor::decode)
        .transpose()?;
    let page_size = query.page_size.max(1);

    let term = query
        .term
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());

    // A blank search term falls back to the default most-recent-first view,
    // as the panel does.
    let page = match (query.facet, term) {
        (Some(facet), Some(term)) => {
            state
                .services
                .logs
                .search(facet, term, page_size, cursor)
                .await?
        }
        _ => state.services.logs.outbound_page(page_size, cursor).await?,
    };

    let delivery = match query.delivery.as_deref() {
        None | Some("ALL") => None,
        Some(raw) => Some(DeliveryType::from_str(raw).ok_or_else(|| {
            ServiceError::InvalidInput(format!("Unknown delivery type {}", raw))
        })?),
    };

    let entries = logs::filter_by_delivery(&page.entries, delivery)
        .into_iter()
        .cloned()
        .collect();

    Ok(Json(ApiResponse::success(LogsPage {
        entries,
        next_cursor: page.next_cursor,
    })))
}
