use axum::{
    extract::{Query, State},
    Extension, Json,
};
use dishbench_core::DishQuery;
use dishbench_scraper::OutcomeSummary;
use serde::Deserialize;

use crate::middleware::RequestId;

use super::{map_scraper_error, ApiError, ApiResponse, AppState, ResponseMeta};

/// Raw query string. Coordinates stay text so bad input becomes a
/// `validation_error` envelope instead of an extractor rejection.
#[derive(Debug, Deserialize)]
pub(super) struct ScrapeParams {
    pub item: Option<String>,
    pub lat: Option<String>,
    pub long: Option<String>,
}

pub(super) async fn scrape(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(params): Query<ScrapeParams>,
) -> Result<Json<ApiResponse<OutcomeSummary>>, ApiError> {
    let query = DishQuery::from_raw(
        params.item.as_deref(),
        params.lat.as_deref(),
        params.long.as_deref(),
    )
    .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.to_string()))?;

    tracing::info!(
        request_id = %req_id.0,
        item = %query.item,
        lat = query.latitude,
        long = query.longitude,
        "scrape requested"
    );

    let outcome = state
        .scraper
        .scrape(&query)
        .await
        .map_err(|e| map_scraper_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: OutcomeSummary::from(outcome),
        meta: ResponseMeta::new(req_id.0),
    }))
}
