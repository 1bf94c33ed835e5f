use axum::{
    body::Bytes,
    extract::{Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shopscout_core::ProductRecord;
use shopscout_scraper::ScraperError;

use crate::middleware::RequestId;

use super::{ApiError, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct ScrapeQuery {
    pub url: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct ScrapeResponse {
    status: &'static str,
    result: Vec<ProductRecord>,
    skipped: usize,
    meta: ResponseMeta,
}

pub(super) async fn scrape_by_query(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ScrapeQuery>,
) -> Result<Json<ScrapeResponse>, ApiError> {
    let url = query.url.filter(|u| !u.trim().is_empty());
    run_scrape(&state, req_id, url).await
}

/// Accepts `{"url": ..}`, `{"URL": ..}`, `{"url": [{"URL": ..}]}` or a
/// top-level `[{"URL": ..}]`; the first element of any array wins.
pub(super) async fn scrape_by_body(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Bytes,
) -> Result<Json<ScrapeResponse>, ApiError> {
    let value: Value = serde_json::from_slice(&body).map_err(|e| {
        ApiError::new(
            req_id.0.clone(),
            "bad_request",
            format!("request body is not valid JSON: {e}"),
        )
    })?;
    run_scrape(&state, req_id, url_from_body(&value)).await
}

async fn run_scrape(
    state: &AppState,
    req_id: RequestId,
    url: Option<String>,
) -> Result<Json<ScrapeResponse>, ApiError> {
    let Some(url) = url else {
        return Err(ApiError::new(
            req_id.0,
            "bad_request",
            "a url parameter or JSON body field is required",
        ));
    };

    tracing::info!(request_id = %req_id.0, url = %url, "scrape requested");

    match state.scraper.scrape_site(&url).await {
        Ok(result) => Ok(Json(ScrapeResponse {
            status: "ok",
            result: result.products,
            skipped: result.skipped,
            meta: ResponseMeta::new(req_id.0),
        })),
        Err(ScraperError::InvalidUrl { url, reason }) => Err(ApiError::new(
            req_id.0,
            "validation_error",
            format!("invalid url \"{url}\": {reason}"),
        )),
        Err(e) => {
            tracing::error!(error = %e, "scrape failed");
            Err(ApiError::new(req_id.0, "internal_error", "scrape failed"))
        }
    }
}

/// Pulls the target URL out of any accepted body shape. Blank strings count
/// as missing.
pub(super) fn url_from_body(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_owned()).filter(|s| !s.is_empty()),
        Value::Array(items) => items.first().and_then(url_from_body),
        Value::Object(map) => map
            .get("url")
            .or_else(|| map.get("URL"))
            .and_then(url_from_body),
        _ => None,
    }
}
