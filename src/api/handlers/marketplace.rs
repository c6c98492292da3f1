//! Marketplace read handlers: listings, offers, activity.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{ActivityParams, ApiResponse, SourceParams};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, GatewayError};

/// `GET /listings` — All active listings.
///
/// # Errors
///
/// Returns [`GatewayError`] when both backends fail.
#[utoipa::path(
    get,
    path = "/api/listings",
    tag = "Marketplace",
    summary = "List active listings",
    description = "Returns every token currently listed for sale, newest first. Served from the event indexer when available, otherwise from the chain's marketplace contract.",
    params(SourceParams),
    responses(
        (status = 200, description = "Active listings", body = serde_json::Value),
        (status = 500, description = "Both data sources failed", body = ErrorResponse),
    )
)]
pub async fn get_listings(
    State(state): State<AppState>,
    Query(params): Query<SourceParams>,
) -> Result<impl IntoResponse, GatewayError> {
    let result = state
        .query
        .listings(params.force_rpc(), params.contract())
        .await?;
    Ok(Json(ApiResponse::from(result)))
}

/// `GET /offers/{token_id}` — Open offers for a token.
///
/// # Errors
///
/// Returns [`GatewayError`] when both backends fail.
#[utoipa::path(
    get,
    path = "/api/offers/{token_id}",
    tag = "Marketplace",
    summary = "List open offers for a token",
    description = "Returns offers created but never accepted, rejected, or cancelled. Offers are only derivable from the event log; when served with source `rpc` the list is always empty and means \"unknown\", not \"none\".",
    params(
        ("token_id" = String, Path, description = "Token id"),
        SourceParams,
    ),
    responses(
        (status = 200, description = "Open offers", body = serde_json::Value),
        (status = 500, description = "Both data sources failed", body = ErrorResponse),
    )
)]
pub async fn get_offers(
    State(state): State<AppState>,
    Path(token_id): Path<String>,
    Query(params): Query<SourceParams>,
) -> Result<impl IntoResponse, GatewayError> {
    let result = state.query.offers(&token_id, params.force_rpc()).await?;
    Ok(Json(ApiResponse::from(result)))
}

/// `GET /activity` — The marketplace activity feed.
///
/// # Errors
///
/// Returns [`GatewayError`] when both backends fail.
#[utoipa::path(
    get,
    path = "/api/activity",
    tag = "Marketplace",
    summary = "Recent marketplace activity",
    description = "Returns recent mints, listings, sales, offers, and transfers, newest first. RPC-sourced entries carry block-height-approximated timestamps.",
    params(ActivityParams),
    responses(
        (status = 200, description = "Activity feed", body = serde_json::Value),
        (status = 500, description = "Both data sources failed", body = ErrorResponse),
    )
)]
pub async fn get_activity(
    State(state): State<AppState>,
    Query(params): Query<ActivityParams>,
) -> Result<impl IntoResponse, GatewayError> {
    let (limit, offset) = params.window();
    let result = state
        .query
        .activity(limit, offset, params.force_rpc(), params.contract())
        .await?;
    Ok(Json(ApiResponse::from(result)))
}

/// Marketplace routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/listings", get(get_listings))
        .route("/offers/{token_id}", get(get_offers))
        .route("/activity", get(get_activity))
}
