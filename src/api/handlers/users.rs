//! Per-address read handlers: a user's listings and owned tokens.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{ApiResponse, SourceParams};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, GatewayError};

/// `GET /user/{address}/listings` — A user's active listings.
///
/// # Errors
///
/// Returns [`GatewayError`] when both backends fail.
#[utoipa::path(
    get,
    path = "/api/user/{address}/listings",
    tag = "Users",
    summary = "List a user's active listings",
    description = "Returns active listings whose seller is the given address, enriched with token name and image.",
    params(
        ("address" = String, Path, description = "Bech32 account address"),
        SourceParams,
    ),
    responses(
        (status = 200, description = "The user's listings", body = serde_json::Value),
        (status = 500, description = "Both data sources failed", body = ErrorResponse),
    )
)]
pub async fn get_user_listings(
    State(state): State<AppState>,
    Path(address): Path<String>,
    Query(params): Query<SourceParams>,
) -> Result<impl IntoResponse, GatewayError> {
    let result = state
        .query
        .user_listings(&address, params.force_rpc(), params.contract())
        .await?;
    Ok(Json(ApiResponse::from(result)))
}

/// `GET /user/{address}/nfts` — A user's owned tokens.
///
/// # Errors
///
/// Returns [`GatewayError`] when both backends fail.
#[utoipa::path(
    get,
    path = "/api/user/{address}/nfts",
    tag = "Users",
    summary = "List a user's owned tokens",
    description = "Returns tokens currently owned by the given address, newest mints first.",
    params(
        ("address" = String, Path, description = "Bech32 account address"),
        SourceParams,
    ),
    responses(
        (status = 200, description = "The user's tokens", body = serde_json::Value),
        (status = 500, description = "Both data sources failed", body = ErrorResponse),
    )
)]
pub async fn get_user_nfts(
    State(state): State<AppState>,
    Path(address): Path<String>,
    Query(params): Query<SourceParams>,
) -> Result<impl IntoResponse, GatewayError> {
    let result = state
        .query
        .user_nfts(&address, params.force_rpc(), params.contract())
        .await?;
    Ok(Json(ApiResponse::from(result)))
}

/// User routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/user/{address}/listings", get(get_user_listings))
        .route("/user/{address}/nfts", get(get_user_nfts))
}
