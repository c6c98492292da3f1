//! Token read handlers: collection view and single-token details.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{ApiResponse, NftListParams, SourceParams};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, GatewayError};

/// `GET /nfts` — All minted tokens with listing status.
///
/// # Errors
///
/// Returns [`GatewayError`] when both backends fail.
#[utoipa::path(
    get,
    path = "/api/nfts",
    tag = "Tokens",
    summary = "List minted tokens",
    description = "Returns every minted token with its metadata, current owner, and listing status, newest mints first.",
    params(NftListParams),
    responses(
        (status = 200, description = "Minted tokens", body = serde_json::Value),
        (status = 500, description = "Both data sources failed", body = ErrorResponse),
    )
)]
pub async fn get_nfts(
    State(state): State<AppState>,
    Query(params): Query<NftListParams>,
) -> Result<impl IntoResponse, GatewayError> {
    let (limit, offset) = params.window();
    let result = state
        .query
        .all_nfts(limit, offset, params.force_rpc(), params.contract())
        .await?;
    Ok(Json(ApiResponse::from(result)))
}

/// `GET /nft/{token_id}` — Details for one token.
///
/// # Errors
///
/// Returns [`GatewayError::TokenNotFound`] when neither backend knows
/// the token.
#[utoipa::path(
    get,
    path = "/api/nft/{token_id}",
    tag = "Tokens",
    summary = "Get token details",
    description = "Returns metadata and current ownership for a single token. Tokens unknown to the indexer are looked up on the chain before reporting 404.",
    params(
        ("token_id" = String, Path, description = "Token id"),
        SourceParams,
    ),
    responses(
        (status = 200, description = "Token details", body = serde_json::Value),
        (status = 404, description = "Token was never minted", body = ErrorResponse),
        (status = 500, description = "Both data sources failed", body = ErrorResponse),
    )
)]
pub async fn get_nft(
    State(state): State<AppState>,
    Path(token_id): Path<String>,
    Query(params): Query<SourceParams>,
) -> Result<impl IntoResponse, GatewayError> {
    let result = state
        .query
        .nft(&token_id, params.force_rpc(), params.contract())
        .await?;
    Ok(Json(ApiResponse::from(result)))
}

/// Token routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/nfts", get(get_nfts))
        .route("/nft/{token_id}", get(get_nft))
}
