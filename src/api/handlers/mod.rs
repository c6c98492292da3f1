//! REST endpoint handlers organized by resource.

pub mod marketplace;
pub mod nfts;
pub mod system;
pub mod users;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(marketplace::routes())
        .merge(nfts::routes())
        .merge(users::routes())
        .merge(system::routes())
}
