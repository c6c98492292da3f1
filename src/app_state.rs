//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::persistence::EventStore;
use crate::rpc::ChainClient;
use crate::service::QueryService;

/// The concrete query service wired at startup.
pub type AppQueryService = QueryService<EventStore, ChainClient>;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Dual-source query service for all read capabilities.
    pub query: Arc<AppQueryService>,
}
