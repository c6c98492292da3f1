//! Shared DTO types used across multiple endpoints.

use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::DataSource;
use crate::service::Sourced;

/// Source-tagged response envelope.
///
/// Every successful data endpoint wraps its payload in this shape so
/// clients always know which backend produced the answer:
/// ```json
/// {
///   "data": [...],
///   "source": "indexer",
///   "timestamp": 1748779200000
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    /// The payload.
    pub data: T,
    /// Which backend answered this request.
    pub source: DataSource,
    /// Server time the response was produced (Unix milliseconds).
    pub timestamp: i64,
}

impl<T: Serialize> From<Sourced<T>> for ApiResponse<T> {
    fn from(sourced: Sourced<T>) -> Self {
        Self {
            data: sourced.data,
            source: sourced.source,
            timestamp: Utc::now().timestamp_millis(),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Always `"ok"` when the process is serving.
    pub status: String,
    /// The backend currently preferred for reads.
    pub data_source: DataSource,
    /// Whether an indexer database is configured.
    pub indexer_available: bool,
    /// Effective backend configuration.
    pub config: HealthConfig,
    /// Server time the response was produced (Unix milliseconds).
    pub timestamp: i64,
    /// Crate version.
    pub version: String,
}

/// Backend configuration echoed by the health endpoint.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthConfig {
    /// CW721 asset contract address.
    pub asset_contract: String,
    /// Marketplace contract address.
    pub marketplace_contract: String,
    /// RPC endpoint used for fallback queries.
    pub rpc_endpoint: String,
}

impl HealthResponse {
    /// Builds the health report: the preferred read backend is the
    /// indexer when one is configured, otherwise RPC.
    #[must_use]
    pub fn report(indexer_available: bool, config: &crate::config::GatewayConfig) -> Self {
        Self {
            status: "ok".to_string(),
            data_source: if indexer_available {
                DataSource::Indexer
            } else {
                DataSource::Rpc
            },
            indexer_available,
            config: HealthConfig {
                asset_contract: config.asset_contract.clone(),
                marketplace_contract: config.marketplace_contract.clone(),
                rpc_endpoint: config.rpc_endpoint.clone(),
            },
            timestamp: Utc::now().timestamp_millis(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use super::*;
    use crate::config::GatewayConfig;

    fn config() -> GatewayConfig {
        GatewayConfig {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 3001)),
            indexer_db_url: None,
            database_max_connections: 10,
            database_min_connections: 2,
            database_connect_timeout_secs: 5,
            rpc_endpoint: "http://localhost:26657".to_string(),
            asset_contract: "xion1asset".to_string(),
            marketplace_contract: "xion1market".to_string(),
            default_denom: "uxion".to_string(),
            avg_block_time_ms: 6_000,
            rpc_query_limit: 100,
        }
    }

    #[test]
    fn health_without_indexer_prefers_rpc() {
        let health = HealthResponse::report(false, &config());
        assert_eq!(health.status, "ok");
        assert!(!health.indexer_available);
        assert_eq!(health.data_source, DataSource::Rpc);
        assert_eq!(health.config.rpc_endpoint, "http://localhost:26657");
        assert_eq!(health.config.asset_contract, "xion1asset");
    }

    #[test]
    fn health_with_indexer_prefers_it() {
        let health = HealthResponse::report(true, &config());
        assert!(health.indexer_available);
        assert_eq!(health.data_source, DataSource::Indexer);
    }
}
