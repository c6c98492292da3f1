//! Gateway configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`). The indexer database URL is the only
//! genuinely optional setting — leaving it unset is a documented state in
//! which every read is served from the chain-RPC fallback.

use std::net::SocketAddr;

use anyhow::Context;

/// Top-level gateway configuration.
///
/// Loaded once at startup via [`GatewayConfig::from_env`].
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:3001`).
    pub listen_addr: SocketAddr,

    /// PostgreSQL connection string for the event-indexer database.
    /// `None` means the indexer adapter is unavailable (not an error).
    pub indexer_db_url: Option<String>,

    /// Maximum number of database connections in the pool.
    pub database_max_connections: u32,

    /// Minimum idle connections in the pool.
    pub database_min_connections: u32,

    /// Timeout in seconds for acquiring a database connection.
    pub database_connect_timeout_secs: u64,

    /// Tendermint RPC endpoint for fallback queries.
    pub rpc_endpoint: String,

    /// CW721 asset contract address.
    pub asset_contract: String,

    /// Marketplace contract address.
    pub marketplace_contract: String,

    /// Default denomination when a payload omits one.
    pub default_denom: String,

    /// Average block duration in milliseconds, used to approximate
    /// timestamps on the RPC activity path.
    pub avg_block_time_ms: i64,

    /// Page size for chain smart-contract queries.
    pub rpc_query_limit: u32,
}

impl GatewayConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to sensible defaults when a variable is not set.
    /// Calls `dotenvy::dotenv().ok()` to optionally load a `.env` file.
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` is set but cannot be parsed as
    /// a [`SocketAddr`].
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let listen_addr: SocketAddr = std::env::var("LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3001".to_string())
            .parse()
            .context("invalid LISTEN_ADDR")?;

        let indexer_db_url = std::env::var("INDEXER_DB_URL")
            .ok()
            .filter(|url| !url.is_empty());

        let database_max_connections = parse_env("DATABASE_MAX_CONNECTIONS", 10);
        let database_min_connections = parse_env("DATABASE_MIN_CONNECTIONS", 2);
        let database_connect_timeout_secs = parse_env("DATABASE_CONNECT_TIMEOUT_SECS", 5);

        let rpc_endpoint = std::env::var("RPC_ENDPOINT")
            .unwrap_or_else(|_| "https://rpc.xion-testnet-2.burnt.com:443".to_string());

        let asset_contract = std::env::var("ASSET_CONTRACT").unwrap_or_default();
        let marketplace_contract = std::env::var("MARKETPLACE_CONTRACT").unwrap_or_default();
        let default_denom =
            std::env::var("DEFAULT_DENOM").unwrap_or_else(|_| "uxion".to_string());

        let avg_block_time_ms = parse_env("AVG_BLOCK_TIME_MS", 6_000);
        let rpc_query_limit = parse_env("RPC_QUERY_LIMIT", 100);

        Ok(Self {
            listen_addr,
            indexer_db_url,
            database_max_connections,
            database_min_connections,
            database_connect_timeout_secs,
            rpc_endpoint,
            asset_contract,
            marketplace_contract,
            default_denom,
            avg_block_time_ms,
            rpc_query_limit,
        })
    }

    /// Contract addresses relevant for event-log queries, skipping
    /// unconfigured (empty) ones.
    #[must_use]
    pub fn contract_addresses(&self) -> Vec<String> {
        [&self.asset_contract, &self.marketplace_contract]
            .into_iter()
            .filter(|addr| !addr.is_empty())
            .cloned()
            .collect()
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_env_falls_back_on_missing() {
        assert_eq!(parse_env("MARKETPLACE_GATEWAY_TEST_UNSET", 42_u32), 42);
    }

    #[test]
    fn contract_addresses_skip_empty() {
        let config = GatewayConfig {
            listen_addr: "0.0.0.0:3001".parse().unwrap_or_else(|_| unreachable!()),
            indexer_db_url: None,
            database_max_connections: 10,
            database_min_connections: 2,
            database_connect_timeout_secs: 5,
            rpc_endpoint: String::new(),
            asset_contract: "xion1asset".to_string(),
            marketplace_contract: String::new(),
            default_denom: "uxion".to_string(),
            avg_block_time_ms: 6_000,
            rpc_query_limit: 100,
        };
        assert_eq!(config.contract_addresses(), vec!["xion1asset".to_string()]);
    }
}
