//! PostgreSQL implementation of the event-store adapter.
//!
//! Reads the `Extractions` table owned by the external indexing
//! pipeline. The table is append-only from this crate's point of view:
//! the gateway only ever selects from it.

use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::{EventFilter, EventSource};
use crate::config::GatewayConfig;
use crate::domain::EventRow;
use crate::error::GatewayError;

/// PostgreSQL-backed event store using `sqlx::PgPool`.
///
/// The pool is established once at process start and shared across
/// requests; pool exhaustion manifests as acquire timeouts on
/// individual queries, never as a crash.
#[derive(Debug, Clone)]
pub struct EventStore {
    pool: PgPool,
}

impl EventStore {
    /// Connects to the indexer database and validates the connection
    /// with a `SELECT 1`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Database`] if the pool cannot be
    /// established or the validation query fails.
    pub async fn connect(url: &str, config: &GatewayConfig) -> Result<Self, GatewayError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(url)
            .await
            .map_err(|e| GatewayError::Database(e.to_string()))?;

        sqlx::query("SELECT 1")
            .execute(&pool)
            .await
            .map_err(|e| GatewayError::Database(e.to_string()))?;

        Ok(Self { pool })
    }

    /// Closes the connection pool. Called once at shutdown.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

impl EventSource for EventStore {
    async fn fetch(&self, filter: &EventFilter) -> Result<Vec<EventRow>, GatewayError> {
        let mut sql = String::from(
            "SELECT id, address, name, \"blockHeight\", \"blockTimeUnixMs\", \"txHash\", data \
             FROM \"Extractions\" WHERE address = ANY($1)",
        );
        let mut next_param = 2;

        let has_names = !filter.names.is_empty();
        let has_prefixes = !filter.name_prefixes.is_empty();
        if has_names && has_prefixes {
            sql.push_str(&format!(
                " AND (name = ANY(${}) OR name LIKE ANY(${}))",
                next_param,
                next_param + 1
            ));
            next_param += 2;
        } else if has_names {
            sql.push_str(&format!(" AND name = ANY(${next_param})"));
            next_param += 1;
        } else if has_prefixes {
            sql.push_str(&format!(" AND name LIKE ANY(${next_param})"));
            next_param += 1;
        }

        if filter.token_id.is_some() {
            sql.push_str(&format!(" AND data->>'token_id' = ${next_param}"));
            next_param += 1;
        }

        sql.push_str(" ORDER BY \"blockTimeUnixMs\" DESC, id DESC");

        if filter.limit.is_some() {
            sql.push_str(&format!(" LIMIT ${next_param}"));
            next_param += 1;
        }
        if filter.offset.is_some() {
            sql.push_str(&format!(" OFFSET ${next_param}"));
        }

        let patterns: Vec<String> = filter
            .name_prefixes
            .iter()
            .map(|p| format!("{p}%"))
            .collect();

        let mut query = sqlx::query_as::<_, (i64, String, String, i64, i64, String, serde_json::Value)>(
            &sql,
        )
        .bind(&filter.addresses);

        if has_names && has_prefixes {
            query = query.bind(&filter.names).bind(&patterns);
        } else if has_names {
            query = query.bind(&filter.names);
        } else if has_prefixes {
            query = query.bind(&patterns);
        }
        if let Some(token_id) = &filter.token_id {
            query = query.bind(token_id);
        }
        if let Some(limit) = filter.limit {
            query = query.bind(limit);
        }
        if let Some(offset) = filter.offset {
            query = query.bind(offset);
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| GatewayError::Database(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(
                |(id, address, name, block_height, block_time_ms, tx_hash, data)| EventRow {
                    id,
                    address,
                    name,
                    block_height,
                    block_time_ms,
                    tx_hash,
                    data,
                },
            )
            .collect())
    }
}
