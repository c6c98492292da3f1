//! Event-store adapter: the PostgreSQL event log written by the
//! external indexing pipeline.
//!
//! Provides the [`EventSource`] trait for fetching raw event rows and
//! the concrete [`EventStore`] implementation over `sqlx::PgPool`. The
//! adapter returns rows; all state derivation happens in
//! [`crate::domain::projector`].

pub mod postgres;

use std::future::Future;

use crate::domain::EventRow;
use crate::error::GatewayError;

pub use postgres::EventStore;

/// Row filter for event-log queries: a contract address set, an
/// event-name allowlist (exact names and/or prefixes), an optional
/// payload token-id restriction, and optional pagination.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Contract addresses to match (`address = ANY(...)`).
    pub addresses: Vec<String>,
    /// Exact event names to match.
    pub names: Vec<String>,
    /// Event-name prefixes to match (e.g. `"marketplace/"`).
    pub name_prefixes: Vec<String>,
    /// Restrict to rows whose payload `token_id` equals this value.
    pub token_id: Option<String>,
    /// Maximum number of rows to return.
    pub limit: Option<i64>,
    /// Number of rows to skip.
    pub offset: Option<i64>,
}

impl EventFilter {
    /// Creates a filter over the given contract addresses.
    #[must_use]
    pub fn for_contracts(addresses: Vec<String>) -> Self {
        Self {
            addresses,
            ..Self::default()
        }
    }

    /// Sets the exact-name allowlist.
    #[must_use]
    pub fn names(mut self, names: &[&str]) -> Self {
        self.names = names.iter().map(|n| (*n).to_string()).collect();
        self
    }

    /// Sets the name-prefix allowlist.
    #[must_use]
    pub fn prefixes(mut self, prefixes: &[&str]) -> Self {
        self.name_prefixes = prefixes.iter().map(|p| (*p).to_string()).collect();
        self
    }

    /// Restricts rows to one token id.
    #[must_use]
    pub fn token(mut self, token_id: &str) -> Self {
        self.token_id = Some(token_id.to_string());
        self
    }

    /// Applies limit/offset pagination.
    #[must_use]
    pub const fn page(mut self, limit: i64, offset: i64) -> Self {
        self.limit = Some(limit);
        self.offset = Some(offset);
        self
    }

    /// Whether an event name passes this filter's name allowlists.
    /// Used by in-memory implementations; the SQL adapter expresses the
    /// same predicate in the query.
    #[must_use]
    pub fn matches_name(&self, name: &str) -> bool {
        if self.names.is_empty() && self.name_prefixes.is_empty() {
            return true;
        }
        self.names.iter().any(|n| n == name)
            || self.name_prefixes.iter().any(|p| name.starts_with(p.as_str()))
    }
}

/// A queryable append-only event log.
///
/// Implementations return rows ordered newest-first by
/// `(block_time_ms, id)`. Query failures surface as
/// [`GatewayError::Database`], which the query service interprets as
/// "try the RPC fallback".
pub trait EventSource: Send + Sync {
    /// Fetches event rows matching `filter`, newest first.
    fn fetch(
        &self,
        filter: &EventFilter,
    ) -> impl Future<Output = Result<Vec<EventRow>, GatewayError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_allowlists_match_everything() {
        let filter = EventFilter::for_contracts(vec!["c".to_string()]);
        assert!(filter.matches_name("asset/mint"));
    }

    #[test]
    fn names_and_prefixes_combine_as_a_union() {
        let filter = EventFilter::default()
            .names(&["asset/mint"])
            .prefixes(&["marketplace/"]);
        assert!(filter.matches_name("asset/mint"));
        assert!(filter.matches_name("marketplace/list-item"));
        assert!(!filter.matches_name("asset/burn"));
    }
}
