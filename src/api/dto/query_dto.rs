//! Query-parameter structs for the read endpoints.

use serde::Deserialize;
use utoipa::IntoParams;

/// Source-selection parameters accepted by every data endpoint.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct SourceParams {
    /// `"rpc"` forces the chain-RPC path, skipping the indexer.
    #[serde(default)]
    pub source: Option<String>,
    /// Overrides the configured asset contract address.
    #[serde(default, rename = "assetContract")]
    pub asset_contract: Option<String>,
}

impl SourceParams {
    /// Whether the caller forced the RPC path.
    #[must_use]
    pub fn force_rpc(&self) -> bool {
        self.source.as_deref() == Some("rpc")
    }

    /// The asset-contract override, if any.
    #[must_use]
    pub fn contract(&self) -> Option<&str> {
        self.asset_contract.as_deref()
    }
}

/// Pagination parameters for the activity feed.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ActivityParams {
    /// Maximum entries to return (1–100). Defaults to 50.
    #[serde(default)]
    pub limit: Option<usize>,
    /// Entries to skip. Defaults to 0.
    #[serde(default)]
    pub offset: Option<usize>,
    /// `"rpc"` forces the chain-RPC path.
    #[serde(default)]
    pub source: Option<String>,
    /// Overrides the configured asset contract address.
    #[serde(default, rename = "assetContract")]
    pub asset_contract: Option<String>,
}

impl ActivityParams {
    /// The clamped `(limit, offset)` window.
    #[must_use]
    pub fn window(&self) -> (usize, usize) {
        (
            self.limit.unwrap_or(50).clamp(1, 100),
            self.offset.unwrap_or(0),
        )
    }

    /// Whether the caller forced the RPC path.
    #[must_use]
    pub fn force_rpc(&self) -> bool {
        self.source.as_deref() == Some("rpc")
    }

    /// The asset-contract override, if any.
    #[must_use]
    pub fn contract(&self) -> Option<&str> {
        self.asset_contract.as_deref()
    }
}

/// Pagination parameters for the all-NFTs view.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct NftListParams {
    /// Maximum tokens to return (1–500). Defaults to 100.
    #[serde(default)]
    pub limit: Option<usize>,
    /// Tokens to skip. Defaults to 0. Ignored on the RPC path.
    #[serde(default)]
    pub offset: Option<usize>,
    /// `"rpc"` forces the chain-RPC path.
    #[serde(default)]
    pub source: Option<String>,
    /// Overrides the configured asset contract address.
    #[serde(default, rename = "assetContract")]
    pub asset_contract: Option<String>,
}

impl NftListParams {
    /// The clamped `(limit, offset)` window.
    #[must_use]
    pub fn window(&self) -> (usize, usize) {
        (
            self.limit.unwrap_or(100).clamp(1, 500),
            self.offset.unwrap_or(0),
        )
    }

    /// Whether the caller forced the RPC path.
    #[must_use]
    pub fn force_rpc(&self) -> bool {
        self.source.as_deref() == Some("rpc")
    }

    /// The asset-contract override, if any.
    #[must_use]
    pub fn contract(&self) -> Option<&str> {
        self.asset_contract.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activity_window_defaults_and_clamps() {
        let params = ActivityParams::default();
        assert_eq!(params.window(), (50, 0));

        let params = ActivityParams {
            limit: Some(5_000),
            offset: Some(10),
            ..ActivityParams::default()
        };
        assert_eq!(params.window(), (100, 10));

        let params = ActivityParams {
            limit: Some(0),
            ..ActivityParams::default()
        };
        assert_eq!(params.window().0, 1);
    }

    #[test]
    fn nft_window_defaults_and_clamps() {
        assert_eq!(NftListParams::default().window(), (100, 0));
        let params = NftListParams {
            limit: Some(9_999),
            offset: Some(20),
            ..NftListParams::default()
        };
        assert_eq!(params.window(), (500, 20));
    }

    #[test]
    fn only_rpc_forces_the_source() {
        let params = SourceParams {
            source: Some("rpc".to_string()),
            asset_contract: None,
        };
        assert!(params.force_rpc());

        let params = SourceParams {
            source: Some("indexer".to_string()),
            asset_contract: None,
        };
        assert!(!params.force_rpc());
        assert!(!SourceParams::default().force_rpc());
    }
}
