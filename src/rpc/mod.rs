//! RPC fallback client: direct chain-node queries.
//!
//! When the event store is unavailable (or lagging), the same
//! projections are answered by the chain itself: listings, ownership,
//! and token metadata come from smart-contract queries — the contract
//! maintains that state, so this path reshapes rather than projects —
//! and activity is reconstructed from raw transaction events via
//! `tx_search`.

pub mod client;
pub mod tx_events;

use std::future::Future;

use crate::domain::{ActivityItem, ListingInfo, NftDetails, NftWithListing, OfferInfo};
use crate::error::GatewayError;

pub use client::ChainClient;

/// A chain node able to answer the gateway's read capabilities
/// directly.
///
/// `asset_contract` parameters override the configured asset contract
/// when provided (the `?assetContract=` query parameter).
pub trait ChainSource: Send + Sync {
    /// Activity reconstructed from raw transactions. Timestamps are
    /// approximated from block heights and are not comparable in
    /// absolute terms to indexer timestamps.
    fn activity(
        &self,
        limit: usize,
        offset: usize,
        asset_contract: Option<&str>,
    ) -> impl Future<Output = Result<Vec<ActivityItem>, GatewayError>> + Send;

    /// Active listings from the contract's `get_all_listings` query.
    fn listings(
        &self,
        asset_contract: Option<&str>,
    ) -> impl Future<Output = Result<Vec<ListingInfo>, GatewayError>> + Send;

    /// Open offers for a token. The contract exposes no list-all-offers
    /// query, so this always returns empty: callers must treat the
    /// absence of RPC-sourced offers as "unknown", not "none".
    fn offers(
        &self,
        token_id: &str,
    ) -> impl Future<Output = Result<Vec<OfferInfo>, GatewayError>> + Send;

    /// Metadata and ownership for one token, or `None` when the
    /// contract does not know it.
    fn nft(
        &self,
        token_id: &str,
        asset_contract: Option<&str>,
    ) -> impl Future<Output = Result<Option<NftDetails>, GatewayError>> + Send;

    /// All minted tokens with listing status.
    fn all_nfts(
        &self,
        limit: usize,
        asset_contract: Option<&str>,
    ) -> impl Future<Output = Result<Vec<NftWithListing>, GatewayError>> + Send;

    /// A user's active listings, with NFT metadata.
    fn user_listings(
        &self,
        address: &str,
        asset_contract: Option<&str>,
    ) -> impl Future<Output = Result<Vec<ListingInfo>, GatewayError>> + Send;

    /// A user's owned tokens.
    fn user_nfts(
        &self,
        address: &str,
        asset_contract: Option<&str>,
    ) -> impl Future<Output = Result<Vec<NftDetails>, GatewayError>> + Send;
}
