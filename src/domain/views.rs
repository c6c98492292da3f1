//! Derived current-state views.
//!
//! These are the shapes the read API returns. All of them are
//! recomputed on every query by folding the event log (or reshaping
//! chain-query results); nothing here is cached server-side.

use serde::Serialize;
use utoipa::ToSchema;

use super::event::ActivityKind;

/// Which backend produced a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    /// The PostgreSQL event indexer.
    Indexer,
    /// A live chain node queried over RPC.
    Rpc,
}

/// An active listing: a token currently for sale at a fixed price.
///
/// At most one active listing exists per token id.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListingInfo {
    /// Listed token id.
    pub token_id: String,
    /// Seller address.
    pub seller: String,
    /// Asking price (integer string).
    pub price: String,
    /// Price denomination.
    pub denom: String,
    /// Listing timestamp in Unix milliseconds.
    pub listed_at: i64,
    /// Transaction that created the listing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    /// NFT display name (populated for user-listing views).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// NFT image URI (populated for user-listing views).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// An open offer (bid) on a token.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OfferInfo {
    /// Offer identifier.
    pub offer_id: String,
    /// Token the offer is for.
    pub token_id: String,
    /// Bidding address.
    pub bidder: String,
    /// Offered price (integer string).
    pub price: String,
    /// Price denomination.
    pub denom: String,
    /// Offer creation timestamp in Unix milliseconds.
    pub created_at: i64,
    /// Transaction that created the offer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
}

/// Metadata and current ownership of a minted token.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NftDetails {
    /// Token id.
    pub token_id: String,
    /// Display name, synthesized as `"Token #<id>"` when absent.
    pub name: String,
    /// Description from the mint metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Image URI from the mint metadata.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Current owner address.
    pub owner: String,
    /// Off-chain metadata URI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_uri: Option<String>,
    /// Mint timestamp in Unix milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minted_at: Option<i64>,
    /// Transaction that minted the token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mint_tx_hash: Option<String>,
}

impl NftDetails {
    /// Minimal placeholder used when a per-token detail fetch fails in
    /// a bulk view: the token is still reported, with a synthesized
    /// name and whatever ownership information the caller has.
    #[must_use]
    pub fn placeholder(token_id: &str, owner: &str) -> Self {
        Self {
            token_id: token_id.to_string(),
            name: format!("Token #{token_id}"),
            description: None,
            image: None,
            owner: owner.to_string(),
            token_uri: None,
            minted_at: None,
            mint_tx_hash: None,
        }
    }
}

/// An [`NftDetails`] annotated with its current listing status.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NftWithListing {
    /// Token metadata and ownership.
    #[serde(flatten)]
    pub nft: NftDetails,
    /// Whether the token is currently listed.
    pub is_listed: bool,
    /// Asking price when listed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    /// Price denomination when listed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub denom: Option<String>,
    /// Listing timestamp when listed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listed_at: Option<i64>,
}

/// One entry of the activity feed.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivityItem {
    /// Stable identifier (event-store row id, or a synthesized
    /// `<tx>-<action>-<token>` id on the RPC path).
    pub id: String,
    /// Activity category.
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    /// Token id the activity refers to (empty when not applicable).
    pub token_id: String,
    /// Originating address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// Receiving address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    /// Price involved, when any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    /// Price denomination, when any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub denom: Option<String>,
    /// Event timestamp in Unix milliseconds. RPC-sourced entries carry
    /// a block-height approximation, not comparable in absolute terms
    /// to indexer timestamps.
    pub timestamp: i64,
    /// Transaction hash.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    /// Block height, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_height: Option<i64>,
    /// Human-readable summary (RPC-sourced entries only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
