//! Event rows and event-name classification.
//!
//! An [`EventRow`] is one record of the append-only on-chain event log
//! produced by the external indexing pipeline. Rows are immutable once
//! written; their ordering key is `(block_time_ms, id)`.

use serde::Serialize;

use super::payload::EventPayload;

/// One append-only event record from the `Extractions` table (or an
/// in-memory equivalent in tests).
#[derive(Debug, Clone)]
pub struct EventRow {
    /// Auto-increment row ID; tie-breaker for equal block times.
    pub id: i64,
    /// Emitting contract address.
    pub address: String,
    /// Event type string, e.g. `"asset/mint"` or
    /// `"marketplace/list-item"`.
    pub name: String,
    /// Block height the event was emitted at.
    pub block_height: i64,
    /// Block timestamp in Unix milliseconds.
    pub block_time_ms: i64,
    /// Hash of the transaction that produced the event.
    pub tx_hash: String,
    /// Opaque JSON payload whose shape depends on `name`.
    pub data: serde_json::Value,
}

impl EventRow {
    /// Decodes the raw payload for this row's event name.
    #[must_use]
    pub fn payload(&self) -> EventPayload {
        EventPayload::decode(&self.name, &self.data)
    }

    /// Ordering key: block time first, row id breaks exact ties.
    ///
    /// Ties should not occur given monotonic block timestamps, but when
    /// they do the higher row id wins deterministically.
    #[must_use]
    pub const fn recency(&self) -> (i64, i64) {
        (self.block_time_ms, self.id)
    }
}

/// Events that create or end a listing. The latest of these per token
/// decides whether the token is currently listed.
pub const LISTING_LIFECYCLE_EVENTS: &[&str] = &[
    "marketplace/list-item",
    "marketplace/delist-item",
    "marketplace/cancel-listing",
    "marketplace/item-sold",
    "marketplace/buy",
    "asset/list",
    "asset/delist",
    "asset/buy",
];

/// The subset of lifecycle events that open a listing.
pub const LISTING_CREATE_EVENTS: &[&str] = &["marketplace/list-item", "asset/list"];

/// Events that change (or establish) a token's owner.
pub const OWNERSHIP_EVENTS: &[&str] = &[
    "asset/mint",
    "asset/transfer_nft",
    "asset/transfer",
    "asset/send_nft",
    "marketplace/item-sold",
    "marketplace/buy",
];

/// The mint event name.
pub const MINT_EVENT: &str = "asset/mint";

/// Event that opens an offer.
pub const OFFER_CREATE_EVENT: &str = "marketplace/create-offer";

/// Events that close an offer. Closure is monotonic per offer id.
pub const OFFER_CLOSE_EVENTS: &[&str] = &[
    "marketplace/accept-offer",
    "marketplace/reject-offer",
    "marketplace/cancel-offer",
];

/// Exact event names included in the activity feed (besides the
/// prefix-matched families below).
pub const ACTIVITY_EVENTS: &[&str] = &["asset/mint", "asset/list", "asset/delist", "asset/buy"];

/// Event-name prefixes included in the activity feed.
pub const ACTIVITY_PREFIXES: &[&str] = &["marketplace/", "asset/transfer"];

/// Category of an activity feed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    /// A token was minted.
    Mint,
    /// A token was listed for sale.
    List,
    /// A listing was removed or cancelled.
    Delist,
    /// A token was purchased.
    Buy,
    /// An offer was created.
    Offer,
    /// A token changed hands outside a sale.
    Transfer,
    /// An offer was accepted.
    AcceptOffer,
    /// An offer was rejected.
    RejectOffer,
    /// An offer was cancelled by the bidder.
    CancelOffer,
    /// A listing price was updated.
    PriceUpdate,
    /// Administrative or unrecognized contract event.
    Admin,
}

impl ActivityKind {
    /// Maps an event name to its activity category. Returns `None` for
    /// names outside the fixed table; callers default those to
    /// [`ActivityKind::Admin`].
    #[must_use]
    pub fn from_event_name(name: &str) -> Option<Self> {
        match name {
            "marketplace/list-item" | "asset/list" => Some(Self::List),
            "marketplace/delist-item" | "marketplace/cancel-listing" | "asset/delist" => {
                Some(Self::Delist)
            }
            "marketplace/item-sold" | "marketplace/buy" | "asset/buy" => Some(Self::Buy),
            "marketplace/create-offer" | "marketplace/pending-sale-created" => Some(Self::Offer),
            "marketplace/cancel-offer" => Some(Self::CancelOffer),
            "marketplace/accept-offer" | "marketplace/sale-approved" => Some(Self::AcceptOffer),
            "marketplace/reject-offer" | "marketplace/sale-rejected" => Some(Self::RejectOffer),
            "marketplace/update-price" => Some(Self::PriceUpdate),
            "asset/mint" => Some(Self::Mint),
            "asset/transfer_nft" | "asset/transfer" | "asset/send_nft" => Some(Self::Transfer),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_create_subset_is_contained_in_lifecycle() {
        for name in LISTING_CREATE_EVENTS {
            assert!(LISTING_LIFECYCLE_EVENTS.contains(name));
        }
    }

    #[test]
    fn known_names_map_to_kinds() {
        assert_eq!(
            ActivityKind::from_event_name("asset/mint"),
            Some(ActivityKind::Mint)
        );
        assert_eq!(
            ActivityKind::from_event_name("marketplace/item-sold"),
            Some(ActivityKind::Buy)
        );
        assert_eq!(
            ActivityKind::from_event_name("marketplace/sale-approved"),
            Some(ActivityKind::AcceptOffer)
        );
    }

    #[test]
    fn unknown_names_map_to_none() {
        assert_eq!(ActivityKind::from_event_name("marketplace/set-config"), None);
        assert_eq!(ActivityKind::from_event_name(""), None);
    }

    #[test]
    fn recency_breaks_ties_on_row_id() {
        let mut a = EventRow {
            id: 1,
            address: "x".to_string(),
            name: "asset/mint".to_string(),
            block_height: 10,
            block_time_ms: 1_000,
            tx_hash: "A".to_string(),
            data: serde_json::Value::Null,
        };
        let mut b = a.clone();
        b.id = 2;
        assert!(b.recency() > a.recency());
        a.block_time_ms = 2_000;
        assert!(a.recency() > b.recency());
    }
}
