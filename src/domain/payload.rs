//! Typed event payloads.
//!
//! Raw event payloads are opaque JSON whose shape depends on the event
//! name. Instead of optimistic property access deep in the projection
//! logic, each row is decoded once at the boundary into an
//! [`EventPayload`] variant keyed by the event name. Decoding fails
//! closed: unknown fields are ignored, and a payload missing a required
//! field (or carrying the wrong types) degrades to
//! [`EventPayload::Unknown`], which typed projections skip.

use serde::Deserialize;

use super::coin::{Coin, RawPrice};
use super::event::{
    LISTING_LIFECYCLE_EVENTS, MINT_EVENT, OFFER_CLOSE_EVENTS, OFFER_CREATE_EVENT,
};

/// Nested NFT metadata carried by mint events (`extension` sub-object).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NftExtension {
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Image URI.
    #[serde(default)]
    pub image: Option<String>,
}

/// Payload of an `asset/mint` event.
#[derive(Debug, Clone, Deserialize)]
pub struct MintPayload {
    /// Minted token id.
    #[serde(alias = "tokenId")]
    pub token_id: String,
    /// Initial owner.
    #[serde(default)]
    pub owner: Option<String>,
    /// Off-chain metadata URI.
    #[serde(default)]
    pub token_uri: Option<String>,
    /// Top-level display name (takes priority over the extension).
    #[serde(default)]
    pub name: Option<String>,
    /// Top-level description.
    #[serde(default)]
    pub description: Option<String>,
    /// Top-level image URI.
    #[serde(default)]
    pub image: Option<String>,
    /// Nested metadata object.
    #[serde(default)]
    pub extension: Option<NftExtension>,
}

impl MintPayload {
    /// Display name: top-level, then extension, then `"Token #<id>"`.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .or_else(|| self.extension.as_ref().and_then(|e| e.name.clone()))
            .unwrap_or_else(|| format!("Token #{}", self.token_id))
    }

    /// Description, resolved through the extension.
    #[must_use]
    pub fn resolved_description(&self) -> Option<String> {
        self.description
            .clone()
            .or_else(|| self.extension.as_ref().and_then(|e| e.description.clone()))
    }

    /// Image URI, resolved through the extension.
    #[must_use]
    pub fn resolved_image(&self) -> Option<String> {
        self.image
            .clone()
            .or_else(|| self.extension.as_ref().and_then(|e| e.image.clone()))
    }
}

/// Payload of a transfer-family event (`asset/transfer_nft`,
/// `asset/transfer`, `asset/send_nft`).
#[derive(Debug, Clone, Deserialize)]
pub struct TransferPayload {
    /// Transferred token id.
    #[serde(alias = "tokenId")]
    pub token_id: String,
    /// Sending address.
    #[serde(default, alias = "sender")]
    pub from: Option<String>,
    /// Receiving address.
    #[serde(default)]
    pub to: Option<String>,
    /// Alternate receiving address key used by `send_nft`.
    #[serde(default)]
    pub recipient: Option<String>,
}

/// Payload of a listing-lifecycle event (list, delist, cancel, sold,
/// buy — on either the marketplace or the asset contract).
#[derive(Debug, Clone, Deserialize)]
pub struct ListingPayload {
    /// Token id the lifecycle event refers to.
    #[serde(alias = "tokenId")]
    pub token_id: String,
    /// Seller address.
    #[serde(default)]
    pub seller: Option<String>,
    /// Alternate seller key used by some contract versions.
    #[serde(default)]
    pub owner: Option<String>,
    /// Buyer address (sale events only).
    #[serde(default)]
    pub buyer: Option<String>,
    /// Listing or sale price in either raw shape.
    #[serde(default)]
    pub price: Option<RawPrice>,
    /// Denomination when the price is a bare amount.
    #[serde(default)]
    pub denom: Option<String>,
}

impl ListingPayload {
    /// Seller address, falling back to the `owner` key.
    #[must_use]
    pub fn seller_address(&self) -> Option<&str> {
        self.seller.as_deref().or(self.owner.as_deref())
    }
}

/// Payload of an offer-lifecycle event (create, accept, reject,
/// cancel).
#[derive(Debug, Clone, Deserialize)]
pub struct OfferPayload {
    /// Offer identifier; close events reference the same id.
    #[serde(alias = "offerId")]
    pub offer_id: String,
    /// Token the offer is for (create events).
    #[serde(default, alias = "tokenId")]
    pub token_id: Option<String>,
    /// Bidding address.
    #[serde(default)]
    pub bidder: Option<String>,
    /// Offered price.
    #[serde(default)]
    pub price: Option<RawPrice>,
    /// Denomination when the price is a bare amount.
    #[serde(default)]
    pub denom: Option<String>,
}

/// Tagged union of event payloads, keyed by the event-name string.
#[derive(Debug, Clone)]
pub enum EventPayload {
    /// `asset/mint`.
    Mint(MintPayload),
    /// Transfer-family events.
    Transfer(TransferPayload),
    /// Listing-lifecycle events.
    Listing(ListingPayload),
    /// Offer-lifecycle events.
    Offer(OfferPayload),
    /// Unrecognized event name, or a recognized name whose payload
    /// failed schema validation. Keeps the raw JSON for best-effort
    /// activity rendering.
    Unknown(serde_json::Value),
}

const TRANSFER_EVENTS: &[&str] = &["asset/transfer_nft", "asset/transfer", "asset/send_nft"];

impl EventPayload {
    /// Decodes `data` according to the schema selected by `name`.
    #[must_use]
    pub fn decode(name: &str, data: &serde_json::Value) -> Self {
        if name == MINT_EVENT {
            return decode_as(data, Self::Mint);
        }
        if TRANSFER_EVENTS.contains(&name) {
            return decode_as(data, Self::Transfer);
        }
        if LISTING_LIFECYCLE_EVENTS.contains(&name) {
            return decode_as(data, Self::Listing);
        }
        if name == OFFER_CREATE_EVENT || OFFER_CLOSE_EVENTS.contains(&name) {
            return decode_as(data, Self::Offer);
        }
        Self::Unknown(data.clone())
    }

    /// Token id, when the payload carries one.
    #[must_use]
    pub fn token_id(&self) -> Option<&str> {
        match self {
            Self::Mint(p) => Some(&p.token_id),
            Self::Transfer(p) => Some(&p.token_id),
            Self::Listing(p) => Some(&p.token_id),
            Self::Offer(p) => p.token_id.as_deref(),
            Self::Unknown(v) => v
                .get("token_id")
                .or_else(|| v.get("tokenId"))
                .and_then(serde_json::Value::as_str),
        }
    }

    /// Address that owns the token after this event, checked at the
    /// fixed priority `to` > `recipient` > `buyer` > `owner`.
    #[must_use]
    pub fn owner_after(&self) -> Option<&str> {
        match self {
            Self::Mint(p) => p.owner.as_deref(),
            Self::Transfer(p) => p.to.as_deref().or(p.recipient.as_deref()),
            Self::Listing(p) => p.buyer.as_deref().or(p.owner.as_deref()),
            Self::Offer(_) | Self::Unknown(_) => None,
        }
    }

    /// Normalized price, preferring the structured form and defaulting
    /// the denomination to `default_denom`.
    #[must_use]
    pub fn coin(&self, default_denom: &str) -> Option<Coin> {
        let (price, denom) = match self {
            Self::Listing(p) => (p.price.as_ref()?, p.denom.as_deref()),
            Self::Offer(p) => (p.price.as_ref()?, p.denom.as_deref()),
            _ => return None,
        };
        Some(price.normalize(denom.unwrap_or(default_denom)))
    }

    /// Originating address for the activity feed.
    #[must_use]
    pub fn activity_from(&self) -> Option<&str> {
        match self {
            Self::Mint(_) => None,
            Self::Transfer(p) => p.from.as_deref(),
            Self::Listing(p) => p.seller_address(),
            Self::Offer(p) => p.bidder.as_deref(),
            Self::Unknown(v) => v
                .get("seller")
                .or_else(|| v.get("from"))
                .or_else(|| v.get("owner"))
                .and_then(serde_json::Value::as_str),
        }
    }

    /// Receiving address for the activity feed.
    #[must_use]
    pub fn activity_to(&self) -> Option<&str> {
        match self {
            Self::Mint(p) => p.owner.as_deref(),
            Self::Transfer(p) => p.to.as_deref().or(p.recipient.as_deref()),
            Self::Listing(p) => p.buyer.as_deref(),
            Self::Offer(_) => None,
            Self::Unknown(v) => v
                .get("buyer")
                .or_else(|| v.get("to"))
                .or_else(|| v.get("recipient"))
                .and_then(serde_json::Value::as_str),
        }
    }
}

fn decode_as<T: serde::de::DeserializeOwned>(
    data: &serde_json::Value,
    wrap: fn(T) -> EventPayload,
) -> EventPayload {
    match serde_json::from_value::<T>(data.clone()) {
        Ok(payload) => wrap(payload),
        Err(_) => EventPayload::Unknown(data.clone()),
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn mint_payload_decodes_with_extension_fallback() {
        let data = json!({
            "token_id": "7",
            "owner": "alice",
            "extension": {"name": "Dragon", "image": "ipfs://x"}
        });
        let EventPayload::Mint(mint) = EventPayload::decode("asset/mint", &data) else {
            panic!("expected mint payload");
        };
        assert_eq!(mint.display_name(), "Dragon");
        assert_eq!(mint.resolved_image().as_deref(), Some("ipfs://x"));
        assert_eq!(mint.owner.as_deref(), Some("alice"));
    }

    #[test]
    fn mint_without_metadata_synthesizes_name() {
        let data = json!({"token_id": "9", "owner": "bob"});
        let EventPayload::Mint(mint) = EventPayload::decode("asset/mint", &data) else {
            panic!("expected mint payload");
        };
        assert_eq!(mint.display_name(), "Token #9");
        assert!(mint.resolved_description().is_none());
    }

    #[test]
    fn mint_missing_token_id_fails_closed() {
        let data = json!({"owner": "alice"});
        assert!(matches!(
            EventPayload::decode("asset/mint", &data),
            EventPayload::Unknown(_)
        ));
    }

    #[test]
    fn owner_priority_prefers_to_over_recipient() {
        let data = json!({"token_id": "1", "to": "carol", "recipient": "dave"});
        let payload = EventPayload::decode("asset/transfer_nft", &data);
        assert_eq!(payload.owner_after(), Some("carol"));
    }

    #[test]
    fn sale_event_owner_is_the_buyer() {
        let data = json!({"token_id": "1", "seller": "alice", "buyer": "bob"});
        let payload = EventPayload::decode("marketplace/item-sold", &data);
        assert_eq!(payload.owner_after(), Some("bob"));
        assert_eq!(payload.activity_from(), Some("alice"));
    }

    #[test]
    fn listing_price_prefers_structured_denom() {
        let data = json!({
            "token_id": "1",
            "seller": "alice",
            "price": {"amount": "1000000", "denom": "uatom"},
            "denom": "ignored"
        });
        let payload = EventPayload::decode("marketplace/list-item", &data);
        let Some(coin) = payload.coin("uxion") else {
            panic!("expected a price");
        };
        assert_eq!(coin.denom, "uatom");
    }

    #[test]
    fn bare_price_uses_sibling_denom_then_default() {
        let with_denom = json!({"token_id": "1", "price": "500", "denom": "untrn"});
        let Some(coin) = EventPayload::decode("asset/list", &with_denom).coin("uxion") else {
            panic!("expected a price");
        };
        assert_eq!(coin.denom, "untrn");

        let without = json!({"token_id": "1", "price": "500"});
        let Some(coin) = EventPayload::decode("asset/list", &without).coin("uxion") else {
            panic!("expected a price");
        };
        assert_eq!(coin.denom, "uxion");
    }

    #[test]
    fn unknown_event_keeps_raw_json_accessors() {
        let data = json!({"token_id": "3", "owner": "ops"});
        let payload = EventPayload::decode("marketplace/set-config", &data);
        assert_eq!(payload.token_id(), Some("3"));
        assert_eq!(payload.activity_from(), Some("ops"));
    }

    #[test]
    fn offer_requires_offer_id() {
        let bad = json!({"token_id": "1", "bidder": "bob"});
        assert!(matches!(
            EventPayload::decode("marketplace/create-offer", &bad),
            EventPayload::Unknown(_)
        ));

        let good = json!({"offer_id": "o1", "token_id": "1", "bidder": "bob", "price": "5"});
        let EventPayload::Offer(offer) = EventPayload::decode("marketplace/create-offer", &good)
        else {
            panic!("expected offer payload");
        };
        assert_eq!(offer.offer_id, "o1");
    }
}
