//! Pure event-folding projections.
//!
//! Every function here is a deterministic fold over ordered event rows
//! into one of the derived views: active listings, current ownership,
//! open offers, minted-token metadata, and the activity feed. No I/O,
//! no clocks, no caches — the query service fetches rows and these
//! functions reduce them.

use std::collections::{HashMap, HashSet};

use super::event::{
    ActivityKind, EventRow, LISTING_CREATE_EVENTS, MINT_EVENT, OFFER_CLOSE_EVENTS,
    OFFER_CREATE_EVENT,
};
use super::payload::EventPayload;
use super::views::{ActivityItem, ListingInfo, NftDetails, NftWithListing, OfferInfo};

/// Keeps, per token id, the row with the greatest `(block_time_ms, id)`
/// recency key. Equal block times are broken by the higher row id, so
/// replays and same-block events resolve deterministically.
fn latest_per_token<'a>(rows: &'a [EventRow]) -> HashMap<&'a str, &'a EventRow> {
    let mut latest: HashMap<&str, &EventRow> = HashMap::new();
    for row in rows {
        let Some(token_id) = row
            .data
            .get("token_id")
            .or_else(|| row.data.get("tokenId"))
            .and_then(serde_json::Value::as_str)
        else {
            continue;
        };
        match latest.get(token_id) {
            Some(current) if current.recency() >= row.recency() => {}
            _ => {
                latest.insert(token_id, row);
            }
        }
    }
    latest
}

/// Folds listing-lifecycle rows into the set of active listings.
///
/// Per token, only the most recent lifecycle event counts; the token is
/// listed iff that event is in the "create listing" subset. A `list`
/// followed by any other lifecycle event is therefore no longer active.
#[must_use]
pub fn project_listings(rows: &[EventRow], default_denom: &str) -> Vec<ListingInfo> {
    let mut listings: Vec<ListingInfo> = latest_per_token(rows)
        .into_values()
        .filter(|row| LISTING_CREATE_EVENTS.contains(&row.name.as_str()))
        .filter_map(|row| listing_from_row(row, default_denom))
        .collect();
    listings.sort_by(|a, b| b.listed_at.cmp(&a.listed_at).then(b.token_id.cmp(&a.token_id)));
    listings
}

fn listing_from_row(row: &EventRow, default_denom: &str) -> Option<ListingInfo> {
    let payload = row.payload();
    let EventPayload::Listing(listing) = &payload else {
        return None;
    };
    let coin = payload.coin(default_denom);
    Some(ListingInfo {
        token_id: listing.token_id.clone(),
        seller: listing.seller_address().unwrap_or_default().to_string(),
        price: coin.as_ref().map(|c| c.amount.clone()).unwrap_or_default(),
        denom: coin
            .map(|c| c.denom)
            .unwrap_or_else(|| default_denom.to_string()),
        listed_at: row.block_time_ms,
        tx_hash: Some(row.tx_hash.clone()),
        name: None,
        image: None,
    })
}

/// Folds ownership-relevant rows into a `token id -> current owner`
/// map. The owner is the address field of the chronologically latest
/// mint/transfer/send/sale event, read at the fixed priority
/// `to` > `recipient` > `buyer` > `owner`.
#[must_use]
pub fn project_ownership(rows: &[EventRow]) -> HashMap<String, String> {
    latest_per_token(rows)
        .into_iter()
        .filter_map(|(token_id, row)| {
            row.payload()
                .owner_after()
                .map(|owner| (token_id.to_string(), owner.to_string()))
        })
        .collect()
}

/// Folds offer-lifecycle rows into the set of open offers, optionally
/// restricted to one token.
///
/// An offer is open iff a create event exists and its id never appears
/// in an accept/reject/cancel event. Closure is monotonic: once an id
/// is closed it stays closed, even if a later create with the same id
/// is replayed.
#[must_use]
pub fn project_open_offers(
    rows: &[EventRow],
    token_id: Option<&str>,
    default_denom: &str,
) -> Vec<OfferInfo> {
    let closed: HashSet<&str> = rows
        .iter()
        .filter(|row| OFFER_CLOSE_EVENTS.contains(&row.name.as_str()))
        .filter_map(|row| {
            row.data
                .get("offer_id")
                .or_else(|| row.data.get("offerId"))
                .and_then(serde_json::Value::as_str)
        })
        .collect();

    let mut seen: HashSet<String> = HashSet::new();
    let mut offers: Vec<OfferInfo> = Vec::new();
    for row in rows {
        if row.name != OFFER_CREATE_EVENT {
            continue;
        }
        let payload = row.payload();
        let EventPayload::Offer(offer) = &payload else {
            continue;
        };
        if closed.contains(offer.offer_id.as_str()) {
            continue;
        }
        if let Some(wanted) = token_id
            && offer.token_id.as_deref() != Some(wanted)
        {
            continue;
        }
        if !seen.insert(offer.offer_id.clone()) {
            continue;
        }
        let coin = payload.coin(default_denom);
        offers.push(OfferInfo {
            offer_id: offer.offer_id.clone(),
            token_id: offer.token_id.clone().unwrap_or_default(),
            bidder: offer.bidder.clone().unwrap_or_default(),
            price: coin.as_ref().map(|c| c.amount.clone()).unwrap_or_default(),
            denom: coin
                .map(|c| c.denom)
                .unwrap_or_else(|| default_denom.to_string()),
            created_at: row.block_time_ms,
            tx_hash: Some(row.tx_hash.clone()),
        });
    }
    offers.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    offers
}

/// Maps rows into the activity feed: one entry per row, categorized by
/// the fixed name table (unmapped names become `admin`), sorted
/// strictly descending by `(timestamp, id)`, then offset/limit applied.
#[must_use]
pub fn project_activity(
    rows: &[EventRow],
    default_denom: &str,
    limit: usize,
    offset: usize,
) -> Vec<ActivityItem> {
    // Tie-break on the numeric row id; the string form of the id is
    // only a presentation detail.
    let mut items: Vec<(i64, ActivityItem)> = rows
        .iter()
        .map(|row| {
            let payload = row.payload();
            let coin = payload.coin(default_denom);
            let item = ActivityItem {
                id: row.id.to_string(),
                kind: ActivityKind::from_event_name(&row.name).unwrap_or(ActivityKind::Admin),
                token_id: payload.token_id().unwrap_or_default().to_string(),
                from: payload.activity_from().map(str::to_string),
                to: payload.activity_to().map(str::to_string),
                price: coin.as_ref().map(|c| c.amount.clone()),
                denom: coin.map(|c| c.denom),
                timestamp: row.block_time_ms,
                tx_hash: Some(row.tx_hash.clone()),
                block_height: Some(row.block_height),
                description: None,
            };
            (row.id, item)
        })
        .collect();
    items.sort_by(|a, b| {
        b.1.timestamp
            .cmp(&a.1.timestamp)
            .then_with(|| b.0.cmp(&a.0))
    });
    items
        .into_iter()
        .skip(offset)
        .take(limit)
        .map(|(_, item)| item)
        .collect()
}

/// Latest mint row per token id.
fn latest_mints(mint_rows: &[EventRow]) -> HashMap<&str, &EventRow> {
    latest_per_token(mint_rows)
        .into_iter()
        .filter(|(_, row)| row.name == MINT_EVENT)
        .collect()
}

/// Joins mint rows with ownership and listing projections into the
/// all-NFTs view, ordered by mint time descending.
#[must_use]
pub fn project_nfts(
    mint_rows: &[EventRow],
    ownership_rows: &[EventRow],
    lifecycle_rows: &[EventRow],
    default_denom: &str,
) -> Vec<NftWithListing> {
    let owners = project_ownership(ownership_rows);
    let listings: HashMap<String, ListingInfo> = project_listings(lifecycle_rows, default_denom)
        .into_iter()
        .map(|l| (l.token_id.clone(), l))
        .collect();

    let mut rows: Vec<&EventRow> = latest_mints(mint_rows).into_values().collect();
    rows.sort_by(|a, b| b.recency().cmp(&a.recency()));

    rows.into_iter()
        .filter_map(|row| {
            let nft = nft_from_mint_row(row, &owners)?;
            let listing = listings.get(&nft.token_id);
            Some(NftWithListing {
                is_listed: listing.is_some(),
                price: listing.map(|l| l.price.clone()),
                denom: listing.map(|l| l.denom.clone()),
                listed_at: listing.map(|l| l.listed_at),
                nft,
            })
        })
        .collect()
}

/// Details for a single token, or `None` if it was never minted.
#[must_use]
pub fn project_nft_details(
    mint_rows: &[EventRow],
    ownership_rows: &[EventRow],
    token_id: &str,
) -> Option<NftDetails> {
    let owners = project_ownership(ownership_rows);
    let row = latest_mints(mint_rows).remove(token_id)?;
    nft_from_mint_row(row, &owners)
}

fn nft_from_mint_row(row: &EventRow, owners: &HashMap<String, String>) -> Option<NftDetails> {
    let EventPayload::Mint(mint) = row.payload() else {
        return None;
    };
    let owner = owners
        .get(&mint.token_id)
        .cloned()
        .or_else(|| mint.owner.clone())
        .unwrap_or_default();
    Some(NftDetails {
        token_id: mint.token_id.clone(),
        name: mint.display_name(),
        description: mint.resolved_description(),
        image: mint.resolved_image(),
        owner,
        token_uri: mint.token_uri.clone(),
        minted_at: Some(row.block_time_ms),
        mint_tx_hash: Some(row.tx_hash.clone()),
    })
}

/// A user's active listings, enriched with NFT metadata from the mint
/// rows.
#[must_use]
pub fn project_user_listings(
    lifecycle_rows: &[EventRow],
    mint_rows: &[EventRow],
    user: &str,
    default_denom: &str,
) -> Vec<ListingInfo> {
    let mints = latest_mints(mint_rows);
    project_listings(lifecycle_rows, default_denom)
        .into_iter()
        .filter(|listing| listing.seller == user)
        .map(|mut listing| {
            if let Some(row) = mints.get(listing.token_id.as_str())
                && let EventPayload::Mint(mint) = row.payload()
            {
                listing.name = Some(mint.display_name());
                listing.image = mint.resolved_image();
            } else {
                listing.name = Some(format!("Token #{}", listing.token_id));
            }
            listing
        })
        .collect()
}

/// A user's currently-owned tokens, ordered by mint time descending.
#[must_use]
pub fn project_user_nfts(
    mint_rows: &[EventRow],
    ownership_rows: &[EventRow],
    user: &str,
) -> Vec<NftDetails> {
    let owners = project_ownership(ownership_rows);
    let mut rows: Vec<&EventRow> = latest_mints(mint_rows).into_values().collect();
    rows.sort_by(|a, b| b.recency().cmp(&a.recency()));
    rows.into_iter()
        .filter_map(|row| nft_from_mint_row(row, &owners))
        .filter(|nft| nft.owner == user)
        .collect()
}
