//! Core data model and projection logic.
//!
//! Everything in this module is pure: event rows, typed payloads, the
//! derived view types, and the folding functions that reduce an
//! append-only event log into current-state projections.

pub mod coin;
pub mod event;
pub mod payload;
pub mod projector;
pub mod views;

pub use coin::{Coin, RawPrice};
pub use event::{ActivityKind, EventRow};
pub use payload::EventPayload;
pub use views::{ActivityItem, DataSource, ListingInfo, NftDetails, NftWithListing, OfferInfo};
