//! Query service: source selection between the event indexer and the
//! chain-RPC fallback.
//!
//! Every read capability prefers the indexer (fetch rows, fold with
//! [`crate::domain::projector`]) and falls back to the chain node when
//! the indexer is unconfigured, failing, or visibly lagging. Each
//! response is tagged with the source that produced it.

pub mod query_service;

pub use query_service::{QueryService, Sourced};
