//! # marketplace-gateway
//!
//! Read-side REST gateway for a CosmWasm NFT marketplace.
//!
//! The gateway answers every query from one of two backends: a
//! PostgreSQL event log written by an external indexing pipeline
//! (preferred), or the chain node itself over Tendermint RPC
//! (fallback). Indexer reads are pure folds over the event log —
//! nothing is cached or materialized server-side — and every response
//! is tagged with the backend that produced it.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP)
//!     │
//!     ├── REST Handlers (api/)
//!     │
//!     ├── QueryService (service/)          source selection + fallback
//!     │       │
//!     │       ├── EventStore (persistence/) → PostgreSQL event log
//!     │       │       └── projector (domain/) event folding
//!     │       │
//!     │       └── ChainClient (rpc/)        → Tendermint RPC
//!     │               └── smart-contract queries + tx_search
//!     │
//!     └── domain/                           rows, payloads, views
//! ```

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod persistence;
pub mod rpc;
pub mod service;
