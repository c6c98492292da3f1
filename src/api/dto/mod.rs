//! Data Transfer Objects for REST request/response serialization.
//!
//! Response payloads are the domain view types themselves; this module
//! adds the source-tagged envelope and the query-parameter structs.

pub mod common_dto;
pub mod query_dto;

pub use common_dto::*;
pub use query_dto::*;
