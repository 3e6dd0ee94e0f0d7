//! # Fakebook Shared
//!
//! Wire types of the HTTP API: request bodies, query strings and the
//! response envelopes. Views returned by the services live in
//! `fakebook_core::views` and are serialized as-is inside [`ApiResponse`].

pub mod dto;
pub mod response;

pub use response::{ApiResponse, ErrorResponse};
