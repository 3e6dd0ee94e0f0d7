//! # Fakebook Core
//!
//! The domain layer of the Fakebook backend.
//! Entities, ports and the services that hold the feed, reaction, comment,
//! profile and authentication rules. No infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod pagination;
pub mod ports;
pub mod services;
pub mod views;

pub use error::{DomainError, RepoError};
pub use pagination::{CursorPage, PageRequest};
