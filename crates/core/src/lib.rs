//! Value types shared by the list state controllers.
//!
//! This crate has zero internal deps so that the gateway, relay and store
//! crates can all depend on it.

pub mod config;
pub mod entity;
pub mod error;
pub mod query;
pub mod types;

pub use entity::{EntityKind, ListEntity, PagedResult};
pub use error::{CoreError, NetworkError};
pub use query::{ListFilter, PageQuery, SortOrder};
pub use types::{BookmarkId, EntityId};
