//! Cross-screen bookmark relay.
//!
//! This crate provides the process-wide channel that keeps every live list
//! screen consistent after a bookmark changes on any one of them:
//!
//! - [`BookmarkRelay`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`BookmarkChangeEvent`]: the value broadcast for every committed
//!   bookmark mutation.
//! - [`RelaySubscription`]: a scoped listener whose lifetime matches the
//!   screen that owns it.

pub mod bus;
pub mod subscription;

pub use bus::{BookmarkChangeEvent, BookmarkRelay, RelayConfig, StoreId};
pub use subscription::{RelayState, RelaySubscription};
