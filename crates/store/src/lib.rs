//! List state controllers for paginated, bookmarkable collection screens.
//!
//! - [`ListMachine`]: synchronous action → mutation → state engine. Owns the
//!   items, pagination cursor, active query and undo slot, and returns the
//!   side effects (gateway calls, relay publishes) each step requires.
//! - [`reduce`]: the pure reducer applying one [`Mutation`] to a
//!   [`ListState`].
//! - [`ListStore`]: the async actor running one machine per screen on a
//!   single task, executing effects and feeding their completions back.
//! - [`ListStoreHandle`]: what a screen holds: `dispatch`, `subscribe`,
//!   `state`.

pub mod action;
pub mod config;
pub mod coordinator;
pub mod effect;
pub mod error;
pub mod machine;
pub mod observers;
pub mod reduce;
pub mod state;
pub mod store;

pub use action::Action;
pub use config::StoreConfig;
pub use effect::{BookmarkOp, BookmarkRequest, Completion, Effect, Generation, QueryEpoch};
pub use error::{ListError, StoreError};
pub use machine::{ListMachine, Transition};
pub use observers::{ObserverId, StateStream};
pub use reduce::{reduce, Mutation};
pub use state::{ListState, UiEvent};
pub use store::{ListStore, ListStoreHandle, StoreDeps};
