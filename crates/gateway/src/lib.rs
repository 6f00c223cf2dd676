//! Seams to the remote collaborators of the list state controllers.
//!
//! - [`CollectionGateway`] fetches one page of a collection.
//! - [`BookmarkGateway`] creates or deletes a bookmark.
//! - [`LoginStateProvider`] reports whether a user is signed in.
//!
//! [`memory::InMemoryCatalog`] implements both gateways over an in-process
//! data set with failure injection, for the demo binary and the test-suites.

pub mod memory;
pub mod session;
pub mod traits;

pub use memory::{BookmarkedView, CatalogEntry, InMemoryCatalog};
pub use session::SharedSession;
pub use traits::{BookmarkGateway, BookmarkIntent, CollectionGateway, LoginStateProvider};
