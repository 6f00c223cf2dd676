//! Side effects requested by the machine and their completions.
//!
//! The machine never performs I/O. It returns [`Effect`]s; the store actor
//! executes them and feeds each outcome back as a [`Completion`].

use codex_core::{BookmarkId, EntityId, ListEntity, NetworkError, PageQuery, PagedResult};
use codex_gateway::BookmarkIntent;

/// Tag of one refresh cycle. Increases on every refresh so that a response
/// to an older query can be recognised and discarded.
pub type Generation = u64;

/// Counts result sets. Increases only when sort, filter or keyword replace
/// the list, so a plain refresh of the same query keeps it.
pub type QueryEpoch = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookmarkOp {
    Toggle,
    Undo,
}

/// A bookmark call in flight, carrying what is needed to apply its result.
#[derive(Debug, Clone, PartialEq)]
pub struct BookmarkRequest {
    pub op: BookmarkOp,
    pub entity_id: EntityId,
    pub intent: BookmarkIntent,
    /// Result set the call was issued from.
    pub epoch: QueryEpoch,
    /// The entity as it was when the call was issued.
    pub snapshot: ListEntity,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    FetchPage {
        generation: Generation,
        query: PageQuery,
    },
    SetBookmark(BookmarkRequest),
    PublishChange {
        entity_id: EntityId,
        new_bookmark_id: Option<BookmarkId>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Completion {
    PageFetched {
        generation: Generation,
        page: u32,
        result: Result<PagedResult, NetworkError>,
    },
    BookmarkSet {
        request: BookmarkRequest,
        result: Result<Option<BookmarkId>, NetworkError>,
    },
}
