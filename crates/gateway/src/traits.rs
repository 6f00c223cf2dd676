//! Gateway traits.
//!
//! All gateways are stateless from the caller's point of view: one call per
//! invocation, no retries. Retrying is the caller's decision.

use async_trait::async_trait;
use codex_core::{BookmarkId, EntityId, EntityKind, NetworkError, PageQuery, PagedResult};

/// Remote source of collection pages.
#[async_trait]
pub trait CollectionGateway: Send + Sync {
    /// Fetch the page described by `query`.
    async fn fetch(&self, query: &PageQuery) -> Result<PagedResult, NetworkError>;
}

/// Desired bookmark state for one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookmarkIntent {
    /// Create a bookmark. The bookmark service keys bookmarks by kind.
    Set { kind: EntityKind },
    /// Delete an existing bookmark by its server-assigned id.
    Delete {
        kind: EntityKind,
        bookmark_id: BookmarkId,
    },
}

impl BookmarkIntent {
    pub fn kind(self) -> EntityKind {
        match self {
            BookmarkIntent::Set { kind } | BookmarkIntent::Delete { kind, .. } => kind,
        }
    }

    pub fn is_delete(self) -> bool {
        matches!(self, BookmarkIntent::Delete { .. })
    }
}

/// Remote bookmark create/delete.
#[async_trait]
pub trait BookmarkGateway: Send + Sync {
    /// Apply `intent` to `entity_id`.
    ///
    /// Returns the new bookmark id on create and `None` on delete.
    async fn set_bookmark(
        &self,
        entity_id: EntityId,
        intent: BookmarkIntent,
    ) -> Result<Option<BookmarkId>, NetworkError>;
}

/// Signed-in state of the current user.
pub trait LoginStateProvider: Send + Sync {
    fn is_logged_in(&self) -> bool;
}
