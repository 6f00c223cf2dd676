use codex_core::{EntityId, NetworkError};

/// A recoverable failure surfaced to the screen as a toast.
///
/// Every variant is retryable by repeating the action that caused it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ListError {
    #[error("Failed to load page {page}: {source}")]
    FetchFailed { page: u32, source: NetworkError },

    #[error("Failed to update bookmark of entity {entity_id}: {source}")]
    MutationFailed {
        entity_id: EntityId,
        source: NetworkError,
    },

    #[error("Failed to restore bookmark of entity {entity_id}: {source}")]
    UndoFailed {
        entity_id: EntityId,
        source: NetworkError,
    },
}

/// Errors returned by [`ListStoreHandle`](crate::store::ListStoreHandle).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("List store has shut down")]
    Closed,
}
