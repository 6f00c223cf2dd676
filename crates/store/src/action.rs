//! User gestures and relay notifications accepted by a list store.

use codex_core::{BookmarkId, EntityId, ListFilter, SortOrder};

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// The screen became visible. Refreshes page 0 without clearing the
    /// items already on screen.
    ViewAppeared,
    /// A new sort order was picked. Restarts pagination.
    SortSelected(SortOrder),
    /// A new filter was applied. Restarts pagination.
    FilterSelected(ListFilter),
    /// A search keyword was submitted. Restarts pagination.
    SearchSubmitted(String),
    /// The list was scrolled near its end.
    LoadNextPage,
    /// The bookmark button of an entity was tapped.
    ToggleBookmark(EntityId),
    /// The undo button of the "bookmark removed" snackbar was tapped.
    UndoLastRemoval,
    /// Another store committed a bookmark change.
    ExternalBookmarkChanged {
        entity_id: EntityId,
        new_bookmark_id: Option<BookmarkId>,
    },
}

impl Action {
    /// Short name for log fields.
    pub fn name(&self) -> &'static str {
        match self {
            Action::ViewAppeared => "view_appeared",
            Action::SortSelected(_) => "sort_selected",
            Action::FilterSelected(_) => "filter_selected",
            Action::SearchSubmitted(_) => "search_submitted",
            Action::LoadNextPage => "load_next_page",
            Action::ToggleBookmark(_) => "toggle_bookmark",
            Action::UndoLastRemoval => "undo_last_removal",
            Action::ExternalBookmarkChanged { .. } => "external_bookmark_changed",
        }
    }
}
