//! The immutable state value observed by a screen.

use codex_core::{EntityId, ListEntity, PageQuery};

use crate::error::ListError;

/// One-shot notification attached to the state emission that produced it.
///
/// Reset to [`UiEvent::None`] at the start of every reduce cycle, so a
/// snackbar or toast is shown once per emission that carries it.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum UiEvent {
    #[default]
    None,
    /// A bookmark was created (snackbar).
    Added { entity_id: EntityId },
    /// A bookmark was removed (snackbar with undo).
    Removed { entity_id: EntityId },
    /// A gateway call failed (toast).
    Error(ListError),
    /// A bookmark gesture needs a signed-in user.
    LoginRequired,
}

impl UiEvent {
    pub fn is_none(&self) -> bool {
        matches!(self, UiEvent::None)
    }
}

/// Everything a collection screen renders.
#[derive(Debug, Clone, PartialEq)]
pub struct ListState {
    /// Server order, unique by id.
    pub items: Vec<ListEntity>,
    /// Last page merged into `items`.
    pub current_page: u32,
    pub total_count: u64,
    /// Active query, positioned at `current_page`.
    pub query: PageQuery,
    pub is_logged_in: bool,
    /// Snapshot of the entity before the last committed toggle.
    pub pending_undo: Option<ListEntity>,
    pub last_event: UiEvent,
    /// A fetch for the active query is in flight.
    pub is_loading: bool,
}

impl ListState {
    pub fn new(query: PageQuery) -> Self {
        Self {
            items: Vec::new(),
            current_page: 0,
            total_count: 0,
            query,
            is_logged_in: false,
            pending_undo: None,
            last_event: UiEvent::None,
            is_loading: false,
        }
    }

    pub fn item(&self, id: EntityId) -> Option<&ListEntity> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.item(id).is_some()
    }

    /// Whether the server reported more entities beyond the current page.
    pub fn has_next_page(&self) -> bool {
        let loaded = u64::from(self.current_page + 1) * u64::from(self.query.page_size);
        loaded < self.total_count
    }

    /// Whether the undo slot holds a removal that can be reverted.
    pub fn can_undo(&self) -> bool {
        self.pending_undo
            .as_ref()
            .is_some_and(ListEntity::is_bookmarked)
    }
}

impl Default for ListState {
    fn default() -> Self {
        Self::new(PageQuery::default())
    }
}

#[cfg(test)]
mod tests {
    use codex_core::EntityKind;

    use super::*;

    #[test]
    fn has_next_page_uses_page_size() {
        let mut state = ListState::new(PageQuery::first_page(20));
        assert!(!state.has_next_page());

        state.total_count = 57;
        assert!(state.has_next_page());

        state.current_page = 2;
        assert!(!state.has_next_page());
    }

    #[test]
    fn can_undo_only_after_removal() {
        let mut state = ListState::default();
        assert!(!state.can_undo());

        state.pending_undo = Some(ListEntity::new(1, "Orange Mushroom", EntityKind::Monster));
        assert!(!state.can_undo());

        state.pending_undo = state.pending_undo.take().map(|e| e.with_bookmark(5));
        assert!(state.can_undo());
    }
}
