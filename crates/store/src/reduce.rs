//! The pure reducer.
//!
//! [`reduce`] is the only code that changes a [`ListState`]. It performs no
//! I/O and never fails; every mutation is total over any state.

use std::collections::HashSet;

use codex_core::{BookmarkId, EntityId, ListEntity, PageQuery};

use crate::state::{ListState, UiEvent};

#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// Switch to a new query: items cleared, pagination rewound, undo slot
    /// dropped.
    ResetForQuery(PageQuery),
    SetLoading(bool),
    SetLoggedIn(bool),
    /// Page 0 arrived: replace items wholesale.
    ReplaceItems {
        items: Vec<ListEntity>,
        total_count: u64,
    },
    /// A later page arrived: append entities not already present.
    AppendItems {
        page: u32,
        items: Vec<ListEntity>,
        total_count: u64,
    },
    /// Set the bookmark id of the matching item, if present.
    PatchBookmark {
        entity_id: EntityId,
        bookmark_id: Option<BookmarkId>,
    },
    SetPendingUndo(Option<ListEntity>),
    Emit(UiEvent),
}

/// Apply one mutation, producing the next state.
pub fn reduce(mut state: ListState, mutation: Mutation) -> ListState {
    match mutation {
        Mutation::ResetForQuery(query) => {
            state.items.clear();
            state.current_page = 0;
            state.total_count = 0;
            state.query = query.at_page(0);
            state.pending_undo = None;
        }
        Mutation::SetLoading(is_loading) => state.is_loading = is_loading,
        Mutation::SetLoggedIn(is_logged_in) => state.is_logged_in = is_logged_in,
        Mutation::ReplaceItems { items, total_count } => {
            state.items = dedup_by_id(items);
            state.current_page = 0;
            state.query = state.query.at_page(0);
            state.total_count = total_count;
        }
        Mutation::AppendItems {
            page,
            items,
            total_count,
        } => {
            let mut seen: HashSet<EntityId> = state.items.iter().map(|item| item.id).collect();
            state
                .items
                .extend(items.into_iter().filter(|item| seen.insert(item.id)));
            state.current_page = page;
            state.query = state.query.at_page(page);
            state.total_count = total_count;
        }
        Mutation::PatchBookmark {
            entity_id,
            bookmark_id,
        } => {
            if let Some(item) = state.items.iter_mut().find(|item| item.id == entity_id) {
                item.bookmark_id = bookmark_id;
            }
        }
        Mutation::SetPendingUndo(snapshot) => state.pending_undo = snapshot,
        Mutation::Emit(event) => state.last_event = event,
    }
    state
}

/// Keep the first occurrence of every id, preserving order.
fn dedup_by_id(items: Vec<ListEntity>) -> Vec<ListEntity> {
    let mut seen = HashSet::with_capacity(items.len());
    items
        .into_iter()
        .filter(|item| seen.insert(item.id))
        .collect()
}

#[cfg(test)]
mod tests {
    use codex_core::{EntityKind, SortOrder};

    use super::*;

    fn entity(id: EntityId) -> ListEntity {
        ListEntity::new(id, format!("entity {id}"), EntityKind::Item)
    }

    fn entities(ids: impl IntoIterator<Item = EntityId>) -> Vec<ListEntity> {
        ids.into_iter().map(entity).collect()
    }

    fn ids(state: &ListState) -> Vec<EntityId> {
        state.items.iter().map(|item| item.id).collect()
    }

    #[test]
    fn replace_items_drops_previous_pages() {
        let mut state = ListState::default();
        state.items = entities(1..=40);
        state.current_page = 1;

        let state = reduce(
            state,
            Mutation::ReplaceItems {
                items: entities([5, 6, 7]),
                total_count: 3,
            },
        );

        assert_eq!(ids(&state), vec![5, 6, 7]);
        assert_eq!(state.current_page, 0);
        assert_eq!(state.query.page, 0);
        assert_eq!(state.total_count, 3);
    }

    #[test]
    fn replace_items_dedups_response() {
        let state = reduce(
            ListState::default(),
            Mutation::ReplaceItems {
                items: entities([1, 2, 1, 3, 2]),
                total_count: 3,
            },
        );
        assert_eq!(ids(&state), vec![1, 2, 3]);
    }

    #[test]
    fn append_skips_ids_already_present() {
        let mut state = ListState::default();
        state.items = entities(1..=4);

        let state = reduce(
            state,
            Mutation::AppendItems {
                page: 1,
                items: entities([4, 5, 5, 6]),
                total_count: 6,
            },
        );

        assert_eq!(ids(&state), vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(state.current_page, 1);
        assert_eq!(state.query.page, 1);
    }

    #[test]
    fn append_keeps_existing_copy_of_duplicate() {
        let mut state = ListState::default();
        state.items = vec![entity(1).with_bookmark(9)];

        let state = reduce(
            state,
            Mutation::AppendItems {
                page: 1,
                items: vec![entity(1)],
                total_count: 1,
            },
        );

        assert_eq!(state.items.len(), 1);
        assert_eq!(state.items[0].bookmark_id, Some(9));
    }

    #[test]
    fn reset_for_query_clears_items_and_undo() {
        let mut state = ListState::default();
        state.items = entities(1..=3);
        state.current_page = 2;
        state.total_count = 90;
        state.pending_undo = Some(entity(1).with_bookmark(3));

        let query = PageQuery::default().with_sort(SortOrder::NameDesc).at_page(4);
        let state = reduce(state, Mutation::ResetForQuery(query));

        assert!(state.items.is_empty());
        assert_eq!(state.current_page, 0);
        assert_eq!(state.total_count, 0);
        assert_eq!(state.query.page, 0);
        assert_eq!(state.query.sort, Some(SortOrder::NameDesc));
        assert!(state.pending_undo.is_none());
    }

    #[test]
    fn patch_bookmark_ignores_missing_entity() {
        let mut state = ListState::default();
        state.items = entities([1, 2]);
        let before = state.clone();

        let state = reduce(
            state,
            Mutation::PatchBookmark {
                entity_id: 99,
                bookmark_id: Some(1),
            },
        );
        assert_eq!(state, before);

        let state = reduce(
            state,
            Mutation::PatchBookmark {
                entity_id: 2,
                bookmark_id: Some(11),
            },
        );
        assert_eq!(state.items[1].bookmark_id, Some(11));
        assert_eq!(state.items[0].bookmark_id, None);
    }
}
