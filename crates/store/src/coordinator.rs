//! Bookmark toggle and one-shot undo.
//!
//! A toggle is applied to the list only after the bookmark service has
//! acknowledged it, so a failed call leaves nothing to roll back. The entity
//! as it was before the toggle goes into the single undo slot
//! (`pending_undo`); a later toggle overwrites it. A toggle acknowledged
//! after sort, filter or keyword replaced the list is still applied and
//! published, but does not take the slot or raise a snackbar.
//!
//! At most one bookmark call per entity is in flight. Taps on an entity whose
//! call has not completed yet are dropped, which is what keeps a burst of
//! undo taps down to exactly one compensating request.

use codex_core::{BookmarkId, EntityId, NetworkError};
use codex_gateway::BookmarkIntent;

use crate::effect::{BookmarkOp, BookmarkRequest, Effect};
use crate::error::ListError;
use crate::machine::{ListMachine, Step};
use crate::reduce::Mutation;
use crate::state::UiEvent;

impl ListMachine {
    pub(crate) fn toggle_bookmark(&mut self, entity_id: EntityId, step: &mut Step) {
        if !self.state().is_logged_in {
            step.mutate(Mutation::Emit(UiEvent::LoginRequired));
            return;
        }
        let Some(entity) = self.state().item(entity_id).cloned() else {
            tracing::debug!(entity_id, "Toggle for entity not in list, ignoring");
            return;
        };
        if !self.bookmark_flights.insert(entity_id) {
            tracing::debug!(entity_id, "Bookmark call already in flight, ignoring toggle");
            return;
        }

        let intent = match entity.bookmark_id {
            Some(bookmark_id) => BookmarkIntent::Delete {
                kind: entity.kind,
                bookmark_id,
            },
            None => BookmarkIntent::Set { kind: entity.kind },
        };
        step.effect(Effect::SetBookmark(BookmarkRequest {
            op: BookmarkOp::Toggle,
            entity_id,
            intent,
            epoch: self.query_epoch,
            snapshot: entity,
        }));
    }

    /// Re-create the bookmark removed by the last toggle.
    ///
    /// A no-op when the slot is empty or the last toggle added a bookmark.
    pub(crate) fn undo_last_removal(&mut self, step: &mut Step) {
        let Some(snapshot) = self.state().pending_undo.clone() else {
            return;
        };
        if !snapshot.is_bookmarked() {
            tracing::debug!(
                entity_id = snapshot.id,
                "Last toggle added a bookmark, nothing to undo"
            );
            return;
        }
        if !self.bookmark_flights.insert(snapshot.id) {
            tracing::debug!(entity_id = snapshot.id, "Undo already in flight, ignoring");
            return;
        }

        step.effect(Effect::SetBookmark(BookmarkRequest {
            op: BookmarkOp::Undo,
            entity_id: snapshot.id,
            intent: BookmarkIntent::Set {
                kind: snapshot.kind,
            },
            epoch: self.query_epoch,
            snapshot,
        }));
    }

    /// Mirror a change committed by another store. Pure local reduce.
    pub(crate) fn external_change(
        &mut self,
        entity_id: EntityId,
        new_bookmark_id: Option<BookmarkId>,
        step: &mut Step,
    ) {
        let state = self.state();
        if let Some(item) = state.item(entity_id) {
            if item.bookmark_id != new_bookmark_id {
                step.mutate(Mutation::PatchBookmark {
                    entity_id,
                    bookmark_id: new_bookmark_id,
                });
            }
        }
        // Re-bookmarked elsewhere: undoing the removal here would only conflict.
        let undo_resolved = new_bookmark_id.is_some()
            && state
                .pending_undo
                .as_ref()
                .is_some_and(|snapshot| snapshot.id == entity_id);
        if undo_resolved {
            step.mutate(Mutation::SetPendingUndo(None));
        }
    }

    pub(crate) fn bookmark_set(
        &mut self,
        request: BookmarkRequest,
        result: Result<Option<BookmarkId>, NetworkError>,
    ) -> Step {
        let mut step = Step::default();
        let entity_id = request.entity_id;
        self.bookmark_flights.remove(&entity_id);

        match (request.op, result) {
            (BookmarkOp::Toggle, Ok(new_bookmark_id)) => {
                tracing::info!(
                    entity_id,
                    new_bookmark_id = ?new_bookmark_id,
                    "Bookmark toggle committed",
                );
                step.mutate(Mutation::PatchBookmark {
                    entity_id,
                    bookmark_id: new_bookmark_id,
                });
                if request.epoch == self.query_epoch {
                    let event = if request.intent.is_delete() {
                        UiEvent::Removed { entity_id }
                    } else {
                        UiEvent::Added { entity_id }
                    };
                    step.mutate(Mutation::SetPendingUndo(Some(request.snapshot)));
                    step.mutate(Mutation::Emit(event));
                } else {
                    tracing::debug!(
                        entity_id,
                        epoch = request.epoch,
                        current_epoch = self.query_epoch,
                        "Toggle acknowledged after the list was replaced, not offering undo",
                    );
                }
                step.effect(Effect::PublishChange {
                    entity_id,
                    new_bookmark_id,
                });
            }
            (BookmarkOp::Toggle, Err(source)) => {
                tracing::warn!(entity_id, error = %source, "Bookmark toggle failed");
                step.mutate(Mutation::Emit(UiEvent::Error(ListError::MutationFailed {
                    entity_id,
                    source,
                })));
            }
            (BookmarkOp::Undo, Ok(new_bookmark_id)) => {
                let restored = new_bookmark_id.or(request.snapshot.bookmark_id);
                tracing::info!(entity_id, restored = ?restored, "Bookmark removal undone");
                step.mutate(Mutation::PatchBookmark {
                    entity_id,
                    bookmark_id: restored,
                });
                // A newer toggle may have taken the slot meanwhile.
                if self.state().pending_undo.as_ref() == Some(&request.snapshot) {
                    step.mutate(Mutation::SetPendingUndo(None));
                }
                step.mutate(Mutation::Emit(UiEvent::Added { entity_id }));
                step.effect(Effect::PublishChange {
                    entity_id,
                    new_bookmark_id: restored,
                });
            }
            (BookmarkOp::Undo, Err(source)) => {
                tracing::warn!(entity_id, error = %source, "Bookmark undo failed");
                step.mutate(Mutation::Emit(UiEvent::Error(ListError::UndoFailed {
                    entity_id,
                    source,
                })));
            }
        }
        step
    }
}
