//! The list state machine.
//!
//! [`ListMachine`] turns actions and effect completions into mutations of its
//! [`ListState`] plus the effects the store actor must run next. It is
//! synchronous and deterministic: given the same inputs in the same order it
//! produces the same states, which is what the store relies on when it
//! funnels everything through one task.
//!
//! Fetch bookkeeping lives here; bookmark toggle/undo lives in
//! [`coordinator`](crate::coordinator).

use std::collections::HashSet;
use std::sync::Arc;

use codex_core::{EntityId, PageQuery};
use codex_gateway::LoginStateProvider;

use crate::action::Action;
use crate::effect::{Completion, Effect, Generation, QueryEpoch};
use crate::error::ListError;
use crate::reduce::{reduce, Mutation};
use crate::state::{ListState, UiEvent};

/// Outcome of feeding one action or completion into the machine.
#[derive(Debug, Default, PartialEq)]
pub struct Transition {
    /// The state differs from the one before the step.
    pub changed: bool,
    /// Effects to run, in order.
    pub effects: Vec<Effect>,
}

/// Mutations and effects accumulated while handling one input.
#[derive(Debug, Default)]
pub(crate) struct Step {
    mutations: Vec<Mutation>,
    effects: Vec<Effect>,
}

impl Step {
    pub(crate) fn mutate(&mut self, mutation: Mutation) {
        self.mutations.push(mutation);
    }

    pub(crate) fn effect(&mut self, effect: Effect) {
        self.effects.push(effect);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct InFlightFetch {
    generation: Generation,
    page: u32,
}

pub struct ListMachine {
    state: ListState,
    session: Arc<dyn LoginStateProvider>,
    generation: Generation,
    in_flight_fetch: Option<InFlightFetch>,
    pub(crate) query_epoch: QueryEpoch,
    /// Entities with a toggle or undo call in flight.
    pub(crate) bookmark_flights: HashSet<EntityId>,
}

impl ListMachine {
    pub fn new(query: PageQuery, session: Arc<dyn LoginStateProvider>) -> Self {
        let mut state = ListState::new(query.at_page(0));
        state.is_logged_in = session.is_logged_in();
        Self {
            state,
            session,
            generation: 0,
            in_flight_fetch: None,
            query_epoch: 0,
            bookmark_flights: HashSet::new(),
        }
    }

    pub fn state(&self) -> &ListState {
        &self.state
    }

    /// Generation of the most recent refresh.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn dispatch(&mut self, action: Action) -> Transition {
        tracing::trace!(action = action.name(), "Dispatching list action");
        let step = self.mutate(action);
        self.commit(step)
    }

    pub fn complete(&mut self, completion: Completion) -> Transition {
        let step = match completion {
            Completion::PageFetched {
                generation,
                page,
                result,
            } => self.page_fetched(generation, page, result),
            Completion::BookmarkSet { request, result } => self.bookmark_set(request, result),
        };
        self.commit(step)
    }

    fn mutate(&mut self, action: Action) -> Step {
        let mut step = Step::default();
        match action {
            Action::ViewAppeared => {
                step.mutate(Mutation::SetLoggedIn(self.session.is_logged_in()));
                let query = self.state.query.clone();
                self.refresh(query, false, &mut step);
            }
            Action::SortSelected(sort) => {
                let query = self.state.query.clone().with_sort(sort);
                self.refresh(query, true, &mut step);
            }
            Action::FilterSelected(filter) => {
                tracing::debug!(cleared = filter.is_empty(), "Filter selected");
                let query = self.state.query.clone().with_filter(filter);
                self.refresh(query, true, &mut step);
            }
            Action::SearchSubmitted(keyword) => {
                let query = self.state.query.clone().with_keyword(Some(keyword));
                self.refresh(query, true, &mut step);
            }
            Action::LoadNextPage => self.load_next_page(&mut step),
            Action::ToggleBookmark(entity_id) => self.toggle_bookmark(entity_id, &mut step),
            Action::UndoLastRemoval => self.undo_last_removal(&mut step),
            Action::ExternalBookmarkChanged {
                entity_id,
                new_bookmark_id,
            } => self.external_change(entity_id, new_bookmark_id, &mut step),
        }
        step
    }

    /// Apply the step's mutations on top of a cleared `last_event`.
    fn commit(&mut self, step: Step) -> Transition {
        if step.mutations.is_empty() {
            return Transition {
                changed: false,
                effects: step.effects,
            };
        }

        let previous = std::mem::take(&mut self.state);
        let next = step
            .mutations
            .into_iter()
            .fold(reduce(previous.clone(), Mutation::Emit(UiEvent::None)), reduce);
        let changed = next != previous;
        self.state = next;

        Transition {
            changed,
            effects: step.effects,
        }
    }

    // -----------------------------------------------------------------------
    // Fetch and merge
    // -----------------------------------------------------------------------

    /// Start fetching page 0 of `query` under a new generation.
    ///
    /// With `reset` the current items are cleared immediately (new result
    /// set); without it they stay on screen until the response replaces them.
    fn refresh(&mut self, query: PageQuery, reset: bool, step: &mut Step) {
        if let Err(e) = query.validate() {
            tracing::warn!(error = %e, "Ignoring refresh with invalid query");
            return;
        }

        self.generation += 1;
        let query = query.at_page(0);
        self.in_flight_fetch = Some(InFlightFetch {
            generation: self.generation,
            page: 0,
        });
        tracing::debug!(generation = self.generation, reset, "Refreshing list");

        if reset {
            self.query_epoch += 1;
            step.mutate(Mutation::ResetForQuery(query.clone()));
        }
        step.mutate(Mutation::SetLoading(true));
        step.effect(Effect::FetchPage {
            generation: self.generation,
            query,
        });
    }

    fn load_next_page(&mut self, step: &mut Step) {
        if let Some(in_flight) = self.in_flight_fetch {
            tracing::debug!(
                generation = in_flight.generation,
                page = in_flight.page,
                "Fetch already in flight, ignoring LoadNextPage",
            );
            return;
        }
        if !self.state.has_next_page() {
            tracing::debug!(
                current_page = self.state.current_page,
                total_count = self.state.total_count,
                "No further pages, ignoring LoadNextPage",
            );
            return;
        }

        let page = self.state.current_page + 1;
        self.in_flight_fetch = Some(InFlightFetch {
            generation: self.generation,
            page,
        });
        step.mutate(Mutation::SetLoading(true));
        step.effect(Effect::FetchPage {
            generation: self.generation,
            query: self.state.query.at_page(page),
        });
    }

    fn page_fetched(
        &mut self,
        generation: Generation,
        page: u32,
        result: Result<codex_core::PagedResult, codex_core::NetworkError>,
    ) -> Step {
        let mut step = Step::default();
        if generation != self.generation {
            tracing::debug!(
                generation,
                current_generation = self.generation,
                page,
                "Discarding stale page response",
            );
            return step;
        }
        if self.in_flight_fetch == Some(InFlightFetch { generation, page }) {
            self.in_flight_fetch = None;
        }

        step.mutate(Mutation::SetLoading(false));
        match result {
            Ok(paged) if page == 0 => step.mutate(Mutation::ReplaceItems {
                items: paged.contents,
                total_count: paged.total_elements,
            }),
            Ok(paged) => step.mutate(Mutation::AppendItems {
                page,
                items: paged.contents,
                total_count: paged.total_elements,
            }),
            Err(source) => {
                tracing::warn!(generation, page, error = %source, "Page fetch failed");
                step.mutate(Mutation::Emit(UiEvent::Error(ListError::FetchFailed {
                    page,
                    source,
                })));
            }
        }
        step
    }
}


#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use codex_core::{ListFilter, NetworkError, SortOrder};
    use codex_gateway::SharedSession;

    use super::testing::*;
    use super::*;

    #[test]
    fn view_appeared_fetches_first_page() {
        let mut machine = machine(SharedSession::signed_in());
        let transition = machine.dispatch(Action::ViewAppeared);

        assert!(transition.changed);
        assert!(machine.state().is_loading);
        let (generation, query) = fetch_of(&transition);
        assert_eq!(generation, 1);
        assert_eq!(query.page, 0);
        assert_eq!(query.page_size, 20);
    }

    #[test]
    fn example_scenario_pages_through_results() {
        let mut machine = machine(SharedSession::signed_in());

        load(&mut machine, Action::ViewAppeared, page(1..=20, 57));
        assert_eq!(machine.state().items.len(), 20);
        assert_eq!(machine.state().current_page, 0);
        assert_eq!(machine.state().total_count, 57);
        assert!(!machine.state().is_loading);

        let (_, query) = fetch_of(&machine.dispatch(Action::LoadNextPage));
        assert_eq!(query.page, 1);
        machine.complete(Completion::PageFetched {
            generation: machine.generation(),
            page: 1,
            result: Ok(page(21..=40, 57)),
        });

        assert_eq!(machine.state().items.len(), 40);
        assert_eq!(machine.state().current_page, 1);
    }

    #[test]
    fn overlapping_pages_never_duplicate_ids() {
        let mut machine = machine(SharedSession::signed_in());
        load(&mut machine, Action::ViewAppeared, page(1..=20, 100));
        // Server-side inserts shifted the next pages back by five entities.
        load(&mut machine, Action::LoadNextPage, page(16..=35, 105));
        load(&mut machine, Action::LoadNextPage, page(31..=50, 110));

        let ids = ids(&machine);
        let unique: HashSet<_> = ids.iter().copied().collect();
        assert_eq!(ids.len(), unique.len());
        assert_eq!(ids, (1..=50).collect::<Vec<_>>());
        assert_eq!(machine.state().current_page, 2);
    }

    #[test]
    fn load_next_page_is_single_flight() {
        let mut machine = machine(SharedSession::signed_in());
        load(&mut machine, Action::ViewAppeared, page(1..=20, 57));

        let first = machine.dispatch(Action::LoadNextPage);
        assert_eq!(first.effects.len(), 1);

        let duplicate = machine.dispatch(Action::LoadNextPage);
        assert!(duplicate.effects.is_empty());
        assert!(!duplicate.changed);
    }

    #[test]
    fn load_next_page_ignored_while_refresh_in_flight() {
        let mut machine = machine(SharedSession::signed_in());
        load(&mut machine, Action::ViewAppeared, page(1..=20, 57));
        machine.dispatch(Action::ViewAppeared);

        assert!(machine.dispatch(Action::LoadNextPage).effects.is_empty());
    }

    #[test]
    fn load_next_page_ignored_at_end_of_list() {
        let mut machine = machine(SharedSession::signed_in());
        load(&mut machine, Action::ViewAppeared, page(1..=12, 12));

        let transition = machine.dispatch(Action::LoadNextPage);
        assert!(transition.effects.is_empty());
        assert!(!transition.changed);
    }

    #[test]
    fn load_next_page_before_first_load_is_ignored() {
        let mut machine = machine(SharedSession::signed_in());
        assert_eq!(machine.dispatch(Action::LoadNextPage), Transition::default());
    }

    #[test]
    fn failed_page_is_retried_with_same_page() {
        let mut machine = machine(SharedSession::signed_in());
        load(&mut machine, Action::ViewAppeared, page(1..=20, 57));
        let before = machine.state().items.clone();

        let (generation, query) = fetch_of(&machine.dispatch(Action::LoadNextPage));
        machine.complete(Completion::PageFetched {
            generation,
            page: query.page,
            result: Err(NetworkError::new(502, "bad gateway")),
        });

        assert_eq!(machine.state().items, before);
        assert_eq!(machine.state().current_page, 0);
        assert!(!machine.state().is_loading);
        assert_matches!(
            &machine.state().last_event,
            UiEvent::Error(ListError::FetchFailed { page: 1, .. })
        );

        let (_, retry) = fetch_of(&machine.dispatch(Action::LoadNextPage));
        assert_eq!(retry.page, 1);
    }

    #[test]
    fn sort_resets_pagination_to_first_page_response() {
        let mut machine = machine(SharedSession::signed_in());
        load(&mut machine, Action::ViewAppeared, page(1..=20, 57));
        load(&mut machine, Action::LoadNextPage, page(21..=40, 57));

        let transition = machine.dispatch(Action::SortSelected(SortOrder::LevelDesc));
        assert!(machine.state().items.is_empty());
        assert_eq!(machine.state().current_page, 0);

        let (generation, query) = fetch_of(&transition);
        assert_eq!(query.page, 0);
        assert_eq!(query.sort, Some(SortOrder::LevelDesc));
        machine.complete(Completion::PageFetched {
            generation,
            page: 0,
            result: Ok(page([57, 56, 55], 57)),
        });

        assert_eq!(ids(&machine), vec![57, 56, 55]);
        assert_eq!(machine.state().current_page, 0);
    }

    #[test]
    fn filter_and_search_reset_pagination() {
        let mut machine = machine(SharedSession::signed_in());
        load(&mut machine, Action::ViewAppeared, page(1..=20, 57));
        load(&mut machine, Action::LoadNextPage, page(21..=40, 57));

        load(
            &mut machine,
            Action::FilterSelected(ListFilter::level_range(10, 20)),
            page(10..=20, 11),
        );
        assert_eq!(ids(&machine), (10..=20).collect::<Vec<_>>());
        assert_eq!(machine.state().query.min_level, Some(10));
        assert_eq!(machine.state().current_page, 0);

        load(&mut machine, Action::SearchSubmitted("ent".to_string()), page([12], 1));
        assert_eq!(ids(&machine), vec![12]);
        assert_eq!(machine.state().query.keyword.as_deref(), Some("ent"));
        assert_eq!(machine.state().query.min_level, Some(10));
    }

    #[test]
    fn view_appeared_keeps_items_until_response() {
        let mut machine = machine(SharedSession::signed_in());
        load(&mut machine, Action::ViewAppeared, page(1..=20, 57));

        let (generation, _) = fetch_of(&machine.dispatch(Action::ViewAppeared));
        assert_eq!(machine.state().items.len(), 20);

        machine.complete(Completion::PageFetched {
            generation,
            page: 0,
            result: Ok(page([3, 1, 2], 3)),
        });
        assert_eq!(ids(&machine), vec![3, 1, 2]);
    }

    #[test]
    fn stale_response_is_discarded() {
        let mut machine = machine(SharedSession::signed_in());
        let (q1_generation, _) = fetch_of(&machine.dispatch(Action::ViewAppeared));
        let (q2_generation, _) = fetch_of(
            &machine.dispatch(Action::FilterSelected(ListFilter::level_range(1, 5))),
        );

        machine.complete(Completion::PageFetched {
            generation: q2_generation,
            page: 0,
            result: Ok(page(1..=5, 5)),
        });
        let late = machine.complete(Completion::PageFetched {
            generation: q1_generation,
            page: 0,
            result: Ok(page(1..=20, 57)),
        });

        assert!(!late.changed);
        assert_eq!(ids(&machine), vec![1, 2, 3, 4, 5]);
        assert_eq!(machine.state().total_count, 5);
    }

    #[test]
    fn stale_failure_is_discarded_silently() {
        let mut machine = machine(SharedSession::signed_in());
        let (old, _) = fetch_of(&machine.dispatch(Action::ViewAppeared));
        machine.dispatch(Action::SortSelected(SortOrder::NameAsc));

        let transition = machine.complete(Completion::PageFetched {
            generation: old,
            page: 0,
            result: Err(NetworkError::unreachable("timeout")),
        });
        assert!(!transition.changed);
        assert!(machine.state().last_event.is_none());
        assert!(machine.state().is_loading);
    }

    #[test]
    fn invalid_filter_is_ignored() {
        let mut machine = machine(SharedSession::signed_in());
        load(&mut machine, Action::ViewAppeared, page(1..=20, 57));

        let transition = machine.dispatch(Action::FilterSelected(ListFilter::level_range(9, 1)));
        assert_eq!(transition, Transition::default());
        assert_eq!(machine.state().items.len(), 20);
    }

    #[test]
    fn view_appeared_refreshes_login_state() {
        let session = SharedSession::signed_out();
        let mut machine = machine(session.clone());
        assert!(!machine.state().is_logged_in);

        session.set_logged_in(true);
        assert!(!machine.state().is_logged_in);

        machine.dispatch(Action::ViewAppeared);
        assert!(machine.state().is_logged_in);
    }

    #[test]
    fn each_cycle_clears_previous_event() {
        let mut machine = machine(SharedSession::signed_in());
        let (generation, _) = fetch_of(&machine.dispatch(Action::ViewAppeared));
        machine.complete(Completion::PageFetched {
            generation,
            page: 0,
            result: Err(NetworkError::new(500, "boom")),
        });
        assert!(!machine.state().last_event.is_none());

        load(&mut machine, Action::ViewAppeared, page(1..=3, 3));
        assert!(machine.state().last_event.is_none());
    }
}
