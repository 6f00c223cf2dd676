use std::collections::HashMap;

use tokio::sync::mpsc;

use crate::state::ListState;

/// Identifies one state subscription of a store.
pub type ObserverId = u64;

/// Receiving side of a state subscription.
///
/// The first value received is the state at the time of subscribing; every
/// later value is a distinct state emitted by the store.
///
/// The queue behind a stream is unbounded and never drops a state. A stream
/// that is kept but not read grows with every emission, so drop it or
/// unsubscribe once the screen stops observing.
#[derive(Debug)]
pub struct StateStream {
    id: ObserverId,
    receiver: mpsc::UnboundedReceiver<ListState>,
}

impl StateStream {
    pub fn id(&self) -> ObserverId {
        self.id
    }

    /// Wait for the next state. `None` once the store has shut down or this
    /// observer was removed.
    pub async fn next(&mut self) -> Option<ListState> {
        self.receiver.recv().await
    }

    /// The next state if one is already queued.
    pub fn try_next(&mut self) -> Option<ListState> {
        self.receiver.try_recv().ok()
    }
}

/// Observers of one store, owned by its actor task.
#[derive(Default)]
pub(crate) struct StateObservers {
    next_id: ObserverId,
    senders: HashMap<ObserverId, mpsc::UnboundedSender<ListState>>,
}

impl StateObservers {
    /// Register an observer, seeding it with `current`.
    pub(crate) fn add(&mut self, current: &ListState) -> StateStream {
        let (tx, rx) = mpsc::unbounded_channel();
        let _ = tx.send(current.clone());

        self.next_id += 1;
        let id = self.next_id;
        self.senders.insert(id, tx);
        tracing::debug!(observer_id = id, observers = self.senders.len(), "Observer added");

        StateStream { id, receiver: rx }
    }

    pub(crate) fn remove(&mut self, id: ObserverId) -> bool {
        self.senders.remove(&id).is_some()
    }

    /// Send `state` to every observer, dropping those whose stream is gone.
    pub(crate) fn broadcast(&mut self, state: &ListState) {
        self.senders.retain(|id, sender| {
            let alive = sender.send(state.clone()).is_ok();
            if !alive {
                tracing::debug!(observer_id = id, "Dropping closed observer");
            }
            alive
        });
    }

    pub(crate) fn count(&self) -> usize {
        self.senders.len()
    }
}
