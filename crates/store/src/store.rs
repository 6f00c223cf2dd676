//! The list store actor.
//!
//! Each screen gets one [`ListStore`] running on its own Tokio task. User
//! actions, gateway completions and relay events are all funnelled through
//! that task's `select!` loop, so the machine is only ever touched from one
//! place and every state an observer sees is the result of a whole step.

use std::sync::Arc;

use codex_core::PageQuery;
use codex_events::{BookmarkChangeEvent, BookmarkRelay, RelaySubscription, StoreId};
use codex_gateway::{BookmarkGateway, CollectionGateway, LoginStateProvider};
use tokio::sync::{mpsc, oneshot, watch};
use tokio_util::sync::CancellationToken;

use crate::action::Action;
use crate::config::StoreConfig;
use crate::effect::{Completion, Effect};
use crate::error::StoreError;
use crate::machine::{ListMachine, Transition};
use crate::observers::{ObserverId, StateObservers, StateStream};
use crate::state::ListState;

/// Services a store talks to. Cheap to clone; stores of different screens
/// share the bookmark gateway, session and relay.
#[derive(Clone)]
pub struct StoreDeps {
    pub collection: Arc<dyn CollectionGateway>,
    pub bookmarks: Arc<dyn BookmarkGateway>,
    pub session: Arc<dyn LoginStateProvider>,
    pub relay: Arc<BookmarkRelay>,
}

enum Command {
    Dispatch(Action),
    Subscribe(oneshot::Sender<StateStream>),
    Unsubscribe(ObserverId),
}

pub struct ListStore {
    id: StoreId,
    machine: ListMachine,
    deps: StoreDeps,
    observers: StateObservers,
    latest: watch::Sender<ListState>,
    completions: mpsc::UnboundedSender<Completion>,
    subscription: RelaySubscription,
    cancel: CancellationToken,
}

impl ListStore {
    /// Spawn a store starting from page 0 of the default query.
    pub fn spawn(deps: StoreDeps, config: &StoreConfig) -> ListStoreHandle {
        Self::spawn_with_query(deps, PageQuery::first_page(config.page_size))
    }

    /// Spawn a store starting from `query`.
    ///
    /// The store subscribes to the relay immediately, so changes committed
    /// by other stores are mirrored even before the first `ViewAppeared`.
    pub fn spawn_with_query(deps: StoreDeps, query: PageQuery) -> ListStoreHandle {
        let id = StoreId::new();
        let machine = ListMachine::new(query, Arc::clone(&deps.session));
        let (latest, state) = watch::channel(machine.state().clone());
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let store = ListStore {
            id,
            machine,
            subscription: deps.relay.subscribe(),
            deps,
            observers: StateObservers::default(),
            latest,
            completions: completions_tx,
            cancel: cancel.clone(),
        };
        tokio::spawn(store.run(commands_rx, completions_rx));

        ListStoreHandle {
            id,
            commands: commands_tx,
            state,
            cancel,
        }
    }

    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut completions: mpsc::UnboundedReceiver<Completion>,
    ) {
        tracing::info!(
            store_id = %self.id,
            page_size = self.machine.state().query.page_size,
            "List store started",
        );

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    tracing::info!(
                        store_id = %self.id,
                        observers = self.observers.count(),
                        "List store shutting down",
                    );
                    break;
                }
                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => {
                        tracing::info!(store_id = %self.id, "All handles dropped, stopping list store");
                        break;
                    }
                },
                Some(completion) = completions.recv() => {
                    let transition = self.machine.complete(completion);
                    self.apply(transition);
                }
                Some(event) = self.subscription.recv() => self.relay_event(event),
            }
        }

        // Page fetches in flight are abandoned; bookmark calls finish unobserved.
        self.cancel.cancel();
        self.subscription.unsubscribe();
        commands.close();
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Dispatch(action) => {
                let transition = self.machine.dispatch(action);
                self.apply(transition);
            }
            Command::Subscribe(reply) => {
                let stream = self.observers.add(self.machine.state());
                let _ = reply.send(stream);
            }
            Command::Unsubscribe(observer_id) => {
                self.observers.remove(observer_id);
            }
        }
    }

    fn relay_event(&mut self, event: BookmarkChangeEvent) {
        if event.is_echo_for(self.id) {
            return;
        }
        tracing::debug!(
            store_id = %self.id,
            entity_id = event.entity_id,
            new_bookmark_id = ?event.new_bookmark_id,
            "Mirroring external bookmark change",
        );
        let transition = self.machine.dispatch(Action::ExternalBookmarkChanged {
            entity_id: event.entity_id,
            new_bookmark_id: event.new_bookmark_id,
        });
        self.apply(transition);
    }

    /// Emit the new state if it changed, then run the effects in order.
    fn apply(&mut self, transition: Transition) {
        if transition.changed {
            let state = self.machine.state();
            self.latest.send_replace(state.clone());
            self.observers.broadcast(state);
        }
        for effect in transition.effects {
            self.execute(effect);
        }
    }

    fn execute(&self, effect: Effect) {
        match effect {
            Effect::FetchPage { generation, query } => {
                let gateway = Arc::clone(&self.deps.collection);
                let cancel = self.cancel.clone();
                self.spawn_call(async move {
                    let page = query.page;
                    tokio::select! {
                        _ = cancel.cancelled() => None,
                        result = gateway.fetch(&query) => Some(Completion::PageFetched {
                            generation,
                            page,
                            result,
                        }),
                    }
                });
            }
            Effect::SetBookmark(request) => {
                let gateway = Arc::clone(&self.deps.bookmarks);
                // Not cancelled on shutdown: the service sees the whole call.
                self.spawn_call(async move {
                    let result = gateway
                        .set_bookmark(request.entity_id, request.intent)
                        .await;
                    Some(Completion::BookmarkSet { request, result })
                });
            }
            Effect::PublishChange {
                entity_id,
                new_bookmark_id,
            } => {
                self.deps
                    .relay
                    .publish(BookmarkChangeEvent::new(entity_id, new_bookmark_id).from_store(self.id));
            }
        }
    }

    /// Run a gateway call off the actor task and feed its outcome back.
    fn spawn_call<F>(&self, call: F)
    where
        F: std::future::Future<Output = Option<Completion>> + Send + 'static,
    {
        let completions = self.completions.clone();
        tokio::spawn(async move {
            if let Some(completion) = call.await {
                // Fails only once the store has stopped.
                let _ = completions.send(completion);
            }
        });
    }
}

/// What a screen holds to drive and observe its store.
///
/// Cloning is cheap. The store stops when [`shutdown`](Self::shutdown) is
/// called or every handle has been dropped.
#[derive(Clone)]
pub struct ListStoreHandle {
    id: StoreId,
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<ListState>,
    cancel: CancellationToken,
}

impl ListStoreHandle {
    pub fn id(&self) -> StoreId {
        self.id
    }

    /// Queue an action. Actions are processed in the order they are sent.
    pub fn dispatch(&self, action: Action) -> Result<(), StoreError> {
        self.commands
            .send(Command::Dispatch(action))
            .map_err(|_| StoreError::Closed)
    }

    /// Start observing states. The stream yields the current state first.
    ///
    /// Every state is queued for the stream until it is read; see
    /// [`StateStream`] for releasing an observer that stops reading.
    pub async fn subscribe(&self) -> Result<StateStream, StoreError> {
        let (reply, stream) = oneshot::channel();
        self.commands
            .send(Command::Subscribe(reply))
            .map_err(|_| StoreError::Closed)?;
        stream.await.map_err(|_| StoreError::Closed)
    }

    pub fn unsubscribe(&self, observer_id: ObserverId) -> Result<(), StoreError> {
        self.commands
            .send(Command::Unsubscribe(observer_id))
            .map_err(|_| StoreError::Closed)
    }

    /// The most recently emitted state.
    pub fn state(&self) -> ListState {
        self.state.borrow().clone()
    }

    /// Stop the store. Pending actions and in-flight calls are discarded.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Wait until the store task has stopped.
    pub async fn closed(&self) {
        self.commands.closed().await;
    }

    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }
}
