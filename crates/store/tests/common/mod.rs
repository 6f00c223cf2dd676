#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use codex_core::{EntityId, EntityKind, ListEntity, NetworkError, PageQuery, PagedResult};
use codex_events::BookmarkRelay;
use codex_gateway::{CollectionGateway, InMemoryCatalog, SharedSession};
use codex_store::{ListState, StateStream, StoreDeps};
use tokio::sync::{mpsc, oneshot};

/// Upper bound for any single wait in these tests.
pub const WAIT: Duration = Duration::from_secs(5);

/// Gateways, session and relay shared by every store of one test.
pub struct Fixture {
    pub catalog: Arc<InMemoryCatalog>,
    pub session: SharedSession,
    pub relay: Arc<BookmarkRelay>,
}

impl Fixture {
    /// A signed-in fixture over `count` generated entities.
    pub fn new(count: usize) -> Self {
        Self {
            catalog: Arc::new(InMemoryCatalog::generated(count)),
            session: SharedSession::signed_in(),
            relay: Arc::new(BookmarkRelay::default()),
        }
    }

    pub fn signed_out(self) -> Self {
        self.session.set_logged_in(false);
        self
    }

    /// Dependencies of a search screen over the whole catalog.
    pub fn search_deps(&self) -> StoreDeps {
        self.deps_with(self.catalog.clone())
    }

    /// Dependencies of the bookmark screen.
    pub fn bookmark_deps(&self) -> StoreDeps {
        self.deps_with(Arc::new(self.catalog.bookmarked()))
    }

    pub fn deps_with(&self, collection: Arc<dyn CollectionGateway>) -> StoreDeps {
        StoreDeps {
            collection,
            bookmarks: self.catalog.clone(),
            session: Arc::new(self.session.clone()),
            relay: self.relay.clone(),
        }
    }
}

/// Wait for the first state matching `pred`.
pub async fn wait_for(
    stream: &mut StateStream,
    pred: impl Fn(&ListState) -> bool,
) -> ListState {
    collect_until(stream, pred)
        .await
        .pop()
        .expect("collect_until returns at least the matching state")
}

/// Every state received up to and including the first matching `pred`.
pub async fn collect_until(
    stream: &mut StateStream,
    pred: impl Fn(&ListState) -> bool,
) -> Vec<ListState> {
    let mut seen = Vec::new();
    tokio::time::timeout(WAIT, async {
        while let Some(state) = stream.next().await {
            let done = pred(&state);
            seen.push(state);
            if done {
                return;
            }
        }
        panic!("store closed before the expected state was emitted");
    })
    .await
    .expect("timed out waiting for state");
    seen
}

pub fn ids(state: &ListState) -> Vec<EntityId> {
    state.items.iter().map(|item| item.id).collect()
}

pub fn loaded(count: usize) -> impl Fn(&ListState) -> bool {
    move |state| !state.is_loading && state.items.len() == count
}

// ---------------------------------------------------------------------------
// Scripted collection gateway
// ---------------------------------------------------------------------------

/// A fetch waiting for the test to answer it.
pub struct PendingFetch {
    pub query: PageQuery,
    reply: oneshot::Sender<Result<PagedResult, NetworkError>>,
}

impl PendingFetch {
    pub fn respond(self, result: Result<PagedResult, NetworkError>) {
        let _ = self.reply.send(result);
    }
}

/// Collection gateway whose responses are supplied by the test, in any
/// order, to exercise out-of-order completion.
pub struct ScriptedCollection {
    calls: mpsc::UnboundedSender<PendingFetch>,
}

#[async_trait]
impl CollectionGateway for ScriptedCollection {
    async fn fetch(&self, query: &PageQuery) -> Result<PagedResult, NetworkError> {
        let (reply, response) = oneshot::channel();
        self.calls
            .send(PendingFetch {
                query: query.clone(),
                reply,
            })
            .map_err(|_| NetworkError::unreachable("script dropped"))?;
        response
            .await
            .unwrap_or_else(|_| Err(NetworkError::unreachable("no response scripted")))
    }
}

pub fn scripted() -> (Arc<ScriptedCollection>, mpsc::UnboundedReceiver<PendingFetch>) {
    let (calls, pending) = mpsc::unbounded_channel();
    (Arc::new(ScriptedCollection { calls }), pending)
}

pub async fn next_fetch(pending: &mut mpsc::UnboundedReceiver<PendingFetch>) -> PendingFetch {
    tokio::time::timeout(WAIT, pending.recv())
        .await
        .expect("timed out waiting for a fetch")
        .expect("scripted gateway dropped")
}

pub fn page(ids: impl IntoIterator<Item = EntityId>, total: u64) -> PagedResult {
    PagedResult {
        contents: ids
            .into_iter()
            .map(|id| ListEntity::new(id, format!("entity {id}"), EntityKind::Item))
            .collect(),
        total_elements: total,
    }
}
