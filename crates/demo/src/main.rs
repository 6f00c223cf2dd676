//! Drives a search screen and a bookmark screen over one in-memory catalog.
//!
//! Pages through the search results, removes a bookmark on the search
//! screen, shows the bookmark screen mirroring it, then undoes the removal.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use codex_core::{EntityId, SortOrder};
use codex_events::{BookmarkRelay, RelayConfig};
use codex_gateway::{BookmarkGateway, BookmarkIntent, InMemoryCatalog, SharedSession};
use codex_store::{Action, ListState, ListStore, StateStream, StoreConfig, StoreDeps, UiEvent};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Entity bookmarked up front and toggled from the search screen.
const FEATURED: EntityId = 42;

/// Size of the generated catalog.
const CATALOG_SIZE: usize = 57;

const STATE_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "codex_store=debug,codex_events=debug,codex_demo=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let store_config = StoreConfig::from_env().context("invalid store configuration")?;
    let relay_config = RelayConfig::from_env().context("invalid relay configuration")?;
    tracing::info!(
        page_size = store_config.page_size,
        relay_capacity = relay_config.capacity,
        "Loaded configuration",
    );

    // --- Collaborators ---
    let catalog = Arc::new(InMemoryCatalog::generated(CATALOG_SIZE));
    let featured_kind = catalog
        .entity(FEATURED)
        .await
        .map(|entity| entity.kind)
        .context("featured entity missing from catalog")?;
    catalog
        .set_bookmark(FEATURED, BookmarkIntent::Set { kind: featured_kind })
        .await?;
    let session = SharedSession::signed_in();
    let relay = Arc::new(BookmarkRelay::new(&relay_config));

    let search_deps = StoreDeps {
        collection: catalog.clone(),
        bookmarks: catalog.clone(),
        session: Arc::new(session.clone()),
        relay: Arc::clone(&relay),
    };
    let saved_deps = StoreDeps {
        collection: Arc::new(catalog.bookmarked()),
        ..search_deps.clone()
    };

    // --- Screens ---
    let search = ListStore::spawn(search_deps, &store_config);
    let saved = ListStore::spawn(saved_deps, &store_config);
    let mut search_states = search.subscribe().await?;
    let mut saved_states = saved.subscribe().await?;

    search.dispatch(Action::ViewAppeared)?;
    saved.dispatch(Action::ViewAppeared)?;
    let mut state = until(&mut search_states, settled).await?;
    tracing::info!(items = state.items.len(), total = state.total_count, "Search screen loaded");
    until(&mut saved_states, settled).await?;

    while state.has_next_page() && !state.contains(FEATURED) {
        let loaded = state.items.len();
        search.dispatch(Action::LoadNextPage)?;
        state = until(&mut search_states, |s| settled(s) && s.items.len() > loaded).await?;
        tracing::info!(page = state.current_page, items = state.items.len(), "Loaded next page");
    }

    search.dispatch(Action::ToggleBookmark(FEATURED))?;
    until(&mut search_states, |s| s.last_event == UiEvent::Removed { entity_id: FEATURED }).await?;
    let mirrored = until(&mut saved_states, |s| {
        s.item(FEATURED).is_some_and(|e| !e.is_bookmarked())
    })
    .await?;
    tracing::info!(entity_id = FEATURED, "Bookmark screen mirrored the removal");
    print_items("bookmark screen after removal", &mirrored)?;

    search.dispatch(Action::UndoLastRemoval)?;
    until(&mut search_states, |s| s.last_event == UiEvent::Added { entity_id: FEATURED }).await?;
    let restored = until(&mut saved_states, |s| {
        s.item(FEATURED).is_some_and(|e| e.is_bookmarked())
    })
    .await?;
    print_items("bookmark screen after undo", &restored)?;

    search.dispatch(Action::SortSelected(SortOrder::LevelDesc))?;
    let sorted = until(&mut search_states, settled).await?;
    print_items("search screen by level", &sorted)?;

    search.shutdown();
    saved.shutdown();
    search.closed().await;
    saved.closed().await;
    tracing::info!("Demo finished");
    Ok(())
}

fn settled(state: &ListState) -> bool {
    !state.is_loading && !state.items.is_empty()
}

async fn until(
    stream: &mut StateStream,
    pred: impl Fn(&ListState) -> bool,
) -> anyhow::Result<ListState> {
    tokio::time::timeout(STATE_TIMEOUT, async {
        while let Some(state) = stream.next().await {
            if let UiEvent::Error(e) = &state.last_event {
                anyhow::bail!("store reported an error: {e}");
            }
            if pred(&state) {
                return Ok(state);
            }
        }
        anyhow::bail!("store stopped unexpectedly")
    })
    .await
    .context("timed out waiting for list state")?
}

fn print_items(label: &str, state: &ListState) -> anyhow::Result<()> {
    let items: Vec<_> = state.items.iter().take(5).collect();
    println!("{label} ({} of {}):", state.items.len(), state.total_count);
    println!("{}", serde_json::to_string_pretty(&items)?);
    Ok(())
}
