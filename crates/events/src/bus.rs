//! In-process bookmark relay backed by a `tokio::sync::broadcast` channel.
//!
//! [`BookmarkRelay`] is the single publish/subscribe topic for
//! [`BookmarkChangeEvent`]s. One relay is created at application start and
//! shared via `Arc<BookmarkRelay>` with every list store; nothing looks it up
//! globally.

use std::fmt;

use chrono::{DateTime, Utc};
use codex_core::config::env_or;
use codex_core::{BookmarkId, CoreError, EntityId};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::subscription::RelaySubscription;

// ---------------------------------------------------------------------------
// StoreId
// ---------------------------------------------------------------------------

/// Identity of one list store, used to recognise its own relay echoes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoreId(Uuid);

impl StoreId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for StoreId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ---------------------------------------------------------------------------
// BookmarkChangeEvent
// ---------------------------------------------------------------------------

/// A committed bookmark change for one entity.
///
/// Constructed via [`BookmarkChangeEvent::new`] and optionally tagged with
/// the publishing store via [`from_store`](BookmarkChangeEvent::from_store).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkChangeEvent {
    pub entity_id: EntityId,

    /// The bookmark id after the change; `None` when the bookmark was removed.
    pub new_bookmark_id: Option<BookmarkId>,

    /// Store that committed the change, if it came from a list store.
    pub origin: Option<StoreId>,

    /// When the change was acknowledged by the bookmark service (UTC).
    pub occurred_at: DateTime<Utc>,
}

impl BookmarkChangeEvent {
    pub fn new(entity_id: EntityId, new_bookmark_id: Option<BookmarkId>) -> Self {
        Self {
            entity_id,
            new_bookmark_id,
            origin: None,
            occurred_at: Utc::now(),
        }
    }

    /// Tag the event with the store that published it.
    pub fn from_store(mut self, origin: StoreId) -> Self {
        self.origin = Some(origin);
        self
    }

    /// `true` when this event was published by `store`.
    pub fn is_echo_for(&self, store: StoreId) -> bool {
        self.origin == Some(store)
    }
}

// ---------------------------------------------------------------------------
// RelayConfig
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
pub const DEFAULT_CAPACITY: usize = 1024;

/// Relay tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// Events buffered per subscriber before the slowest one starts lagging.
    pub capacity: usize,
}

impl RelayConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default |
    /// |------------------------|---------|
    /// | `CODEX_RELAY_CAPACITY` | `1024`  |
    pub fn from_env() -> Result<Self, CoreError> {
        let capacity: usize = env_or("CODEX_RELAY_CAPACITY", DEFAULT_CAPACITY)?;
        if capacity == 0 {
            return Err(CoreError::Config {
                key: "CODEX_RELAY_CAPACITY",
                message: "capacity must be greater than zero".to_string(),
            });
        }
        Ok(Self { capacity })
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

// ---------------------------------------------------------------------------
// BookmarkRelay
// ---------------------------------------------------------------------------

/// In-process fan-out relay.
///
/// Every subscriber receives every event published while it is listening, in
/// publish order. Events are not stored: a subscriber created after a publish
/// never sees that event.
///
/// # Usage
///
/// ```rust
/// use codex_events::{BookmarkChangeEvent, BookmarkRelay};
///
/// let relay = BookmarkRelay::default();
/// let _subscription = relay.subscribe();
///
/// relay.publish(BookmarkChangeEvent::new(42, Some(901)));
/// ```
pub struct BookmarkRelay {
    sender: broadcast::Sender<BookmarkChangeEvent>,
}

impl BookmarkRelay {
    /// Create a relay with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed events are dropped
    /// and slow subscribers skip ahead (logged as a warning).
    pub fn new(config: &RelayConfig) -> Self {
        let (sender, _) = broadcast::channel(config.capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// With no subscribers the event is silently dropped.
    pub fn publish(&self, event: BookmarkChangeEvent) {
        tracing::debug!(
            entity_id = event.entity_id,
            new_bookmark_id = ?event.new_bookmark_id,
            subscribers = self.sender.receiver_count(),
            "Relaying bookmark change",
        );
        // A SendError only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Start listening for events published from now on.
    pub fn subscribe(&self) -> RelaySubscription {
        RelaySubscription::listening(self.sender.subscribe())
    }

    /// Number of subscriptions currently listening.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BookmarkRelay {
    fn default() -> Self {
        Self::new(&RelayConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
