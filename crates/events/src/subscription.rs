//! Scoped relay listener.
//!
//! A [`RelaySubscription`] is `Listening` from the moment
//! [`BookmarkRelay::subscribe`](crate::bus::BookmarkRelay::subscribe) returns
//! it until [`unsubscribe`](RelaySubscription::unsubscribe) is called or it is
//! dropped. Once `Idle` it never receives again.

use tokio::sync::broadcast;

use crate::bus::BookmarkChangeEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    Idle,
    Listening,
}

pub struct RelaySubscription {
    receiver: Option<broadcast::Receiver<BookmarkChangeEvent>>,
}

impl RelaySubscription {
    pub(crate) fn listening(receiver: broadcast::Receiver<BookmarkChangeEvent>) -> Self {
        Self {
            receiver: Some(receiver),
        }
    }

    pub fn state(&self) -> RelayState {
        if self.receiver.is_some() {
            RelayState::Listening
        } else {
            RelayState::Idle
        }
    }

    /// Wait for the next event.
    ///
    /// Returns `None` once the subscription is idle or the relay has been
    /// dropped. A subscriber that fell behind skips the overwritten events
    /// and keeps listening.
    pub async fn recv(&mut self) -> Option<BookmarkChangeEvent> {
        loop {
            let receiver = self.receiver.as_mut()?;
            match receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(
                        skipped,
                        "Relay subscriber lagged, some bookmark changes were not mirrored"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::debug!("Bookmark relay closed");
                    self.receiver = None;
                    return None;
                }
            }
        }
    }

    /// Stop listening. Idempotent.
    pub fn unsubscribe(&mut self) {
        self.receiver = None;
    }
}
