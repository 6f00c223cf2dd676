use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::traits::LoginStateProvider;

/// Login flag shared between the auth flow and every list store.
///
/// Cloning yields another handle to the same flag.
#[derive(Debug, Clone, Default)]
pub struct SharedSession {
    logged_in: Arc<AtomicBool>,
}

impl SharedSession {
    pub fn new(logged_in: bool) -> Self {
        Self {
            logged_in: Arc::new(AtomicBool::new(logged_in)),
        }
    }

    pub fn signed_in() -> Self {
        Self::new(true)
    }

    pub fn signed_out() -> Self {
        Self::new(false)
    }

    pub fn set_logged_in(&self, logged_in: bool) {
        self.logged_in.store(logged_in, Ordering::Release);
        tracing::debug!(logged_in, "Session login state changed");
    }
}

impl LoginStateProvider for SharedSession {
    fn is_logged_in(&self) -> bool {
        self.logged_in.load(Ordering::Acquire)
    }
}
