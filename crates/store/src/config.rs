use codex_core::config::env_or;
use codex_core::query::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use codex_core::CoreError;

/// Per-store configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Entities requested per page.
    pub page_size: u32,
}

impl StoreConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var           | Default |
    /// |-------------------|---------|
    /// | `CODEX_PAGE_SIZE` | `20`    |
    pub fn from_env() -> Result<Self, CoreError> {
        let page_size: u32 = env_or("CODEX_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        let config = Self { page_size };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(CoreError::Config {
                key: "CODEX_PAGE_SIZE",
                message: format!("page size must be within 1..={MAX_PAGE_SIZE}"),
            });
        }
        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}
