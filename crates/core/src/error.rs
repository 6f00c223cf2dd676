use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid configuration: {key}: {message}")]
    Config { key: &'static str, message: String },
}

/// Failure reported by a remote gateway.
///
/// Carried by value inside list state events, so it must stay `Clone`.
/// `status_code` is `None` when no HTTP response was received at all
/// (timeout, DNS failure, connection reset).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkError {
    pub status_code: Option<u16>,
    pub message: String,
}

impl NetworkError {
    pub fn new(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code: Some(status_code),
            message: message.into(),
        }
    }

    /// A failure that never produced a response.
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self {
            status_code: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status_code {
            Some(code) => write!(f, "network error ({code}): {}", self.message),
            None => write!(f, "network error: {}", self.message),
        }
    }
}

impl std::error::Error for NetworkError {}
