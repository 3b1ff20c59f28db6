// Error types for docview.
// Separates remote failures, missing documents, and absorbed storage errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocsError {
    #[error("Remote returned HTTP {status} for {url}")]
    RemoteUnavailable { url: String, status: u16 },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Rate limit exceeded, resets at {reset_at}")]
    RateLimited { reset_at: String },

    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Cache storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl DocsError {
    /// Whether re-running the same request could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DocsError::RemoteUnavailable { .. }
                | DocsError::Network(_)
                | DocsError::RateLimited { .. }
        )
    }

    /// Message shown in the UI for this error.
    pub fn user_message(&self) -> String {
        match self {
            DocsError::RemoteUnavailable { status, .. } => {
                format!("Failed to load from GitHub (HTTP {})", status)
            }
            DocsError::Network(e) if e.is_timeout() => {
                "Request to GitHub timed out".to_string()
            }
            DocsError::Network(_) => "Could not reach GitHub".to_string(),
            DocsError::RateLimited { reset_at } => {
                format!("GitHub rate limit reached, resets at {}", reset_at)
            }
            DocsError::NotFound(slug) => format!("Document '{}' not found", slug),
            DocsError::Json(_) => "GitHub returned an unexpected listing".to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DocsError>;
