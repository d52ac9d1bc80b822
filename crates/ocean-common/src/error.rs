//! Error types for the dataset synchronization pipeline.

use thiserror::Error;

/// Result type alias using SyncError.
pub type SyncResult<T> = Result<T, SyncError>;

/// Failure of one dataset switch.
///
/// None of these are fatal: a failed switch leaves the previously applied
/// dataset on screen.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyncError {
    // === Transport ===
    #[error("failed to fetch {url}: {message}")]
    Fetch { url: String, message: String },

    // === Payload ===
    #[error("malformed metadata from {url}: {message}")]
    Parse { url: String, message: String },

    #[error("failed to decode image from {url}: {message}")]
    Decode { url: String, message: String },

    // === Map boundary ===
    #[error("map renderer rejected update: {0}")]
    Renderer(String),

    // === Superseded ===
    #[error("generation {generation} superseded by generation {current}")]
    Stale { generation: u64, current: u64 },
}

impl SyncError {
    pub fn fetch(url: impl Into<String>, message: impl ToString) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.to_string(),
        }
    }

    pub fn parse(url: impl Into<String>, message: impl ToString) -> Self {
        Self::Parse {
            url: url.into(),
            message: message.to_string(),
        }
    }

    pub fn decode(url: impl Into<String>, message: impl ToString) -> Self {
        Self::Decode {
            url: url.into(),
            message: message.to_string(),
        }
    }

    pub fn renderer(message: impl ToString) -> Self {
        Self::Renderer(message.to_string())
    }

    /// A discarded superseded response. Logged at most, never shown to the user.
    pub fn is_stale(&self) -> bool {
        matches!(self, SyncError::Stale { .. })
    }

    /// Short machine-readable kind, used as a metrics label.
    pub fn kind(&self) -> &'static str {
        match self {
            SyncError::Fetch { .. } => "fetch",
            SyncError::Parse { .. } => "parse",
            SyncError::Decode { .. } => "decode",
            SyncError::Renderer(_) => "renderer",
            SyncError::Stale { .. } => "stale",
        }
    }

    /// URL of the request that failed, if the failure came from a request.
    pub fn url(&self) -> Option<&str> {
        match self {
            SyncError::Fetch { url, .. }
            | SyncError::Parse { url, .. }
            | SyncError::Decode { url, .. } => Some(url),
            _ => None,
        }
    }
}
