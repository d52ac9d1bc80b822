//! Error types for the map renderer boundary.

use ocean_common::{LayerId, SourceId, SyncError};
use thiserror::Error;

/// Result type for renderer operations.
pub type MapResult<T> = Result<T, MapError>;

/// Errors reported by a map renderer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MapError {
    #[error("source already exists: {0}")]
    DuplicateSource(SourceId),

    #[error("layer already exists: {0}")]
    DuplicateLayer(LayerId),

    #[error("source not found: {0}")]
    SourceNotFound(SourceId),

    #[error("layer not found: {0}")]
    LayerNotFound(LayerId),

    #[error("source {id} is a {found} source, expected {expected}")]
    SourceKindMismatch {
        id: SourceId,
        expected: &'static str,
        found: &'static str,
    },
}

impl From<MapError> for SyncError {
    fn from(err: MapError) -> Self {
        SyncError::renderer(err)
    }
}
