//! Metadata loading.

use async_trait::async_trait;
use ocean_common::{DatasetMetadata, ProcessedMetadata, SyncError, SyncResult};

/// Fetches a dataset's metadata and derives its bounds.
///
/// Implementations fail with [`SyncError::Fetch`] on transport failure and
/// [`SyncError::Parse`] on a malformed payload. No caching beyond what the
/// transport provides.
#[async_trait]
pub trait MetadataLoader: Send + Sync {
    async fn load(&self, url: &str) -> SyncResult<ProcessedMetadata>;
}

/// Parse and normalize a metadata payload fetched from `url`.
pub fn parse_metadata(url: &str, body: &[u8]) -> SyncResult<ProcessedMetadata> {
    let raw = DatasetMetadata::from_json(body).map_err(|e| SyncError::parse(url, e))?;
    raw.process().map_err(|e| SyncError::parse(url, e))
}
