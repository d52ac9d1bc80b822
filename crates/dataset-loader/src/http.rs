//! HTTP transport for metadata and imagery.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use ocean_common::{ProcessedMetadata, SyncError, SyncResult};
use reqwest::Client;
use tracing::{debug, instrument};

use crate::endpoints::EndpointConfig;
use crate::imagery::{decode_image, DecodedImage, ImageDecoder};
use crate::metadata::{parse_metadata, MetadataLoader};

/// Fetches dataset assets over HTTP.
#[derive(Debug, Clone)]
pub struct HttpDatasetClient {
    client: Client,
}

impl HttpDatasetClient {
    /// Create a client using the endpoint timeout.
    pub fn new(config: &EndpointConfig) -> SyncResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(Duration::from_secs(10))
            .pool_max_idle_per_host(4)
            .build()
            .map_err(|e| SyncError::fetch(&config.base_url, e))?;

        Ok(Self { client })
    }

    /// Wrap an existing client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn fetch_bytes(&self, url: &str) -> SyncResult<Bytes> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SyncError::fetch(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::fetch(url, format!("HTTP {}", status)));
        }

        let bytes = response.bytes().await.map_err(|e| SyncError::fetch(url, e))?;
        debug!(url = %url, size = bytes.len(), "Fetched dataset asset");
        Ok(bytes)
    }
}

#[async_trait]
impl MetadataLoader for HttpDatasetClient {
    #[instrument(skip(self))]
    async fn load(&self, url: &str) -> SyncResult<ProcessedMetadata> {
        let body = self.fetch_bytes(url).await?;
        parse_metadata(url, &body)
    }
}

#[async_trait]
impl ImageDecoder for HttpDatasetClient {
    #[instrument(skip(self))]
    async fn decode(&self, url: &str) -> SyncResult<DecodedImage> {
        let body = self.fetch_bytes(url).await?;
        let url = url.to_string();
        // decoding a large PNG is CPU-bound; keep it off the async workers
        tokio::task::spawn_blocking(move || decode_image(&url, &body))
            .await
            .map_err(|e| SyncError::decode("<decode task>", e))?
    }
}
