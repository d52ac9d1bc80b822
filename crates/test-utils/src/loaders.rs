//! Scripted dataset loaders.
//!
//! [`ScriptedLoader`] answers metadata and image requests from canned
//! responses keyed by URL. Requests for a gated dataset wait until the test
//! releases its [`Gate`], which reproduces out-of-order completion of
//! overlapping dataset switches deterministically.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use dataset_loader::{DecodedImage, EndpointConfig, ImageDecoder, MetadataLoader};
use ocean_common::{DatasetKey, ProcessedMetadata, SyncError, SyncResult};
use tokio::sync::Semaphore;

/// Holds back every request of one dataset until released.
#[derive(Debug, Clone)]
pub struct Gate {
    permits: Arc<Semaphore>,
}

impl Gate {
    fn new() -> Self {
        Self {
            permits: Arc::new(Semaphore::new(0)),
        }
    }

    /// Let all current and future requests through.
    pub fn release(&self) {
        self.permits.add_permits(1);
    }

    async fn wait(&self) {
        // the permit returns on drop, so every waiter passes once released
        if let Ok(permit) = self.permits.acquire().await {
            drop(permit);
        }
    }
}

/// Canned metadata and image responses, keyed by request URL.
#[derive(Debug)]
pub struct ScriptedLoader {
    endpoints: EndpointConfig,
    metadata: HashMap<String, SyncResult<ProcessedMetadata>>,
    images: HashMap<String, SyncResult<DecodedImage>>,
    gates: HashMap<String, Gate>,
    requests: Mutex<Vec<String>>,
}

impl ScriptedLoader {
    pub fn new(endpoints: EndpointConfig) -> Self {
        Self {
            endpoints,
            metadata: HashMap::new(),
            images: HashMap::new(),
            gates: HashMap::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn endpoints(&self) -> &EndpointConfig {
        &self.endpoints
    }

    /// Serve `metadata` and `image` for `key`.
    pub fn with_dataset(
        mut self,
        key: &DatasetKey,
        metadata: ProcessedMetadata,
        image: DecodedImage,
    ) -> Self {
        self.metadata
            .insert(self.endpoints.metadata_url(key), Ok(metadata));
        self.images.insert(self.endpoints.vector_url(key), Ok(image));
        self
    }

    /// Make the metadata request for `key` fail with `error`.
    pub fn with_metadata_error(mut self, key: &DatasetKey, error: SyncError) -> Self {
        self.metadata
            .insert(self.endpoints.metadata_url(key), Err(error));
        self
    }

    /// Make the image request for `key` fail with `error`.
    pub fn with_image_error(mut self, key: &DatasetKey, error: SyncError) -> Self {
        self.images.insert(self.endpoints.vector_url(key), Err(error));
        self
    }

    /// Hold back both requests of `key` until the returned gate is released.
    pub fn gate(&mut self, key: &DatasetKey) -> Gate {
        let gate = Gate::new();
        self.gates
            .insert(self.endpoints.metadata_url(key), gate.clone());
        self.gates
            .insert(self.endpoints.vector_url(key), gate.clone());
        gate
    }

    /// URLs requested so far, in request order.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    async fn admit(&self, url: &str) {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(url.to_string());
        if let Some(gate) = self.gates.get(url) {
            gate.wait().await;
        }
    }
}

fn not_found(url: &str) -> SyncError {
    SyncError::fetch(url, "HTTP 404 Not Found")
}

#[async_trait]
impl MetadataLoader for ScriptedLoader {
    async fn load(&self, url: &str) -> SyncResult<ProcessedMetadata> {
        self.admit(url).await;
        self.metadata
            .get(url)
            .cloned()
            .unwrap_or_else(|| Err(not_found(url)))
    }
}

#[async_trait]
impl ImageDecoder for ScriptedLoader {
    async fn decode(&self, url: &str) -> SyncResult<DecodedImage> {
        self.admit(url).await;
        self.images
            .get(url)
            .cloned()
            .unwrap_or_else(|| Err(not_found(url)))
    }
}
