//! Endpoint configuration and URL building for dataset assets.

use std::time::Duration;

use ocean_common::DatasetKey;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Where the wave-buoy FeatureCollection comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BuoySource {
    /// OGC API collection summary, independent of the selected date.
    OgcCollection { base_url: String, collection_id: String },
    /// One buoy-locations file per date under the dataset bucket.
    DailyLocations,
    /// A fixed URL.
    Static { url: String },
}

impl Default for BuoySource {
    fn default() -> Self {
        BuoySource::OgcCollection {
            base_url: "/api/aodn".to_string(),
            collection_id: "b299cdcd-3dee-48aa-abdd-e0fcdbb9cadc".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EndpointError {
    #[error("base URL must not be empty")]
    EmptyBaseUrl,

    #[error("asset name '{0}' must not be empty or contain '/'")]
    InvalidAssetName(String),

    #[error("request timeout must be greater than zero")]
    ZeroTimeout,
}

/// Configuration of the dataset endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Bucket holding `GSLA/` and `BUOY/` prefixes.
    pub base_url: String,

    /// Metadata file name inside a dataset directory.
    pub meta_name: String,

    /// Vector-field image file name.
    pub vector_name: String,

    /// Sea-level overlay image file name.
    pub overlay_name: String,

    /// Wave-buoy source.
    pub buoys: BuoySource,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9000".to_string(),
            meta_name: "gsla_meta.json".to_string(),
            vector_name: "gsla_input.png".to_string(),
            overlay_name: "gsla_overlay.png".to_string(),
            buoys: BuoySource::default(),
            request_timeout_secs: 10,
        }
    }
}

impl EndpointConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("OCEAN_S3_BASE_URL") {
            config.base_url = val;
        }

        if let Ok(val) = std::env::var("OCEAN_REQUEST_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                config.request_timeout_secs = secs;
            }
        }

        if let Ok(val) = std::env::var("OCEAN_BUOYS_COLLECTION_ID") {
            let base_url = std::env::var("OCEAN_OGC_BASE_URL")
                .unwrap_or_else(|_| "/api/aodn".to_string());
            config.buoys = BuoySource::OgcCollection {
                base_url,
                collection_id: val,
            };
        } else if std::env::var("OCEAN_BUOYS_DAILY").is_ok_and(|v| v == "1" || v == "true") {
            config.buoys = BuoySource::DailyLocations;
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), EndpointError> {
        if self.base_url.trim().is_empty() {
            return Err(EndpointError::EmptyBaseUrl);
        }
        for name in [&self.meta_name, &self.vector_name, &self.overlay_name] {
            if name.is_empty() || name.contains('/') {
                return Err(EndpointError::InvalidAssetName(name.clone()));
            }
        }
        if self.request_timeout_secs == 0 {
            return Err(EndpointError::ZeroTimeout);
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    /// `{base}/GSLA/{date}/{name}`
    pub fn dataset_url(&self, key: &DatasetKey, name: &str) -> String {
        format!("{}/GSLA/{}/{}", self.base(), key, name)
    }

    pub fn metadata_url(&self, key: &DatasetKey) -> String {
        self.dataset_url(key, &self.meta_name)
    }

    pub fn vector_url(&self, key: &DatasetKey) -> String {
        self.dataset_url(key, &self.vector_name)
    }

    pub fn overlay_url(&self, key: &DatasetKey) -> String {
        self.dataset_url(key, &self.overlay_name)
    }

    /// Wave-buoy FeatureCollection URL for a dataset.
    pub fn buoys_url(&self, key: &DatasetKey) -> String {
        match &self.buoys {
            BuoySource::OgcCollection {
                base_url,
                collection_id,
            } => format!(
                "{}/api/v1/ogc/collections/{}/items/summary",
                base_url.trim_end_matches('/'),
                collection_id
            ),
            BuoySource::DailyLocations => format!(
                "{}/BUOY/buoy_locations/buoy_locations_{}.geojson",
                self.base(),
                key
            ),
            BuoySource::Static { url } => url.clone(),
        }
    }
}
