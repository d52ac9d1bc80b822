//! Viewer configuration.
//!
//! Loaded from a YAML file, or assembled from environment variables when no
//! file is given. Sections that are missing from the file keep their defaults.

use std::path::Path;

use anyhow::{Context, Result};
use dataset_loader::EndpointConfig;
use dataset_sync::SyncConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;
use vector_field::FieldConfig;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub endpoints: EndpointConfig,
    pub field: FieldConfig,
    pub sync: SyncConfig,
}

impl ViewerConfig {
    pub fn from_env() -> Self {
        Self {
            endpoints: EndpointConfig::from_env(),
            field: FieldConfig::default(),
            sync: SyncConfig::from_env(),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: ViewerConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        debug!(path = %path.display(), base_url = %config.endpoints.base_url, "Loaded viewer config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.endpoints
            .validate()
            .context("Invalid endpoint configuration")?;
        self.field
            .validate()
            .context("Invalid particle field configuration")?;
        self.sync
            .validate()
            .context("Invalid sync configuration")?;
        Ok(())
    }
}
