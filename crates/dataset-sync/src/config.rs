//! Coordinator configuration.

use std::time::Duration;

use ocean_common::ClusterOptions;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncConfigError {
    #[error("cluster_radius must be positive")]
    ZeroClusterRadius,

    #[error("event_capacity must be positive")]
    ZeroEventCapacity,
}

/// Settings for the dataset synchronization pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Pixel radius of wave-buoy clusters. Fixed once the source exists.
    pub cluster_radius: u32,

    /// Zoom above which buoys are no longer clustered. Fixed once the source exists.
    pub cluster_max_zoom: u32,

    /// Resize events closer together than this are coalesced.
    pub resize_debounce_ms: u64,

    /// Buffered [`SyncEvent`](crate::SyncEvent)s per subscriber.
    pub event_capacity: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        let cluster = ClusterOptions::default();
        Self {
            cluster_radius: cluster.radius,
            cluster_max_zoom: cluster.max_zoom,
            resize_debounce_ms: 100,
            event_capacity: 64,
        }
    }
}

impl SyncConfig {
    /// Defaults overridden by `OCEAN_CLUSTER_RADIUS`, `OCEAN_CLUSTER_MAX_ZOOM`
    /// and `OCEAN_RESIZE_DEBOUNCE_MS`. Unparseable values are ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(v) = env_parse("OCEAN_CLUSTER_RADIUS") {
            config.cluster_radius = v;
        }
        if let Some(v) = env_parse("OCEAN_CLUSTER_MAX_ZOOM") {
            config.cluster_max_zoom = v;
        }
        if let Some(v) = env_parse("OCEAN_RESIZE_DEBOUNCE_MS") {
            config.resize_debounce_ms = v;
        }
        config
    }

    pub fn validate(&self) -> Result<(), SyncConfigError> {
        if self.cluster_radius == 0 {
            return Err(SyncConfigError::ZeroClusterRadius);
        }
        if self.event_capacity == 0 {
            return Err(SyncConfigError::ZeroEventCapacity);
        }
        Ok(())
    }

    pub fn cluster_options(&self) -> ClusterOptions {
        ClusterOptions {
            radius: self.cluster_radius,
            max_zoom: self.cluster_max_zoom,
        }
    }

    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
