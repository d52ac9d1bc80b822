//! Map data sources.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::range::ImageCorners;

/// Data of a GeoJSON source: either a URL the renderer fetches, or an inline document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GeoJsonData {
    Url(String),
    Inline(Value),
}

impl GeoJsonData {
    pub fn url(url: impl Into<String>) -> Self {
        GeoJsonData::Url(url.into())
    }

    /// Number of features, when the data is an inline FeatureCollection.
    pub fn feature_count(&self) -> Option<usize> {
        match self {
            GeoJsonData::Inline(v) => v.get("features").and_then(Value::as_array).map(Vec::len),
            GeoJsonData::Url(_) => None,
        }
    }
}

/// Point clustering parameters of a GeoJSON source.
///
/// Fixed when the source is created; later updates only replace the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterOptions {
    pub radius: u32,
    pub max_zoom: u32,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            radius: 50,
            max_zoom: 16,
        }
    }
}

/// A source registered with the map renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LayerSource {
    Image {
        url: String,
        coordinates: ImageCorners,
    },
    #[serde(rename = "geojson")]
    GeoJson {
        data: GeoJsonData,
        cluster: Option<ClusterOptions>,
    },
}

impl LayerSource {
    pub fn kind(&self) -> &'static str {
        match self {
            LayerSource::Image { .. } => "image",
            LayerSource::GeoJson { .. } => "geojson",
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, LayerSource::Image { .. })
    }

    pub fn is_geojson(&self) -> bool {
        matches!(self, LayerSource::GeoJson { .. })
    }
}
