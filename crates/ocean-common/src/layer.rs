//! Layer and source identifiers, layer definitions and the canonical draw order.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub const OVERLAY_LAYER_ID: &str = "gsla-overlay-layer";
pub const OVERLAY_SOURCE_ID: &str = "gsla-overlay-source";
pub const PARTICLE_LAYER_ID: &str = "gsla-particle-layer";
pub const PARTICLE_SOURCE_ID: &str = "gsla-particle-source";

pub const WAVE_BUOYS_SOURCE_ID: &str = "wave-buoys-source";
pub const WAVE_BUOYS_LAYER_ID: &str = "wave-buoys-layer";
pub const UNCLUSTERED_WAVE_BUOYS_LAYER_ID: &str = "unclustered_wave-buoys-layer";
pub const WAVE_BUOYS_CLUSTER_LABEL_LAYER_ID: &str = "wave-buoys-clusster-label-layer";

// measure points and measure lines share one source
pub const MEASURE_POINTS_SOURCE_ID: &str = "measure-points-source";
pub const MEASURE_POINTS_LAYER_ID: &str = "measure-points-layer";
pub const MEASURE_LINES_LAYER_ID: &str = "measure-lines-layer";

/// Canonical draw order, bottom to top.
pub const LAYERS_ORDER: [&str; 7] = [
    OVERLAY_LAYER_ID,
    PARTICLE_LAYER_ID,
    WAVE_BUOYS_LAYER_ID,
    UNCLUSTERED_WAVE_BUOYS_LAYER_ID,
    WAVE_BUOYS_CLUSTER_LABEL_LAYER_ID,
    MEASURE_LINES_LAYER_ID,
    MEASURE_POINTS_LAYER_ID,
];

/// Unique identifier for a map layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LayerId(pub String);

impl LayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for LayerId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Unique identifier for a map data source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceId(pub String);

impl SourceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SourceId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Layout visibility of a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Visible,
    None,
}

impl Visibility {
    pub fn from_bool(visible: bool) -> Self {
        if visible {
            Visibility::Visible
        } else {
            Visibility::None
        }
    }

    pub fn is_visible(&self) -> bool {
        matches!(self, Visibility::Visible)
    }
}

/// How a layer paints its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    Raster,
    /// Drawn by the particle simulation rather than by the map style.
    Custom,
    Circle,
    Symbol,
    Line,
}

/// A layer definition handed to the map renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    pub id: LayerId,
    pub kind: LayerKind,
    pub source: Option<SourceId>,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Value>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub paint: Value,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub layout: Value,
}

impl LayerSpec {
    pub fn new(id: impl Into<String>, kind: LayerKind, source: Option<&str>) -> Self {
        Self {
            id: LayerId::new(id),
            kind,
            source: source.map(SourceId::new),
            visibility: Visibility::Visible,
            filter: None,
            paint: Value::Null,
            layout: Value::Null,
        }
    }

    pub fn with_visibility(mut self, visible: bool) -> Self {
        self.visibility = Visibility::from_bool(visible);
        self
    }

    pub fn with_filter(mut self, filter: Value) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_paint(mut self, paint: Value) -> Self {
        self.paint = paint;
        self
    }

    pub fn with_layout(mut self, layout: Value) -> Self {
        self.layout = layout;
        self
    }

    /// Sea-level overlay raster.
    pub fn overlay(visible: bool) -> Self {
        Self::new(OVERLAY_LAYER_ID, LayerKind::Raster, Some(OVERLAY_SOURCE_ID))
            .with_visibility(visible)
            .with_paint(json!({ "raster-fade-duration": 0 }))
    }

    /// Particle layer drawn by the vector-field simulation.
    pub fn particles(visible: bool) -> Self {
        Self::new(PARTICLE_LAYER_ID, LayerKind::Custom, Some(PARTICLE_SOURCE_ID))
            .with_visibility(visible)
    }

    /// Clustered buoy circles.
    pub fn wave_buoy_clusters(visible: bool) -> Self {
        Self::new(WAVE_BUOYS_LAYER_ID, LayerKind::Circle, Some(WAVE_BUOYS_SOURCE_ID))
            .with_visibility(visible)
            .with_filter(json!(["has", "point_count"]))
            .with_paint(json!({
                "circle-color": ["step", ["get", "point_count"], "#51bbd6", 100, "#f1f075", 750, "#f28cb1"],
                "circle-radius": ["step", ["get", "point_count"], 20, 100, 30, 750, 40],
            }))
    }

    /// Individual buoys outside any cluster.
    pub fn unclustered_wave_buoys(visible: bool) -> Self {
        Self::new(
            UNCLUSTERED_WAVE_BUOYS_LAYER_ID,
            LayerKind::Circle,
            Some(WAVE_BUOYS_SOURCE_ID),
        )
        .with_visibility(visible)
        .with_filter(json!(["!", ["has", "point_count"]]))
        .with_paint(json!({
            "circle-color": "#11b4da",
            "circle-radius": 8,
            "circle-stroke-width": 1,
            "circle-stroke-color": "#fff",
        }))
    }

    /// Point-count labels on clusters.
    pub fn wave_buoy_cluster_labels(visible: bool) -> Self {
        Self::new(
            WAVE_BUOYS_CLUSTER_LABEL_LAYER_ID,
            LayerKind::Symbol,
            Some(WAVE_BUOYS_SOURCE_ID),
        )
        .with_visibility(visible)
        .with_filter(json!(["has", "point_count"]))
        .with_layout(json!({
            "text-field": "{point_count_abbreviated}",
            "text-font": ["DIN Offc Pro Medium", "Arial Unicode MS Bold"],
            "text-size": 12,
        }))
    }

    /// Vertices of a distance measurement.
    pub fn measure_points(visible: bool) -> Self {
        Self::new(
            MEASURE_POINTS_LAYER_ID,
            LayerKind::Circle,
            Some(MEASURE_POINTS_SOURCE_ID),
        )
        .with_visibility(visible)
        .with_filter(json!(["in", "$type", "Point"]))
        .with_paint(json!({ "circle-radius": 5, "circle-color": "#fff" }))
    }

    /// Path through the measurement vertices.
    pub fn measure_lines(visible: bool) -> Self {
        Self::new(
            MEASURE_LINES_LAYER_ID,
            LayerKind::Line,
            Some(MEASURE_POINTS_SOURCE_ID),
        )
        .with_visibility(visible)
        .with_filter(json!(["in", "$type", "LineString"]))
        .with_layout(json!({ "line-cap": "round", "line-join": "round" }))
        .with_paint(json!({ "line-color": "#ff0000", "line-width": 4, "line-opacity": 1 }))
    }

    /// All layers painting the wave-buoy source, in draw order.
    pub fn wave_buoys(visible: bool) -> Vec<Self> {
        vec![
            Self::wave_buoy_clusters(visible),
            Self::unclustered_wave_buoys(visible),
            Self::wave_buoy_cluster_labels(visible),
        ]
    }
}

/// Required relative draw order of managed layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerOrder {
    ids: Vec<LayerId>,
}

impl LayerOrder {
    /// Order from bottom to top.
    pub fn new(ids: impl IntoIterator<Item = LayerId>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    /// The viewer's fixed order.
    pub fn canonical() -> Self {
        Self::new(LAYERS_ORDER.iter().map(|id| LayerId::new(*id)))
    }

    pub fn iter(&self) -> impl Iterator<Item = &LayerId> {
        self.ids.iter()
    }

    pub fn position(&self, id: &LayerId) -> Option<usize> {
        self.ids.iter().position(|l| l == id)
    }

    pub fn contains(&self, id: &LayerId) -> bool {
        self.position(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl Default for LayerOrder {
    fn default() -> Self {
        Self::canonical()
    }
}
