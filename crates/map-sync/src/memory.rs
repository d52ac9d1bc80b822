//! Headless in-memory map renderer.

use std::collections::BTreeMap;

use ocean_common::{
    GeoJsonData, ImageCorners, LayerId, LayerSource, LayerSpec, MaxBounds, SourceId, Visibility,
};
use serde::Serialize;
use tracing::debug;

use crate::error::{MapError, MapResult};
use crate::renderer::MapRenderer;

/// Counts of mutating renderer calls, for asserting that updates happen in place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MapOps {
    pub sources_added: u64,
    pub images_updated: u64,
    pub geojson_updated: u64,
    pub layers_added: u64,
    pub layers_moved: u64,
    pub visibility_set: u64,
    pub style_changes: u64,
}

#[derive(Debug, Clone, Serialize)]
struct SourceEntry {
    source: LayerSource,
    /// Bumped on each in-place data update.
    revision: u64,
}

/// A map renderer that keeps the source/layer graph in memory.
///
/// Layers and sources of the base style are not modelled beyond an optional
/// list of base layer ids that always sit below added layers.
#[derive(Debug, Clone, Serialize)]
pub struct InMemoryMap {
    style: String,
    sources: BTreeMap<SourceId, SourceEntry>,
    layers: Vec<LayerSpec>,
    base_layers: Vec<LayerId>,
    max_bounds: Option<MaxBounds>,
    ops: MapOps,
}

impl InMemoryMap {
    pub fn new(style: impl Into<String>) -> Self {
        Self {
            style: style.into(),
            sources: BTreeMap::new(),
            layers: Vec::new(),
            base_layers: Vec::new(),
            max_bounds: None,
            ops: MapOps::default(),
        }
    }

    /// Include base style layers below anything added later.
    pub fn with_base_layers(mut self, ids: &[&str]) -> Self {
        self.base_layers = ids.iter().map(|id| LayerId::new(*id)).collect();
        self
    }

    pub fn style(&self) -> &str {
        &self.style
    }

    pub fn ops(&self) -> MapOps {
        self.ops
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    pub fn source_ids(&self) -> Vec<SourceId> {
        self.sources.keys().cloned().collect()
    }

    /// Number of in-place updates applied to a source since it was created.
    pub fn source_revision(&self, id: &SourceId) -> Option<u64> {
        self.sources.get(id).map(|e| e.revision)
    }

    pub fn layer(&self, id: &LayerId) -> Option<&LayerSpec> {
        self.layers.iter().find(|l| &l.id == id)
    }

    pub fn layer_visibility(&self, id: &LayerId) -> Option<Visibility> {
        self.layer(id).map(|l| l.visibility)
    }

    pub fn max_bounds(&self) -> Option<MaxBounds> {
        self.max_bounds
    }

    fn layer_index(&self, id: &LayerId) -> Option<usize> {
        self.layers.iter().position(|l| &l.id == id)
    }
}

impl Default for InMemoryMap {
    fn default() -> Self {
        Self::new("Dark")
    }
}

impl MapRenderer for InMemoryMap {
    fn get_source(&self, id: &SourceId) -> Option<LayerSource> {
        self.sources.get(id).map(|e| e.source.clone())
    }

    fn add_source(&mut self, id: SourceId, source: LayerSource) -> MapResult<()> {
        if self.sources.contains_key(&id) {
            return Err(MapError::DuplicateSource(id));
        }
        debug!(source = %id, kind = source.kind(), "Adding source");
        self.sources.insert(id, SourceEntry { source, revision: 0 });
        self.ops.sources_added += 1;
        Ok(())
    }

    fn update_image(
        &mut self,
        id: &SourceId,
        url: &str,
        coordinates: ImageCorners,
    ) -> MapResult<()> {
        let entry = self
            .sources
            .get_mut(id)
            .ok_or_else(|| MapError::SourceNotFound(id.clone()))?;
        match &mut entry.source {
            LayerSource::Image {
                url: current_url,
                coordinates: current_coordinates,
            } => {
                *current_url = url.to_string();
                *current_coordinates = coordinates;
            }
            other => {
                return Err(MapError::SourceKindMismatch {
                    id: id.clone(),
                    expected: "image",
                    found: other.kind(),
                })
            }
        }
        entry.revision += 1;
        self.ops.images_updated += 1;
        Ok(())
    }

    fn set_geojson_data(&mut self, id: &SourceId, data: GeoJsonData) -> MapResult<()> {
        let entry = self
            .sources
            .get_mut(id)
            .ok_or_else(|| MapError::SourceNotFound(id.clone()))?;
        match &mut entry.source {
            LayerSource::GeoJson {
                data: current_data, ..
            } => *current_data = data,
            other => {
                return Err(MapError::SourceKindMismatch {
                    id: id.clone(),
                    expected: "geojson",
                    found: other.kind(),
                })
            }
        }
        entry.revision += 1;
        self.ops.geojson_updated += 1;
        Ok(())
    }

    fn has_layer(&self, id: &LayerId) -> bool {
        self.layer_index(id).is_some()
    }

    fn add_layer(&mut self, layer: LayerSpec) -> MapResult<()> {
        if self.has_layer(&layer.id) || self.base_layers.contains(&layer.id) {
            return Err(MapError::DuplicateLayer(layer.id));
        }
        if let Some(source) = &layer.source {
            if !self.sources.contains_key(source) {
                return Err(MapError::SourceNotFound(source.clone()));
            }
        }
        debug!(layer = %layer.id, "Adding layer");
        self.layers.push(layer);
        self.ops.layers_added += 1;
        Ok(())
    }

    fn move_layer(&mut self, id: &LayerId, before: Option<&LayerId>) -> MapResult<()> {
        let from = self
            .layer_index(id)
            .ok_or_else(|| MapError::LayerNotFound(id.clone()))?;
        if let Some(before) = before {
            if self.layer_index(before).is_none() {
                return Err(MapError::LayerNotFound(before.clone()));
            }
        }

        let layer = self.layers.remove(from);
        let to = match before {
            // looked up after removal so the index accounts for the shift
            Some(before) => self.layer_index(before).unwrap_or(self.layers.len()),
            None => self.layers.len(),
        };
        self.layers.insert(to, layer);
        self.ops.layers_moved += 1;
        Ok(())
    }

    fn layer_ids(&self) -> Vec<LayerId> {
        self.base_layers
            .iter()
            .cloned()
            .chain(self.layers.iter().map(|l| l.id.clone()))
            .collect()
    }

    fn set_layer_visibility(&mut self, id: &LayerId, visibility: Visibility) -> MapResult<()> {
        let index = self
            .layer_index(id)
            .ok_or_else(|| MapError::LayerNotFound(id.clone()))?;
        self.layers[index].visibility = visibility;
        self.ops.visibility_set += 1;
        Ok(())
    }

    fn set_max_bounds(&mut self, bounds: MaxBounds) {
        self.max_bounds = Some(bounds);
    }

    fn set_style(&mut self, style: &str) {
        debug!(style = %style, "Switching style, dropping sources and layers");
        self.style = style.to_string();
        self.sources.clear();
        self.layers.clear();
        self.ops.style_changes += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ocean_common::{LayerKind, ValueRange};

    fn image_source(url: &str) -> LayerSource {
        LayerSource::Image {
            url: url.to_string(),
            coordinates: ImageCorners::from_ranges(
                ValueRange::new(0.0, 1.0),
                ValueRange::new(0.0, 1.0),
            ),
        }
    }

    #[test]
    fn test_duplicate_source_rejected() {
        let mut map = InMemoryMap::default();
        map.add_source(SourceId::new("a"), image_source("a.png")).unwrap();
        assert_eq!(
            map.add_source(SourceId::new("a"), image_source("b.png")),
            Err(MapError::DuplicateSource(SourceId::new("a")))
        );
        assert_eq!(map.source_count(), 1);
    }

    #[test]
    fn test_layer_requires_source() {
        let mut map = InMemoryMap::default();
        let layer = LayerSpec::new("l", LayerKind::Raster, Some("missing"));
        assert_eq!(
            map.add_layer(layer),
            Err(MapError::SourceNotFound(SourceId::new("missing")))
        );
    }

    #[test]
    fn test_move_layer_before_and_top() {
        let mut map = InMemoryMap::default().with_base_layers(&["background"]);
        for id in ["a", "b", "c"] {
            map.add_layer(LayerSpec::new(id, LayerKind::Custom, None)).unwrap();
        }
        map.move_layer(&LayerId::new("c"), Some(&LayerId::new("a")))
            .unwrap();
        assert_eq!(
            map.layer_ids(),
            vec![
                LayerId::new("background"),
                LayerId::new("c"),
                LayerId::new("a"),
                LayerId::new("b")
            ]
        );
        map.move_layer(&LayerId::new("c"), None).unwrap();
        assert_eq!(map.layer_ids().last(), Some(&LayerId::new("c")));
    }

    #[test]
    fn test_style_change_drops_graph() {
        let mut map = InMemoryMap::default();
        map.add_source(SourceId::new("a"), image_source("a.png")).unwrap();
        map.add_layer(LayerSpec::new("l", LayerKind::Raster, Some("a")))
            .unwrap();
        map.set_style("Satellite");
        assert_eq!(map.style(), "Satellite");
        assert_eq!(map.source_count(), 0);
        assert!(!map.has_layer(&LayerId::new("l")));
    }
}
