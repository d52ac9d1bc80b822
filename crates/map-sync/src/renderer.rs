//! The map renderer capability set.

use ocean_common::{
    GeoJsonData, ImageCorners, LayerId, LayerSource, LayerSpec, MaxBounds, SourceId, Visibility,
};

use crate::error::MapResult;

/// Minimal surface of a map widget the synchronization pipeline depends on.
///
/// Any renderer exposing these operations is substitutable. All calls happen
/// on the UI thread, so the trait is not `Send`.
pub trait MapRenderer {
    /// Current definition of a source, if registered.
    fn get_source(&self, id: &SourceId) -> Option<LayerSource>;

    /// Register a new source. Fails if the id is taken.
    fn add_source(&mut self, id: SourceId, source: LayerSource) -> MapResult<()>;

    /// Replace the url and corners of an existing image source.
    fn update_image(&mut self, id: &SourceId, url: &str, coordinates: ImageCorners)
        -> MapResult<()>;

    /// Replace the data of an existing GeoJSON source.
    fn set_geojson_data(&mut self, id: &SourceId, data: GeoJsonData) -> MapResult<()>;

    fn has_layer(&self, id: &LayerId) -> bool;

    /// Add a layer on top of the stack. Fails if the id is taken.
    fn add_layer(&mut self, layer: LayerSpec) -> MapResult<()>;

    /// Move a layer directly below `before`, or to the top when `before` is `None`.
    fn move_layer(&mut self, id: &LayerId, before: Option<&LayerId>) -> MapResult<()>;

    /// Attached layer ids, bottom to top.
    fn layer_ids(&self) -> Vec<LayerId>;

    fn set_layer_visibility(&mut self, id: &LayerId, visibility: Visibility) -> MapResult<()>;

    /// Restrict panning to the dataset rectangle.
    fn set_max_bounds(&mut self, bounds: MaxBounds);

    /// Switch base style. Renderers drop all sources and layers on a style change.
    fn set_style(&mut self, style: &str);
}
