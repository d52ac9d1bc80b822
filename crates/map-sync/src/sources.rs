//! Create-or-update of map data sources.

use ocean_common::{ClusterOptions, GeoJsonData, ImageCorners, LayerSource, SourceId, ValueRange};
use tracing::debug;

use crate::error::{MapError, MapResult};
use crate::renderer::MapRenderer;

/// What an upsert did to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
    /// Inputs matched the registered source; the renderer was not touched.
    Unchanged,
}

/// Upserts sources by id.
///
/// Existing sources are mutated in place (`update_image` / `set_geojson_data`)
/// so layers referencing them keep rendering and renderer caches survive.
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceSynchronizer;

impl SourceSynchronizer {
    pub fn new() -> Self {
        Self
    }

    /// Create or update an image source covering `lon_range` x `lat_range`.
    pub fn upsert_image_source<R: MapRenderer + ?Sized>(
        &self,
        map: &mut R,
        id: &SourceId,
        url: &str,
        lon_range: ValueRange,
        lat_range: ValueRange,
    ) -> MapResult<UpsertOutcome> {
        let coordinates = ImageCorners::from_ranges(lon_range, lat_range);

        match map.get_source(id) {
            Some(LayerSource::Image {
                url: current_url,
                coordinates: current_coordinates,
            }) => {
                if current_url == url && current_coordinates == coordinates {
                    return Ok(UpsertOutcome::Unchanged);
                }
                debug!(source = %id, url = %url, "Updating image source in place");
                map.update_image(id, url, coordinates)?;
                Ok(UpsertOutcome::Updated)
            }
            Some(other) => Err(MapError::SourceKindMismatch {
                id: id.clone(),
                expected: "image",
                found: other.kind(),
            }),
            None => {
                map.add_source(
                    id.clone(),
                    LayerSource::Image {
                        url: url.to_string(),
                        coordinates,
                    },
                )?;
                Ok(UpsertOutcome::Created)
            }
        }
    }

    /// Create or update a GeoJSON source.
    ///
    /// `cluster` only takes effect when the source is created; clustering
    /// parameters cannot change afterwards.
    pub fn upsert_geojson_source<R: MapRenderer + ?Sized>(
        &self,
        map: &mut R,
        id: &SourceId,
        data: GeoJsonData,
        cluster: Option<ClusterOptions>,
    ) -> MapResult<UpsertOutcome> {
        match map.get_source(id) {
            Some(LayerSource::GeoJson {
                data: current_data,
                cluster: current_cluster,
            }) => {
                if current_cluster != cluster {
                    debug!(
                        source = %id,
                        "Ignoring cluster options on existing source, fixed at creation"
                    );
                }
                if current_data == data {
                    return Ok(UpsertOutcome::Unchanged);
                }
                debug!(source = %id, "Updating GeoJSON source in place");
                map.set_geojson_data(id, data)?;
                Ok(UpsertOutcome::Updated)
            }
            Some(other) => Err(MapError::SourceKindMismatch {
                id: id.clone(),
                expected: "geojson",
                found: other.kind(),
            }),
            None => {
                map.add_source(id.clone(), LayerSource::GeoJson { data, cluster })?;
                Ok(UpsertOutcome::Created)
            }
        }
    }
}
