//! Distance measurement on the map.
//!
//! Measurement vertices and the path through them live in one GeoJSON
//! source painted by two layers: circles for the points, a line for the path.
//! Every edit rewrites that source in place and re-reports the path length.

use map_sync::{MapRenderer, MapResult};
use ocean_common::layer::{
    MEASURE_LINES_LAYER_ID, MEASURE_POINTS_LAYER_ID, MEASURE_POINTS_SOURCE_ID,
};
use ocean_common::{GeoJsonData, LayerSpec, SourceId};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;
use vector_field::VectorFieldController;

use crate::adapters::set_visibility;
use crate::coordinator::{DatasetSyncCoordinator, Scene};

/// Earth's mean radius in kilometers (WGS84).
const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Great-circle distance between two lon/lat points, in kilometers.
pub fn haversine_km(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().min(1.0).asin();

    EARTH_RADIUS_KM * c
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MeasurePoint {
    pub id: u64,
    pub lon: f64,
    pub lat: f64,
}

/// Ordered measurement vertices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasurePath {
    points: Vec<MeasurePoint>,
    next_id: u64,
}

impl MeasurePath {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a vertex and return its id.
    pub fn push(&mut self, lon: f64, lat: f64) -> u64 {
        self.next_id += 1;
        self.points.push(MeasurePoint {
            id: self.next_id,
            lon,
            lat,
        });
        self.next_id
    }

    /// Remove a vertex; the path reconnects its neighbours.
    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.points.len();
        self.points.retain(|p| p.id != id);
        self.points.len() != before
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn points(&self) -> &[MeasurePoint] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Path length in kilometers; `None` with fewer than two vertices.
    pub fn length_km(&self) -> Option<f64> {
        if self.points.len() < 2 {
            return None;
        }
        let total = self
            .points
            .windows(2)
            .map(|w| haversine_km(w[0].lon, w[0].lat, w[1].lon, w[1].lat))
            .sum();
        Some(total)
    }

    /// FeatureCollection of the vertices, followed by the connecting
    /// LineString once there are at least two.
    pub fn to_geojson(&self) -> Value {
        let mut features: Vec<Value> = self
            .points
            .iter()
            .map(|p| {
                json!({
                    "type": "Feature",
                    "geometry": { "type": "Point", "coordinates": [p.lon, p.lat] },
                    "properties": { "id": p.id.to_string() },
                })
            })
            .collect();
        if self.points.len() > 1 {
            let coordinates: Vec<[f64; 2]> = self.points.iter().map(|p| [p.lon, p.lat]).collect();
            features.push(json!({
                "type": "Feature",
                "geometry": { "type": "LineString", "coordinates": coordinates },
                "properties": {},
            }));
        }
        json!({ "type": "FeatureCollection", "features": features })
    }
}

/// Current state of a distance measurement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measurement {
    pub points: Vec<MeasurePoint>,
    pub length_km: Option<f64>,
}

impl From<&MeasurePath> for Measurement {
    fn from(path: &MeasurePath) -> Self {
        Self {
            points: path.points().to_vec(),
            length_km: path.length_km(),
        }
    }
}

impl<R, F> DatasetSyncCoordinator<R, F>
where
    R: MapRenderer + Send,
    F: VectorFieldController + Send,
{
    /// Enter or leave measurement mode. Leaving clears the path.
    pub async fn set_measuring(&self, enabled: bool) -> MapResult<Measurement> {
        let mut scene = self.scene.lock().await;
        scene.ui.measuring = enabled;
        if !enabled {
            scene.measure.clear();
        }
        self.sync_measurement(&mut scene)?;
        Ok(Measurement::from(&scene.measure))
    }

    /// Add a vertex at a clicked point. Ignored outside measurement mode.
    pub async fn add_measure_point(&self, lon: f64, lat: f64) -> MapResult<Measurement> {
        let mut scene = self.scene.lock().await;
        if !scene.ui.measuring {
            debug!(lon, lat, "Not measuring, click ignored");
            return Ok(Measurement::from(&scene.measure));
        }
        scene.measure.push(lon, lat);
        self.sync_measurement(&mut scene)?;
        Ok(Measurement::from(&scene.measure))
    }

    /// Remove a clicked vertex.
    pub async fn remove_measure_point(&self, id: u64) -> MapResult<Measurement> {
        let mut scene = self.scene.lock().await;
        if scene.measure.remove(id) {
            self.sync_measurement(&mut scene)?;
        }
        Ok(Measurement::from(&scene.measure))
    }

    pub async fn measurement(&self) -> Measurement {
        Measurement::from(&self.scene.lock().await.measure)
    }

    /// Write the path into the shared measure source and make sure both
    /// measure layers are attached, in order, with the mode's visibility.
    pub(crate) fn sync_measurement(&self, scene: &mut Scene<R, F>) -> MapResult<()> {
        let Scene {
            map, ui, measure, ..
        } = scene;

        self.sources.upsert_geojson_source(
            map,
            &SourceId::new(MEASURE_POINTS_SOURCE_ID),
            GeoJsonData::Inline(measure.to_geojson()),
            None,
        )?;
        self.orderer
            .ensure_layer(map, LayerSpec::measure_lines(ui.measuring))?;
        self.orderer
            .ensure_layer(map, LayerSpec::measure_points(ui.measuring))?;
        set_visibility(
            map,
            &[MEASURE_LINES_LAYER_ID, MEASURE_POINTS_LAYER_ID],
            ui.measuring,
        )
    }
}
