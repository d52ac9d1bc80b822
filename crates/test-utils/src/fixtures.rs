//! Common test fixtures for dataset synchronization tests.

use ocean_common::{DatasetKey, DatasetMetadata, ProcessedMetadata};
use serde_json::{json, Value};

/// Parse a dataset key, panicking on malformed input.
pub fn key(s: &str) -> DatasetKey {
    DatasetKey::parse(s).unwrap_or_else(|e| panic!("bad fixture key: {}", e))
}

/// Metadata payload as served next to each dataset.
pub fn metadata_json(lon: [f64; 2], lat: [f64; 2], u: [f64; 2], v: [f64; 2]) -> String {
    json!({
        "lonRange": lon,
        "latRange": lat,
        "uRange": u,
        "vRange": v,
    })
    .to_string()
}

/// Processed metadata covering `lon` x `lat` with unit vector ranges.
pub fn metadata_for(lon: [f64; 2], lat: [f64; 2]) -> ProcessedMetadata {
    let raw = DatasetMetadata {
        lon_range: lon.into(),
        lat_range: lat.into(),
        u_range: [-1.0, 1.0].into(),
        v_range: [-1.0, 1.0].into(),
    };
    raw.process()
        .unwrap_or_else(|e| panic!("bad fixture metadata: {}", e))
}

/// Australian region: lon [100, 160], lat [-10, 10].
pub fn sample_metadata() -> ProcessedMetadata {
    metadata_for([100.0, 160.0], [-10.0, 10.0])
}

/// A buoy FeatureCollection with `count` points along the equator.
pub fn buoy_feature_collection(count: usize) -> Value {
    let features: Vec<Value> = (0..count)
        .map(|i| {
            json!({
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [110.0 + i as f64, 0.0] },
                "properties": { "site_name": format!("Buoy {}", i), "WHTH": 1.5 },
            })
        })
        .collect();
    json!({ "type": "FeatureCollection", "features": features })
}
