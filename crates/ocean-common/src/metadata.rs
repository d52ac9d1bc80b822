//! Per-dataset metadata and the geometry derived from it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::range::{BoundsRect, ImageCorners, MaxBounds, ValueRange};

/// Metadata payload published next to each dataset's imagery.
///
/// ```json
/// { "lonRange": [100, 160], "latRange": [-10, 10], "uRange": [-1.2, 1.3], "vRange": [-0.9, 1.1] }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetMetadata {
    pub lon_range: ValueRange,
    pub lat_range: ValueRange,
    pub u_range: ValueRange,
    pub v_range: ValueRange,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MetadataError {
    #[error("{0} contains a non-finite value")]
    NonFinite(&'static str),

    #[error("latitude range [{0}, {1}] is outside [-90, 90]")]
    LatitudeOutOfRange(f64, f64),
}

impl DatasetMetadata {
    /// Parse a metadata payload.
    pub fn from_json(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }

    /// Canonicalize all ranges and derive bounds.
    pub fn process(&self) -> Result<ProcessedMetadata, MetadataError> {
        for (name, range) in [
            ("lonRange", self.lon_range),
            ("latRange", self.lat_range),
            ("uRange", self.u_range),
            ("vRange", self.v_range),
        ] {
            if !range.is_finite() {
                return Err(MetadataError::NonFinite(name));
            }
        }

        let lat = self.lat_range.canonical();
        if lat.start < -90.0 || lat.end > 90.0 {
            return Err(MetadataError::LatitudeOutOfRange(lat.start, lat.end));
        }
        let lon = self.lon_range.canonical();

        Ok(ProcessedMetadata {
            lon_range: lon,
            lat_range: lat,
            u_range: self.u_range.canonical(),
            v_range: self.v_range.canonical(),
            bounds: BoundsRect::from_ranges(lon, lat),
            max_bounds: MaxBounds::from_ranges(lon, lat),
        })
    }
}

/// Metadata with canonical ranges and derived bounds.
///
/// Produced once per dataset switch and never mutated; the next switch
/// produces a new value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedMetadata {
    pub lon_range: ValueRange,
    pub lat_range: ValueRange,
    pub u_range: ValueRange,
    pub v_range: ValueRange,
    pub bounds: BoundsRect,
    pub max_bounds: MaxBounds,
}

impl ProcessedMetadata {
    /// Corners for image sources covering this dataset.
    pub fn image_corners(&self) -> ImageCorners {
        ImageCorners::from_ranges(self.lon_range, self.lat_range)
    }

    /// `[uRange, vRange]`, the component ranges handed to the simulation.
    pub fn vector_range(&self) -> [ValueRange; 2] {
        [self.u_range, self.v_range]
    }
}
