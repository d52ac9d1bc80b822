//! Value ranges and the rectangles derived from them.

use serde::{Deserialize, Serialize};

/// A two-element range as it appears in dataset metadata: `[a, b]`.
///
/// Ranges may arrive inverted. Consumers that derive geometry from them call
/// [`ValueRange::canonical`] first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct ValueRange {
    pub start: f64,
    pub end: f64,
}

impl ValueRange {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    /// The same range with `start <= end`.
    pub fn canonical(&self) -> Self {
        if self.start <= self.end {
            *self
        } else {
            Self {
                start: self.end,
                end: self.start,
            }
        }
    }

    pub fn is_canonical(&self) -> bool {
        self.start <= self.end
    }

    pub fn is_finite(&self) -> bool {
        self.start.is_finite() && self.end.is_finite()
    }

    pub fn min(&self) -> f64 {
        self.start.min(self.end)
    }

    pub fn max(&self) -> f64 {
        self.start.max(self.end)
    }

    /// Width of the range, always non-negative.
    pub fn span(&self) -> f64 {
        self.max() - self.min()
    }

    /// Map a normalized byte (0..=255) onto this range.
    pub fn denormalize(&self, byte: u8) -> f64 {
        let c = self.canonical();
        c.start + (byte as f64 / 255.0) * (c.end - c.start)
    }

    pub fn to_array(&self) -> [f64; 2] {
        [self.start, self.end]
    }
}

impl From<[f64; 2]> for ValueRange {
    fn from(v: [f64; 2]) -> Self {
        Self::new(v[0], v[1])
    }
}

impl From<ValueRange> for [f64; 2] {
    fn from(r: ValueRange) -> Self {
        r.to_array()
    }
}

/// Rectangle of a dataset in `[lon0, lat1, lon1, lat0]` order
/// (west, north, east, south).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct BoundsRect {
    pub west: f64,
    pub north: f64,
    pub east: f64,
    pub south: f64,
}

impl BoundsRect {
    /// Build from canonical longitude and latitude ranges.
    pub fn from_ranges(lon: ValueRange, lat: ValueRange) -> Self {
        let lon = lon.canonical();
        let lat = lat.canonical();
        Self {
            west: lon.start,
            north: lat.end,
            east: lon.end,
            south: lat.start,
        }
    }

    pub fn to_array(&self) -> [f64; 4] {
        [self.west, self.north, self.east, self.south]
    }

    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    pub fn contains_point(&self, lon: f64, lat: f64) -> bool {
        lon >= self.west && lon <= self.east && lat >= self.south && lat <= self.north
    }
}

impl From<[f64; 4]> for BoundsRect {
    fn from(v: [f64; 4]) -> Self {
        Self {
            west: v[0],
            north: v[1],
            east: v[2],
            south: v[3],
        }
    }
}

impl From<BoundsRect> for [f64; 4] {
    fn from(b: BoundsRect) -> Self {
        b.to_array()
    }
}

/// Pan limit of the map: `[[lonMin, latMin], [lonMax, latMax]]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[[f64; 2]; 2]", into = "[[f64; 2]; 2]")]
pub struct MaxBounds {
    pub south_west: [f64; 2],
    pub north_east: [f64; 2],
}

impl MaxBounds {
    pub fn from_ranges(lon: ValueRange, lat: ValueRange) -> Self {
        let lon = lon.canonical();
        let lat = lat.canonical();
        Self {
            south_west: [lon.start, lat.start],
            north_east: [lon.end, lat.end],
        }
    }

    pub fn to_array(&self) -> [[f64; 2]; 2] {
        [self.south_west, self.north_east]
    }
}

impl From<[[f64; 2]; 2]> for MaxBounds {
    fn from(v: [[f64; 2]; 2]) -> Self {
        Self {
            south_west: v[0],
            north_east: v[1],
        }
    }
}

impl From<MaxBounds> for [[f64; 2]; 2] {
    fn from(b: MaxBounds) -> Self {
        b.to_array()
    }
}

/// Four corners of an image source, clockwise from the top-left:
/// `[[lon0,lat1],[lon1,lat1],[lon1,lat0],[lon0,lat0]]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageCorners(pub [[f64; 2]; 4]);

impl ImageCorners {
    pub fn from_ranges(lon: ValueRange, lat: ValueRange) -> Self {
        let lon = lon.canonical();
        let lat = lat.canonical();
        Self([
            [lon.start, lat.end],
            [lon.end, lat.end],
            [lon.end, lat.start],
            [lon.start, lat.start],
        ])
    }
}
