//! Lifecycle contract of the particle simulation.

use dataset_loader::DecodedImage;
use ocean_common::{BoundsRect, ProcessedMetadata, ValueRange};
use serde::Serialize;
use thiserror::Error;

/// Simulation lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldState {
    /// No field data bound yet.
    Uninitialized,
    Bound,
    Animating,
    Stopped,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("no vector field bound; call set_data before start_animation")]
    NotBound,
}

/// Drawing surface size in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// The unit of data handed to the simulation.
///
/// Red and green channels of `bitmap` encode U and V, normalized over
/// `range[0]` and `range[1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorFieldBinding {
    pub bitmap: DecodedImage,
    pub bounds: BoundsRect,
    pub range: [ValueRange; 2],
}

impl VectorFieldBinding {
    pub fn new(bitmap: DecodedImage, bounds: BoundsRect, range: [ValueRange; 2]) -> Self {
        Self {
            bitmap,
            bounds,
            range,
        }
    }

    /// Binding for a decoded vector image and its dataset metadata.
    pub fn from_metadata(bitmap: DecodedImage, metadata: &ProcessedMetadata) -> Self {
        Self::new(bitmap, metadata.bounds, metadata.vector_range())
    }

    /// Denormalized `(u, v)` at texture coordinates in `[0, 1]`, nearest pixel.
    pub fn velocity_at(&self, x: f64, y: f64) -> (f64, f64) {
        let px = (x.clamp(0.0, 1.0) * self.bitmap.width().saturating_sub(1) as f64).round();
        let py = (y.clamp(0.0, 1.0) * self.bitmap.height().saturating_sub(1) as f64).round();
        let [r, g, _, _] = self.bitmap.pixel(px as u32, py as u32);
        (self.range[0].denormalize(r), self.range[1].denormalize(g))
    }

    /// Image pixel under a geographic point, `None` outside the field bounds.
    ///
    /// The east and south edges belong to the last column and row.
    pub fn pixel_at(&self, lon: f64, lat: f64) -> Option<(u32, u32)> {
        if self.bitmap.is_empty() || !self.bounds.contains_point(lon, lat) {
            return None;
        }
        let width = self.bitmap.width();
        let height = self.bitmap.height();
        let x = ((lon - self.bounds.west) / self.bounds.width() * f64::from(width)).floor();
        let y = ((self.bounds.north - lat) / self.bounds.height() * f64::from(height)).floor();
        Some(((x as u32).min(width - 1), (y as u32).min(height - 1)))
    }

    /// Current at a geographic point.
    ///
    /// `None` outside the bounds and on transparent pixels, which carry no data.
    pub fn current_at(&self, lon: f64, lat: f64) -> Option<CurrentSample> {
        let (x, y) = self.pixel_at(lon, lat)?;
        let [r, g, _, a] = self.bitmap.pixel(x, y);
        if a == 0 {
            return None;
        }
        Some(CurrentSample::new(
            lon,
            lat,
            self.range[0].denormalize(r),
            self.range[1].denormalize(g),
        ))
    }

    /// Largest representable speed, for normalizing particle colors.
    pub fn max_speed(&self) -> f64 {
        let u = self.range[0].min().abs().max(self.range[0].max().abs());
        let v = self.range[1].min().abs().max(self.range[1].max().abs());
        u.hypot(v)
    }
}

const COMPASS: [&str; 8] = ["E", "NE", "N", "NW", "W", "SW", "S", "SE"];

/// Eight-point compass name of a heading in degrees counter-clockwise from east.
pub fn compass_direction(degree: f64) -> &'static str {
    let index = (degree.rem_euclid(360.0) / 45.0).round() as usize % COMPASS.len();
    COMPASS[index]
}

/// Ocean current at a queried point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurrentSample {
    pub lon: f64,
    pub lat: f64,
    pub u: f64,
    pub v: f64,
    /// m/s
    pub speed: f64,
    /// Heading in `[0, 360)`, counter-clockwise from east.
    pub degree: f64,
    pub direction: &'static str,
}

impl CurrentSample {
    pub fn new(lon: f64, lat: f64, u: f64, v: f64) -> Self {
        let degree = v.atan2(u).to_degrees().rem_euclid(360.0);
        Self {
            lon,
            lat,
            u,
            v,
            speed: u.hypot(v),
            degree,
            direction: compass_direction(degree),
        }
    }
}

/// Control surface of a particle simulation.
///
/// The host render loop owns frame timing and calls [`draw`] once per frame;
/// implementations never schedule frames themselves.
///
/// [`draw`]: VectorFieldController::draw
pub trait VectorFieldController {
    fn state(&self) -> FieldState;

    /// The field currently bound, if any.
    fn binding(&self) -> Option<&VectorFieldBinding>;

    /// Replace the bound field wholesale. Moves `Uninitialized` to `Bound` and
    /// leaves other states as they are.
    fn set_data(&mut self, binding: VectorFieldBinding);

    /// Begin advancing particles on each [`draw`](Self::draw).
    fn start_animation(&mut self) -> Result<(), FieldError>;

    /// Halt particle advancement.
    fn stop_animation(&mut self);

    /// Change simulation density. Out-of-range requests are clamped, never
    /// rejected. Returns the resulting particle count.
    fn set_particle_num(&mut self, requested: i64) -> u32;

    fn particle_count(&self) -> u32;

    /// Hardware-informed upper bound for [`particle_count`](Self::particle_count).
    fn max_particles(&self) -> u32;

    /// Reallocate surface-sized buffers. Must follow every surface size change.
    fn resize(&mut self, size: SurfaceSize);

    /// Render one frame. Cheap and non-blocking.
    fn draw(&mut self);

    fn is_animating(&self) -> bool {
        self.state() == FieldState::Animating
    }
}
