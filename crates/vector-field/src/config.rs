//! Particle simulation configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Invalid simulation configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid color {0:?}, expected #RRGGBB or #RRGGBBAA")]
    InvalidColor(String),

    #[error("color ramp needs at least 2 stops, got {0}")]
    TooFewStops(usize),

    #[error("color stops must be ascending values within [0, 1]")]
    StopsOutOfOrder,

    #[error("{field} must be {expected}, got {value}")]
    OutOfRange {
        field: &'static str,
        expected: &'static str,
        value: f64,
    },
}

/// RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA` (case-insensitive).
    pub fn from_hex(s: &str) -> Result<Self, ConfigError> {
        let invalid = || ConfigError::InvalidColor(s.to_string());
        let hex = s.strip_prefix('#').ok_or_else(invalid)?;
        if !(hex.len() == 6 || hex.len() == 8) || !hex.is_ascii() {
            return Err(invalid());
        }

        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        let a = if hex.len() == 8 { channel(6)? } else { 255 };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?, a))
    }

    /// Linear interpolation, `t` clamped to `[0, 1]`.
    pub fn lerp(&self, other: &Rgba, t: f64) -> Rgba {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f64 * (1.0 - t) + b as f64 * t).round() as u8;
        Rgba::new(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
            mix(self.a, other.a),
        )
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// A color at a normalized particle speed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    /// Normalized speed in `[0, 1]`.
    pub value: f64,

    /// Hex color, `#RRGGBB` or `#RRGGBBAA`.
    pub color: String,
}

impl ColorStop {
    pub fn new(value: f64, color: impl Into<String>) -> Self {
        Self {
            value,
            color: color.into(),
        }
    }
}

/// Tuning of the particle simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Requested particle count, clamped to `[1, max_particles()]`.
    pub particle_count: u32,

    /// Opacity the previous frame keeps each frame; controls trail length.
    pub fade_opacity: f64,

    pub speed_factor: f64,

    /// Base probability per frame that a particle respawns at a random position.
    pub drop_rate: f64,

    /// Extra respawn probability proportional to normalized speed.
    pub drop_rate_bump: f64,

    pub point_size: f64,

    /// Largest particle-state texture side the hardware supports.
    pub max_texture_dimension: u32,

    /// Seed for particle placement and respawn.
    pub seed: u64,

    pub colors: Vec<ColorStop>,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            particle_count: 10_000,
            fade_opacity: 0.985,
            speed_factor: 5.0,
            drop_rate: 0.003,
            drop_rate_bump: 0.05,
            point_size: 1.2,
            max_texture_dimension: 2048,
            seed: 0x5eed,
            colors: vec![
                ColorStop::new(0.0, "#40E0D0"),
                ColorStop::new(0.33, "#FF8C00"),
                ColorStop::new(0.67, "#FF0080"),
                ColorStop::new(1.0, "#f80759"),
            ],
        }
    }
}

impl FieldConfig {
    /// Hardware maximum particle count.
    pub fn max_particles(&self) -> u32 {
        self.max_texture_dimension.saturating_mul(self.max_texture_dimension)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("fade_opacity", "within [0, 1]", self.fade_opacity, 0.0, 1.0)?;
        check_range("drop_rate", "within [0, 1]", self.drop_rate, 0.0, 1.0)?;
        check_range("drop_rate_bump", "within [0, 1]", self.drop_rate_bump, 0.0, 1.0)?;
        check_range("speed_factor", "non-negative", self.speed_factor, 0.0, f64::MAX)?;
        check_range("point_size", "positive", self.point_size, f64::MIN_POSITIVE, f64::MAX)?;
        if self.max_texture_dimension == 0 {
            return Err(ConfigError::OutOfRange {
                field: "max_texture_dimension",
                expected: "positive",
                value: 0.0,
            });
        }
        if self.colors.len() < 2 {
            return Err(ConfigError::TooFewStops(self.colors.len()));
        }
        Ok(())
    }
}

fn check_range(
    field: &'static str,
    expected: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<(), ConfigError> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            expected,
            value,
        })
    }
}
