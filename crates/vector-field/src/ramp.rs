//! Speed-to-color lookup.

use crate::config::{ColorStop, ConfigError, Rgba};

/// Number of entries in a [`ColorRamp`].
pub const RAMP_SIZE: usize = 256;

/// A 256-entry gradient sampled by normalized particle speed.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorRamp {
    texels: Vec<Rgba>,
}

impl ColorRamp {
    /// Build the ramp from ascending stops in `[0, 1]`.
    ///
    /// Entries before the first stop take its color, entries after the last
    /// stop take the last color.
    pub fn from_stops(stops: &[ColorStop]) -> Result<Self, ConfigError> {
        if stops.len() < 2 {
            return Err(ConfigError::TooFewStops(stops.len()));
        }
        let ascending = stops.windows(2).all(|w| w[0].value < w[1].value);
        let bounded = stops.iter().all(|s| (0.0..=1.0).contains(&s.value));
        if !ascending || !bounded {
            return Err(ConfigError::StopsOutOfOrder);
        }

        let parsed = stops
            .iter()
            .map(|s| Rgba::from_hex(&s.color).map(|c| (s.value, c)))
            .collect::<Result<Vec<_>, _>>()?;

        let texels = (0..RAMP_SIZE)
            .map(|i| interpolate(&parsed, i as f64 / (RAMP_SIZE - 1) as f64))
            .collect();
        Ok(Self { texels })
    }

    /// Color for normalized speed `t`, clamped to `[0, 1]`.
    pub fn sample(&self, t: f64) -> Rgba {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let index = (t * (RAMP_SIZE - 1) as f64).round() as usize;
        self.texels[index.min(RAMP_SIZE - 1)]
    }

    pub fn len(&self) -> usize {
        self.texels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texels.is_empty()
    }
}

fn interpolate(stops: &[(f64, Rgba)], t: f64) -> Rgba {
    let (first_value, first_color) = stops[0];
    if t <= first_value {
        return first_color;
    }
    for pair in stops.windows(2) {
        let (low_value, low_color) = pair[0];
        let (high_value, high_color) = pair[1];
        if t <= high_value {
            let local = (t - low_value) / (high_value - low_value);
            return low_color.lerp(&high_color, local);
        }
    }
    stops[stops.len() - 1].1
}
