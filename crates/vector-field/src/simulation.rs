//! Headless CPU particle simulation.
//!
//! Particles live in texture space `[0, 1) x [0, 1)` of the bound field, with
//! `y = 0` at the northern edge. Each frame:
//!
//! 1. the previous frame is faded by `fade_opacity` into a scratch surface,
//! 2. every particle is plotted in a color picked by its normalized speed,
//! 3. the surfaces are swapped,
//! 4. particles advance by the sampled velocity and a speed-dependent share
//!    of them respawns at random positions.
//!
//! The surface maps the field rectangle onto the full drawing surface.

use ocean_common::BoundsRect;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, trace};

use crate::config::{ConfigError, FieldConfig};
use crate::controller::{
    FieldError, FieldState, SurfaceSize, VectorFieldBinding, VectorFieldController,
};
use crate::ramp::ColorRamp;

/// Texture-space step per unit of velocity and speed factor.
const VELOCITY_SCALE: f64 = 0.0001;

/// Position of one particle in texture space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
}

/// Point-in-time view of the simulation, for reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationSnapshot {
    pub state: FieldState,
    pub particle_count: u32,
    pub max_particles: u32,
    pub surface: SurfaceSize,
    pub frames_drawn: u64,
    pub lit_pixels: usize,
    pub bounds: Option<BoundsRect>,
}

/// [`VectorFieldController`] that simulates particles on the CPU and draws
/// them into an RGBA buffer.
///
/// While not animating, [`draw`](VectorFieldController::draw) leaves the
/// surface untouched, and stopping clears it: a stopped simulation shows a
/// blank surface, not a frozen frame.
#[derive(Debug)]
pub struct ParticleSimulation {
    config: FieldConfig,
    ramp: ColorRamp,
    rng: StdRng,
    state: FieldState,
    binding: Option<VectorFieldBinding>,
    particles: Vec<Particle>,
    size: SurfaceSize,
    frame: Vec<u8>,
    scratch: Vec<u8>,
    frames_drawn: u64,
}

impl ParticleSimulation {
    pub fn new(config: FieldConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let ramp = ColorRamp::from_stops(&config.colors)?;
        let requested = i64::from(config.particle_count);

        let mut sim = Self {
            rng: StdRng::seed_from_u64(config.seed),
            config,
            ramp,
            state: FieldState::Uninitialized,
            binding: None,
            particles: Vec::new(),
            size: SurfaceSize::default(),
            frame: Vec::new(),
            scratch: Vec::new(),
            frames_drawn: 0,
        };
        sim.set_particle_num(requested);
        Ok(sim)
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn surface_size(&self) -> SurfaceSize {
        self.size
    }

    /// RGBA pixels of the last drawn frame, row-major.
    pub fn frame(&self) -> &[u8] {
        &self.frame
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    /// Number of pixels with non-zero alpha in the current frame.
    pub fn lit_pixels(&self) -> usize {
        self.frame.chunks_exact(4).filter(|px| px[3] > 0).count()
    }

    pub fn snapshot(&self) -> SimulationSnapshot {
        SimulationSnapshot {
            state: self.state,
            particle_count: self.particle_count(),
            max_particles: self.max_particles(),
            surface: self.size,
            frames_drawn: self.frames_drawn,
            lit_pixels: self.lit_pixels(),
            bounds: self.binding.as_ref().map(|b| b.bounds),
        }
    }

    fn seed_particles(&mut self, count: usize) {
        let rng = &mut self.rng;
        self.particles = (0..count)
            .map(|_| Particle {
                x: rng.gen::<f64>(),
                y: rng.gen::<f64>(),
            })
            .collect();
    }

    fn clear_surface(&mut self) {
        self.frame.fill(0);
        self.scratch.fill(0);
    }

    fn compose(&mut self, binding: &VectorFieldBinding) {
        let fade = self.config.fade_opacity;
        for (dst, src) in self
            .scratch
            .chunks_exact_mut(4)
            .zip(self.frame.chunks_exact(4))
        {
            dst[..3].copy_from_slice(&src[..3]);
            // floor so trails reach zero
            dst[3] = (src[3] as f64 * fade).floor() as u8;
        }

        let max_speed = binding.max_speed();
        let side = self.config.point_size.ceil().max(1.0) as u32;
        let (width, height) = (self.size.width, self.size.height);

        for particle in &self.particles {
            let (u, v) = binding.velocity_at(particle.x, particle.y);
            let t = if max_speed > 0.0 {
                u.hypot(v) / max_speed
            } else {
                0.0
            };
            let color = self.ramp.sample(t).to_array();

            let px = ((particle.x * width as f64) as u32).min(width - 1);
            let py = ((particle.y * height as f64) as u32).min(height - 1);
            for y in py..(py + side).min(height) {
                for x in px..(px + side).min(width) {
                    let i = (y as usize * width as usize + x as usize) * 4;
                    self.scratch[i..i + 4].copy_from_slice(&color);
                }
            }
        }

        std::mem::swap(&mut self.frame, &mut self.scratch);
    }

    fn advance(&mut self, binding: &VectorFieldBinding) {
        let max_speed = binding.max_speed();
        let step = VELOCITY_SCALE * self.config.speed_factor;
        let bounds = binding.bounds;

        for particle in &mut self.particles {
            let (u, v) = binding.velocity_at(particle.x, particle.y);

            // longitude degrees shrink toward the poles
            let lat = bounds.north - particle.y * bounds.height();
            let distortion = lat.to_radians().cos().max(0.01);

            particle.x = (particle.x + u / distortion * step).rem_euclid(1.0);
            particle.y = (particle.y - v * step).rem_euclid(1.0);

            let speed_t = if max_speed > 0.0 {
                u.hypot(v) / max_speed
            } else {
                0.0
            };
            let drop_rate = self.config.drop_rate + speed_t * self.config.drop_rate_bump;
            if self.rng.gen::<f64>() < drop_rate {
                particle.x = self.rng.gen::<f64>();
                particle.y = self.rng.gen::<f64>();
            }
        }
    }
}

impl VectorFieldController for ParticleSimulation {
    fn state(&self) -> FieldState {
        self.state
    }

    fn binding(&self) -> Option<&VectorFieldBinding> {
        self.binding.as_ref()
    }

    fn set_data(&mut self, binding: VectorFieldBinding) {
        debug!(
            width = binding.bitmap.width(),
            height = binding.bitmap.height(),
            state = ?self.state,
            "Binding vector field"
        );
        // instant swap: particles keep their positions and trails fade out
        self.binding = Some(binding);
        if self.state == FieldState::Uninitialized {
            self.state = FieldState::Bound;
        }
    }

    fn start_animation(&mut self) -> Result<(), FieldError> {
        match self.state {
            FieldState::Uninitialized => Err(FieldError::NotBound),
            _ => {
                self.state = FieldState::Animating;
                Ok(())
            }
        }
    }

    fn stop_animation(&mut self) {
        if self.state == FieldState::Uninitialized {
            return;
        }
        self.state = match self.state {
            FieldState::Animating => FieldState::Stopped,
            other => other,
        };
        self.clear_surface();
        self.seed_particles(self.particles.len());
    }

    fn set_particle_num(&mut self, requested: i64) -> u32 {
        let requested = requested.max(1) as f64;
        let max_side = u64::from(self.config.max_texture_dimension);
        let side = (requested.sqrt().ceil() as u64).clamp(1, max_side);
        let count = (side * side).min(u32::MAX as u64) as u32;

        if count as usize != self.particles.len() {
            debug!(requested, count, "Resizing particle state");
            self.seed_particles(count as usize);
        }
        count
    }

    fn particle_count(&self) -> u32 {
        self.particles.len() as u32
    }

    fn max_particles(&self) -> u32 {
        self.config.max_particles()
    }

    fn resize(&mut self, size: SurfaceSize) {
        if size == self.size {
            return;
        }
        debug!(width = size.width, height = size.height, "Reallocating surface buffers");
        self.size = size;
        self.frame = vec![0; size.pixel_count() * 4];
        self.scratch = vec![0; size.pixel_count() * 4];
    }

    fn draw(&mut self) {
        if self.state != FieldState::Animating {
            return;
        }
        let Some(binding) = self.binding.take() else {
            return;
        };

        if !self.size.is_empty() {
            self.compose(&binding);
        }
        self.advance(&binding);
        self.binding = Some(binding);
        self.frames_drawn += 1;
        trace!(frame = self.frames_drawn, "Drew particle frame");
    }
}
