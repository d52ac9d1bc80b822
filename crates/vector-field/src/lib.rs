//! Ocean-current particle simulation.
//!
//! [`VectorFieldController`] is the lifecycle contract the dataset
//! synchronizer drives: bind field data, start and stop animation, change
//! particle density, resize, and draw once per host frame.
//! [`ParticleSimulation`] implements it on the CPU so the pipeline runs
//! headless.
//!
//! # Example
//!
//! ```ignore
//! use vector_field::{FieldConfig, ParticleSimulation, VectorFieldBinding, VectorFieldController};
//!
//! let mut sim = ParticleSimulation::new(FieldConfig::default())?;
//! sim.set_data(VectorFieldBinding::from_metadata(image, &metadata));
//! sim.start_animation()?;
//! sim.draw();
//! ```

pub mod config;
pub mod controller;
pub mod ramp;
pub mod simulation;

pub use config::{ColorStop, ConfigError, FieldConfig, Rgba};
pub use controller::{
    compass_direction, CurrentSample, FieldError, FieldState, SurfaceSize, VectorFieldBinding,
    VectorFieldController,
};
pub use ramp::ColorRamp;
pub use simulation::{Particle, ParticleSimulation, SimulationSnapshot};
