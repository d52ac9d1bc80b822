//! Shared test utilities for the ocean-currents workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Metadata and buoy fixtures
//! - Synthetic vector-field images
//! - Scripted loaders with per-dataset gates
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then hold back one dataset while another completes:
//!
//! ```ignore
//! use test_utils::{key, sample_metadata, uniform_image, ScriptedLoader};
//!
//! let mut loader = ScriptedLoader::new(endpoints)
//!     .with_dataset(&key("25-01-01"), sample_metadata(), uniform_image(8, 4, 255, 128));
//! let gate = loader.gate(&key("25-01-01"));
//! // ... start the switch, then
//! gate.release();
//! ```

pub mod fixtures;
pub mod generators;
pub mod loaders;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;
pub use loaders::{Gate, ScriptedLoader};

/// Macro for approximate floating-point equality assertions.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_approx_eq;
///
/// assert_approx_eq!(1.0001_f64, 1.0_f64, 0.001_f64); // passes
/// assert_approx_eq!(1.1_f32, 1.0_f32, 0.001_f32);    // fails
/// ```
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr, $epsilon:expr) => {{
        let left: f64 = $left as f64;
        let right: f64 = $right as f64;
        let epsilon: f64 = $epsilon as f64;
        let diff = (left - right).abs();
        if diff > epsilon {
            panic!(
                "assertion failed: `(left ≈ right)`\n  left: `{:?}`,\n right: `{:?}`,\n  diff: `{:?}` > epsilon `{:?}`",
                left, right, diff, epsilon
            );
        }
    }};
}
