//! Map source and layer synchronization.
//!
//! The map widget is an external collaborator reached through the
//! [`MapRenderer`] capability set. On top of it this crate provides:
//!
//! - [`SourceSynchronizer`]: create-or-update of image and GeoJSON sources,
//!   mutating existing sources in place instead of remove + recreate.
//! - [`LayerOrderer`]: add-if-absent followed by re-asserting the full
//!   canonical order, since renderers put new layers on top.
//! - [`InMemoryMap`]: a headless renderer used by the viewer service and tests.

pub mod error;
pub mod memory;
pub mod order;
pub mod renderer;
pub mod sources;

pub use error::{MapError, MapResult};
pub use memory::{InMemoryMap, MapOps};
pub use order::LayerOrderer;
pub use renderer::MapRenderer;
pub use sources::{SourceSynchronizer, UpsertOutcome};
