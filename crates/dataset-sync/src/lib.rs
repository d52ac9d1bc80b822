//! Dataset synchronization for the ocean-current viewer.
//!
//! [`DatasetSyncCoordinator`] reacts to dataset selections and style reloads
//! by loading the dataset's metadata and vector-field image, then applying
//! map bounds, sources, layers and the particle binding in one step. Overlapping
//! requests are ordered by generation: only the latest one may apply.
//!
//! The coordinator also hosts the map interactions that share its scene:
//! layer toggles, distance measurement and current queries at a point.
//!
//! # Example
//!
//! ```ignore
//! use dataset_sync::{DatasetSyncCoordinator, Loaders, MapUiState, Scene, SyncConfig};
//!
//! let scene = Scene::new(map, simulation, MapUiState::for_date(today));
//! let coordinator = DatasetSyncCoordinator::new(scene, Loaders::shared(client), endpoints, config);
//!
//! coordinator.mount().await;
//! coordinator.on_style_loaded().await;
//! coordinator.select_dataset(next).await;
//! ```

pub mod adapters;
pub mod config;
pub mod coordinator;
pub mod events;
pub mod measure;
pub mod state;

pub use adapters::debounce_resizes;
pub use config::{SyncConfig, SyncConfigError};
pub use coordinator::{ActiveDataset, DatasetSyncCoordinator, Loaders, Scene};
pub use events::{SyncEvent, SyncOutcome, SyncPhase, SyncStatus};
pub use measure::{haversine_km, MeasurePath, MeasurePoint, Measurement};
pub use state::{MapStyle, MapUiState, SelectionChange, SelectionTracker};
