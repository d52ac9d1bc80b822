//! Common types shared by the ocean-current viewer crates.

pub mod dataset;
pub mod error;
pub mod layer;
pub mod metadata;
pub mod range;
pub mod source;

pub use dataset::{recent_datasets, DatasetKey};
pub use error::{SyncError, SyncResult};
pub use layer::{LayerId, LayerKind, LayerOrder, LayerSpec, SourceId, Visibility};
pub use metadata::{DatasetMetadata, MetadataError, ProcessedMetadata};
pub use range::{BoundsRect, ImageCorners, MaxBounds, ValueRange};
pub use source::{ClusterOptions, GeoJsonData, LayerSource};
