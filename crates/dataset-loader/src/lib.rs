//! Dataset loading for the ocean-current viewer.
//!
//! Each dataset is published as a small bundle:
//!
//! ```text
//! {base}/GSLA/{yy-mm-dd}/gsla_meta.json     lon/lat/u/v ranges
//! {base}/GSLA/{yy-mm-dd}/gsla_input.png     vector field, u in red, v in green
//! {base}/GSLA/{yy-mm-dd}/gsla_overlay.png   sea-level raster
//! ```
//!
//! plus a wave-buoy GeoJSON FeatureCollection. This crate builds those URLs,
//! fetches the metadata and decodes the vector-field image. The overlay and
//! buoy URLs are handed to the map renderer as-is.
//!
//! # Example
//!
//! ```ignore
//! use dataset_loader::{EndpointConfig, HttpDatasetClient, MetadataLoader, ImageDecoder};
//!
//! let endpoints = EndpointConfig::from_env();
//! let client = HttpDatasetClient::new(&endpoints)?;
//! let key = "25-01-31".parse()?;
//!
//! let meta_url = endpoints.metadata_url(&key);
//! let vector_url = endpoints.vector_url(&key);
//! let (meta, image) = futures::try_join!(client.load(&meta_url), client.decode(&vector_url))?;
//! ```

pub mod endpoints;
pub mod http;
pub mod imagery;
pub mod metadata;

pub use endpoints::{BuoySource, EndpointConfig, EndpointError};
pub use http::HttpDatasetClient;
pub use imagery::{decode_image, DecodedImage, ImageDecoder};
pub use metadata::{parse_metadata, MetadataLoader};
