//! UI and map event adapters.
//!
//! Visibility toggles, camera gestures, style switches and surface resizes
//! are forwarded to the map renderer and the particle simulation here.

use std::future::Future;
use std::time::Duration;

use map_sync::{MapRenderer, MapResult};
use ocean_common::layer::{
    OVERLAY_LAYER_ID, PARTICLE_LAYER_ID, UNCLUSTERED_WAVE_BUOYS_LAYER_ID,
    WAVE_BUOYS_CLUSTER_LABEL_LAYER_ID, WAVE_BUOYS_LAYER_ID,
};
use ocean_common::{LayerId, Visibility};
use reqwest::Url;
use tokio::sync::mpsc;
use tracing::{debug, info};
use vector_field::{CurrentSample, SurfaceSize, VectorFieldController};

use crate::coordinator::DatasetSyncCoordinator;
use crate::state::MapStyle;

const BUOY_LAYER_IDS: [&str; 3] = [
    WAVE_BUOYS_LAYER_ID,
    UNCLUSTERED_WAVE_BUOYS_LAYER_ID,
    WAVE_BUOYS_CLUSTER_LABEL_LAYER_ID,
];

/// Toggle attached layers. Layers not attached yet pick the setting up when
/// the next sync cycle creates them.
pub(crate) fn set_visibility<R: MapRenderer + ?Sized>(
    map: &mut R,
    ids: &[&str],
    visible: bool,
) -> MapResult<()> {
    let visibility = Visibility::from_bool(visible);
    for id in ids {
        let id = LayerId::new(*id);
        if map.has_layer(&id) {
            map.set_layer_visibility(&id, visibility)?;
        }
    }
    Ok(())
}

fn resume<F: VectorFieldController + ?Sized>(field: &mut F) {
    if field.is_animating() {
        return;
    }
    if let Err(e) = field.start_animation() {
        debug!(error = %e, "Particles stay idle");
    }
}

impl<R, F> DatasetSyncCoordinator<R, F>
where
    R: MapRenderer + Send,
    F: VectorFieldController + Send,
{
    pub async fn set_overlay_visible(&self, visible: bool) -> MapResult<()> {
        let mut scene = self.scene.lock().await;
        scene.ui.overlay = visible;
        set_visibility(&mut scene.map, &[OVERLAY_LAYER_ID], visible)
    }

    /// Toggle the buoy clusters, unclustered buoys and cluster labels together.
    pub async fn set_buoys_visible(&self, visible: bool) -> MapResult<()> {
        let mut scene = self.scene.lock().await;
        scene.ui.circle = visible;
        set_visibility(&mut scene.map, &BUOY_LAYER_IDS, visible)
    }

    /// Show or hide the particle layer, starting or stopping the animation.
    pub async fn set_particles_visible(&self, visible: bool) -> MapResult<()> {
        let mut scene = self.scene.lock().await;
        scene.ui.particles = visible;
        set_visibility(&mut scene.map, &[PARTICLE_LAYER_ID], visible)?;
        if visible {
            resume(&mut scene.field);
        } else {
            scene.field.stop_animation();
        }
        Ok(())
    }

    /// Request a particle count. Returns the count actually in effect.
    pub async fn set_particle_count(&self, requested: i64) -> u32 {
        let mut scene = self.scene.lock().await;
        let count = scene.field.set_particle_num(requested);
        scene.ui.num_particles = count;
        if i64::from(count) != requested {
            debug!(requested, count, "Particle count clamped");
        }
        count
    }

    /// Particles pause while the camera moves.
    pub async fn on_move_start(&self) {
        let mut scene = self.scene.lock().await;
        if scene.ui.particles {
            scene.field.stop_animation();
        }
    }

    pub async fn on_move_end(&self) {
        let mut scene = self.scene.lock().await;
        if scene.ui.particles {
            resume(&mut scene.field);
        }
    }

    pub async fn on_zoom_end(&self, zoom: f64) {
        self.scene.lock().await.ui.set_zoom(zoom);
    }

    /// Switch the base style. The renderer drops every source and layer;
    /// call [`on_style_loaded`](Self::on_style_loaded) once it has loaded.
    pub async fn set_style(&self, style: MapStyle) {
        let mut scene = self.scene.lock().await;
        if scene.ui.style == style {
            return;
        }
        info!(style = style.title(), "Switching map style");
        scene.ui.style = style;
        scene.map.set_style(style.source());
    }

    pub async fn resize(&self, size: SurfaceSize) {
        self.scene.lock().await.field.resize(size);
    }

    /// Current of the displayed dataset at a clicked point.
    ///
    /// `None` before any dataset is bound, outside the dataset bounds, and
    /// where the field carries no data.
    pub async fn current_at(&self, lon: f64, lat: f64) -> Option<CurrentSample> {
        let scene = self.scene.lock().await;
        let sample = scene.field.binding()?.current_at(lon, lat);
        if sample.is_none() {
            debug!(lon, lat, "No current at point");
        }
        sample
    }

    /// Render one animation frame.
    pub async fn draw_frame(&self) {
        self.scene.lock().await.field.draw();
    }

    /// `base` with the current UI state in its query.
    pub async fn share_url(&self, base: &Url) -> Url {
        let mut url = base.clone();
        self.scene.lock().await.ui.write_to_url(&mut url);
        url
    }

    /// Adopt the state encoded in a shared URL. Meant for the initial load,
    /// before [`mount`](Self::mount). Returns the adopted parameter names.
    pub async fn adopt_shared_url(&self, url: &Url) -> Vec<&'static str> {
        let mut scene = self.scene.lock().await;
        let adopted = scene.ui.read_from_url(url);
        if !adopted.is_empty() {
            debug!(?adopted, "Adopted shared state");
        }
        adopted
    }

    /// Apply surface sizes from `events`, coalescing bursts within the
    /// configured debounce window.
    pub async fn run_resize_loop(&self, events: mpsc::Receiver<SurfaceSize>) {
        let window = self.config.resize_debounce();
        debounce_resizes(events, window, |size| self.resize(size)).await;
    }
}

/// Forward the last size of each burst to `apply`.
///
/// A burst ends once `window` passes without a new event. When the channel
/// closes, a pending size is still applied.
pub async fn debounce_resizes<A, Fut>(
    mut events: mpsc::Receiver<SurfaceSize>,
    window: Duration,
    mut apply: A,
) where
    A: FnMut(SurfaceSize) -> Fut,
    Fut: Future<Output = ()>,
{
    while let Some(mut latest) = events.recv().await {
        let mut coalesced = 0u32;
        let closed = loop {
            match tokio::time::timeout(window, events.recv()).await {
                Ok(Some(size)) => {
                    latest = size;
                    coalesced += 1;
                }
                Ok(None) => break true,
                Err(_) => break false,
            }
        };

        debug!(width = latest.width, height = latest.height, coalesced, "Resizing surface");
        apply(latest).await;
        if closed {
            return;
        }
    }
}
