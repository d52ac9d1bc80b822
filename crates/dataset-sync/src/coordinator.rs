//! Dataset synchronization coordinator.
//!
//! Every dataset request takes a new generation from a monotonically
//! increasing counter before it starts loading. Metadata and imagery load
//! concurrently; when both are in, the result is applied only if its
//! generation is still the latest. Anything older is dropped on arrival, so a
//! superseded dataset can never overwrite a newer one no matter in which
//! order the loads finish.
//!
//! Applying happens synchronously under the scene lock: map bounds, the three
//! data sources, the managed layers and the simulation binding change together
//! or not at all.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dataset_loader::{DecodedImage, EndpointConfig, ImageDecoder, MetadataLoader};
use map_sync::{LayerOrderer, MapError, MapRenderer, SourceSynchronizer};
use metrics::{counter, gauge};
use ocean_common::layer::{OVERLAY_SOURCE_ID, PARTICLE_SOURCE_ID, WAVE_BUOYS_SOURCE_ID};
use ocean_common::{
    DatasetKey, GeoJsonData, LayerSpec, ProcessedMetadata, SourceId, SyncError,
    SyncResult,
};
use serde::Serialize;
use tokio::sync::{broadcast, watch, Mutex};
use tracing::{debug, info, instrument, warn};
use vector_field::{VectorFieldBinding, VectorFieldController};

use crate::config::SyncConfig;
use crate::events::{SyncEvent, SyncOutcome, SyncPhase, SyncStatus};
use crate::measure::MeasurePath;
use crate::state::{MapUiState, SelectionChange, SelectionTracker};

/// The dataset loaders the coordinator fetches through.
#[derive(Clone)]
pub struct Loaders {
    pub metadata: Arc<dyn MetadataLoader>,
    pub images: Arc<dyn ImageDecoder>,
}

impl Loaders {
    pub fn new(metadata: Arc<dyn MetadataLoader>, images: Arc<dyn ImageDecoder>) -> Self {
        Self { metadata, images }
    }

    /// Use one client for both metadata and imagery.
    pub fn shared<T>(client: Arc<T>) -> Self
    where
        T: MetadataLoader + ImageDecoder + 'static,
    {
        Self {
            metadata: client.clone(),
            images: client,
        }
    }
}

/// The dataset currently on screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveDataset {
    pub dataset: DatasetKey,
    pub generation: u64,
    pub metadata: ProcessedMetadata,
}

/// Everything the apply phase mutates, guarded by one lock.
#[derive(Debug)]
pub struct Scene<R, F> {
    pub map: R,
    pub field: F,
    pub ui: MapUiState,
    pub active: Option<ActiveDataset>,
    pub measure: MeasurePath,
    pub(crate) selection: SelectionTracker,
}

impl<R, F> Scene<R, F> {
    pub fn new(map: R, field: F, ui: MapUiState) -> Self {
        Self {
            map,
            field,
            ui,
            active: None,
            measure: MeasurePath::new(),
            selection: SelectionTracker::new(),
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.selection.current().is_some()
    }
}

/// Keeps map sources, layers and the particle simulation in step with the
/// selected dataset.
pub struct DatasetSyncCoordinator<R, F> {
    pub(crate) endpoints: EndpointConfig,
    pub(crate) config: SyncConfig,
    loaders: Loaders,
    pub(crate) scene: Mutex<Scene<R, F>>,
    generation: AtomicU64,
    status: watch::Sender<SyncStatus>,
    events: broadcast::Sender<SyncEvent>,
    pub(crate) sources: SourceSynchronizer,
    pub(crate) orderer: LayerOrderer,
}

impl<R, F> DatasetSyncCoordinator<R, F>
where
    R: MapRenderer + Send,
    F: VectorFieldController + Send,
{
    pub fn new(
        scene: Scene<R, F>,
        loaders: Loaders,
        endpoints: EndpointConfig,
        config: SyncConfig,
    ) -> Self {
        let (status, _) = watch::channel(SyncStatus::default());
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            endpoints,
            config,
            loaders,
            scene: Mutex::new(scene),
            generation: AtomicU64::new(0),
            status,
            events,
            sources: SourceSynchronizer::new(),
            orderer: LayerOrderer::default(),
        }
    }

    pub fn endpoints(&self) -> &EndpointConfig {
        &self.endpoints
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Latest issued generation.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn status(&self) -> SyncStatus {
        self.status.borrow().clone()
    }

    pub fn watch_status(&self) -> watch::Receiver<SyncStatus> {
        self.status.subscribe()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }

    /// Run `f` against the scene under the apply lock.
    pub async fn inspect<T>(&self, f: impl FnOnce(&Scene<R, F>) -> T) -> T {
        let scene = self.scene.lock().await;
        f(&scene)
    }

    /// Register the UI's initial selection and particle density.
    ///
    /// Starts no sync cycle: the first dataset is displayed when the renderer
    /// reports its style as loaded.
    pub async fn mount(&self) -> SyncOutcome {
        let mut scene = self.scene.lock().await;
        let initial = scene.ui.dataset.clone();
        if scene.selection.observe(initial.clone()) == SelectionChange::Mounted {
            let requested = i64::from(scene.ui.num_particles);
            let count = scene.field.set_particle_num(requested);
            if i64::from(count) != requested {
                debug!(requested, count, "Particle count clamped");
            }
            scene.ui.num_particles = count;
            info!(dataset = %initial, "Mounted");
        }
        SyncOutcome::Skipped
    }

    /// React to a dataset selection from the UI.
    ///
    /// Only a change after mount starts a cycle; the first value ever
    /// observed counts as the mount.
    pub async fn select_dataset(&self, dataset: DatasetKey) -> SyncOutcome {
        // the generation is issued under the same lock as the selection, so
        // generation order always matches selection order
        let generation = {
            let mut scene = self.scene.lock().await;
            scene.ui.dataset = dataset.clone();
            match scene.selection.observe(dataset.clone()) {
                SelectionChange::Mounted | SelectionChange::Unchanged => {
                    return SyncOutcome::Skipped
                }
                SelectionChange::Changed { previous } => {
                    debug!(from = %previous, to = %dataset, "Dataset selection changed");
                    self.begin(&dataset)
                }
            }
        };
        self.run_cycle(dataset, generation).await
    }

    /// The renderer finished loading a style, which drops all sources and
    /// layers. Re-synchronize the current selection from scratch and restore
    /// an ongoing distance measurement.
    pub async fn on_style_loaded(&self) -> SyncOutcome {
        let (dataset, generation) = {
            let scene = self.scene.lock().await;
            let dataset = scene.ui.dataset.clone();
            let generation = self.begin(&dataset);
            (dataset, generation)
        };
        let outcome = self.run_cycle(dataset, generation).await;

        let mut scene = self.scene.lock().await;
        if scene.ui.measuring || !scene.measure.is_empty() {
            if let Err(e) = self.sync_measurement(&mut scene) {
                warn!(error = %e, "Distance measurement not restored");
            }
        }
        outcome
    }

    /// Run one full load-and-apply cycle for `dataset`.
    pub async fn synchronize(&self, dataset: DatasetKey) -> SyncOutcome {
        let generation = self.begin(&dataset);
        self.run_cycle(dataset, generation).await
    }

    /// Issue the next generation for `dataset` and announce the cycle.
    fn begin(&self, dataset: &DatasetKey) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        counter!("dataset_sync_cycles_total").increment(1);
        gauge!("dataset_sync_generation").set(generation as f64);

        self.status.send_modify(|s| {
            s.phase = SyncPhase::Loading;
            s.generation = generation;
        });
        self.publish(SyncEvent::Started {
            dataset: dataset.clone(),
            generation,
        });
        info!(dataset = %dataset, generation, "Loading dataset");
        generation
    }

    #[instrument(skip(self), fields(dataset = %dataset))]
    async fn run_cycle(&self, dataset: DatasetKey, generation: u64) -> SyncOutcome {
        let metadata_url = self.endpoints.metadata_url(&dataset);
        let vector_url = self.endpoints.vector_url(&dataset);
        let loaded = futures::try_join!(
            self.loaders.metadata.load(&metadata_url),
            self.loaders.images.decode(&vector_url),
        );

        let (metadata, image) = match loaded {
            Ok(loaded) => loaded,
            Err(error) => {
                if let Some(outcome) = self.discard_if_stale(&dataset, generation) {
                    return outcome;
                }
                return self.unavailable(dataset, generation, error);
            }
        };

        let mut scene = self.scene.lock().await;
        if let Some(outcome) = self.discard_if_stale(&dataset, generation) {
            return outcome;
        }

        self.status.send_modify(|s| {
            if s.generation == generation {
                s.phase = SyncPhase::Applying;
            }
        });

        match self.apply(&mut scene, &dataset, generation, metadata, image) {
            Ok(()) => {
                drop(scene);
                counter!("dataset_sync_applied_total").increment(1);
                self.status.send_modify(|s| {
                    if s.generation == generation {
                        s.phase = SyncPhase::Idle;
                    }
                    s.active = Some(dataset.clone());
                    s.unavailable = None;
                });
                self.publish(SyncEvent::Applied {
                    dataset: dataset.clone(),
                    generation,
                });
                info!(dataset = %dataset, generation, "Dataset applied");
                SyncOutcome::Applied {
                    dataset,
                    generation,
                }
            }
            Err(error) => {
                drop(scene);
                self.unavailable(dataset, generation, error)
            }
        }
    }

    /// Mutate the scene for a loaded dataset.
    ///
    /// Source kinds are checked before anything is touched, so a rejected
    /// update leaves the previous dataset fully in place.
    fn apply(
        &self,
        scene: &mut Scene<R, F>,
        dataset: &DatasetKey,
        generation: u64,
        metadata: ProcessedMetadata,
        image: DecodedImage,
    ) -> SyncResult<()> {
        let particle_source = SourceId::new(PARTICLE_SOURCE_ID);
        let overlay_source = SourceId::new(OVERLAY_SOURCE_ID);
        let buoy_source = SourceId::new(WAVE_BUOYS_SOURCE_ID);

        let vector_url = self.endpoints.vector_url(dataset);
        let overlay_url = self.endpoints.overlay_url(dataset);
        let buoys = GeoJsonData::url(self.endpoints.buoys_url(dataset));
        let binding = VectorFieldBinding::from_metadata(image, &metadata);

        let Scene {
            map,
            field,
            ui,
            active,
            ..
        } = scene;

        expect_kind(map, &particle_source, "image")?;
        expect_kind(map, &overlay_source, "image")?;
        expect_kind(map, &buoy_source, "geojson")?;

        map.set_max_bounds(metadata.max_bounds);
        self.sources.upsert_image_source(
            map,
            &particle_source,
            &vector_url,
            metadata.lon_range,
            metadata.lat_range,
        )?;
        self.sources.upsert_image_source(
            map,
            &overlay_source,
            &overlay_url,
            metadata.lon_range,
            metadata.lat_range,
        )?;
        self.sources.upsert_geojson_source(
            map,
            &buoy_source,
            buoys,
            Some(self.config.cluster_options()),
        )?;

        let mut layers = vec![LayerSpec::overlay(ui.overlay), LayerSpec::particles(ui.particles)];
        layers.extend(LayerSpec::wave_buoys(ui.circle));
        for layer in layers {
            self.orderer.ensure_layer(map, layer)?;
        }

        field.set_data(binding);
        if ui.particles && !field.is_animating() {
            if let Err(e) = field.start_animation() {
                debug!(error = %e, "Particles stay idle");
            }
        }

        *active = Some(ActiveDataset {
            dataset: dataset.clone(),
            generation,
            metadata,
        });
        Ok(())
    }

    fn discard_if_stale(&self, dataset: &DatasetKey, generation: u64) -> Option<SyncOutcome> {
        let current = self.generation();
        if current == generation {
            return None;
        }

        debug!(dataset = %dataset, generation, current, "Discarding superseded result");
        counter!("dataset_sync_stale_total").increment(1);
        self.publish(SyncEvent::Discarded {
            dataset: dataset.clone(),
            generation,
            current,
        });
        Some(SyncOutcome::Superseded {
            generation,
            current,
        })
    }

    fn unavailable(&self, dataset: DatasetKey, generation: u64, error: SyncError) -> SyncOutcome {
        warn!(
            dataset = %dataset,
            generation,
            kind = error.kind(),
            error = %error,
            "Dataset unavailable"
        );
        counter!("dataset_sync_failed_total", "kind" => error.kind()).increment(1);
        self.status.send_modify(|s| {
            if s.generation == generation {
                s.phase = SyncPhase::Idle;
            }
            s.unavailable = Some(dataset.clone());
        });
        self.publish(SyncEvent::Unavailable {
            dataset: dataset.clone(),
            generation,
            error: error.clone(),
        });
        SyncOutcome::Unavailable { dataset, error }
    }

    fn publish(&self, event: SyncEvent) {
        // no subscribers is fine
        let _ = self.events.send(event);
    }
}

fn expect_kind<R: MapRenderer + ?Sized>(
    map: &R,
    id: &SourceId,
    expected: &'static str,
) -> Result<(), MapError> {
    match map.get_source(id) {
        Some(source) if source.kind() != expected => Err(MapError::SourceKindMismatch {
            id: id.clone(),
            expected,
            found: source.kind(),
        }),
        _ => Ok(()),
    }
}
