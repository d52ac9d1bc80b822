//! Sync cycle tests for the dataset coordinator.
//!
//! Overlapping dataset switches are driven with gated loaders so completion
//! order is controlled by the test, not by scheduling.

use std::sync::Arc;

use chrono::NaiveDate;
use dataset_loader::{BuoySource, EndpointConfig};
use dataset_sync::{
    haversine_km, DatasetSyncCoordinator, Loaders, MapStyle, MapUiState, Scene, SyncConfig,
    SyncEvent, SyncOutcome, SyncPhase,
};
use map_sync::{InMemoryMap, MapRenderer};
use ocean_common::layer::{
    MEASURE_LINES_LAYER_ID, MEASURE_POINTS_LAYER_ID, MEASURE_POINTS_SOURCE_ID, OVERLAY_LAYER_ID,
    OVERLAY_SOURCE_ID, PARTICLE_LAYER_ID, PARTICLE_SOURCE_ID, UNCLUSTERED_WAVE_BUOYS_LAYER_ID,
    WAVE_BUOYS_CLUSTER_LABEL_LAYER_ID, WAVE_BUOYS_LAYER_ID, WAVE_BUOYS_SOURCE_ID,
};
use ocean_common::{
    ClusterOptions, DatasetKey, GeoJsonData, LayerId, LayerOrder, LayerSource, ProcessedMetadata,
    SourceId, SyncError, Visibility,
};
use reqwest::Url;
use test_utils::{
    assert_approx_eq, key, metadata_for, sample_metadata, uniform_image, ScriptedLoader,
};
use vector_field::{FieldConfig, FieldState, ParticleSimulation, VectorFieldController};

type Coordinator = DatasetSyncCoordinator<InMemoryMap, ParticleSimulation>;

// ============================================================================
// Helpers
// ============================================================================

fn endpoints() -> EndpointConfig {
    EndpointConfig::new("https://data.example/ocean")
}

fn ui() -> MapUiState {
    MapUiState::for_date(NaiveDate::from_ymd_opt(2025, 3, 10).unwrap())
}

/// The initial selection of [`ui`].
fn first() -> DatasetKey {
    key("25-03-01")
}

fn second() -> DatasetKey {
    key("25-03-02")
}

fn third() -> DatasetKey {
    key("25-03-03")
}

fn second_metadata() -> ProcessedMetadata {
    metadata_for([0.0, 50.0], [-40.0, -20.0])
}

fn third_metadata() -> ProcessedMetadata {
    metadata_for([-80.0, -20.0], [20.0, 60.0])
}

fn loader() -> ScriptedLoader {
    ScriptedLoader::new(endpoints())
        .with_dataset(&first(), sample_metadata(), uniform_image(8, 4, 255, 128))
        .with_dataset(&second(), second_metadata(), uniform_image(8, 4, 0, 128))
        .with_dataset(&third(), third_metadata(), uniform_image(8, 4, 128, 255))
}

fn simulation() -> ParticleSimulation {
    ParticleSimulation::new(FieldConfig {
        particle_count: 64,
        ..Default::default()
    })
    .unwrap()
}

fn build(loader: ScriptedLoader, ui: MapUiState) -> (Arc<Coordinator>, Arc<ScriptedLoader>) {
    let loader = Arc::new(loader);
    let scene = Scene::new(InMemoryMap::default(), simulation(), ui);
    let coordinator = DatasetSyncCoordinator::new(
        scene,
        Loaders::shared(loader.clone()),
        loader.endpoints().clone(),
        SyncConfig::default(),
    );
    (Arc::new(coordinator), loader)
}

/// Mounted, style loaded, first dataset applied.
async fn displayed(loader: ScriptedLoader) -> (Arc<Coordinator>, Arc<ScriptedLoader>) {
    let (coordinator, loader) = build(loader, ui());
    coordinator.mount().await;
    let outcome = coordinator.on_style_loaded().await;
    assert!(outcome.is_applied(), "initial apply failed: {:?}", outcome);
    (coordinator, loader)
}

async fn wait_for_generation(coordinator: &Coordinator, generation: u64) {
    while coordinator.generation() < generation {
        tokio::task::yield_now().await;
    }
}

fn image_url(map: &InMemoryMap, id: &str) -> Option<String> {
    match map.get_source(&SourceId::new(id)) {
        Some(LayerSource::Image { url, .. }) => Some(url),
        _ => None,
    }
}

fn visibility(map: &InMemoryMap, id: &str) -> Option<Visibility> {
    map.layer_visibility(&LayerId::new(id))
}

fn geojson_data(map: &InMemoryMap, id: &str) -> Option<GeoJsonData> {
    match map.get_source(&SourceId::new(id)) {
        Some(LayerSource::GeoJson { data, .. }) => Some(data),
        _ => None,
    }
}

/// Attached layers of the canonical order, bottom to top.
fn managed_layers(map: &InMemoryMap) -> Vec<LayerId> {
    let order = LayerOrder::canonical();
    map.layer_ids()
        .into_iter()
        .filter(|id| order.contains(id))
        .collect()
}

// ============================================================================
// Out-of-order completion
// ============================================================================

#[tokio::test]
async fn test_superseded_switch_finishing_last_is_discarded() {
    let mut loader = loader();
    let slow = loader.gate(&second());
    let (coordinator, _) = displayed(loader).await;

    let pending = tokio::spawn({
        let coordinator = coordinator.clone();
        async move { coordinator.select_dataset(second()).await }
    });
    wait_for_generation(&coordinator, 2).await;

    let latest = coordinator.select_dataset(third()).await;
    assert_eq!(
        latest,
        SyncOutcome::Applied {
            dataset: third(),
            generation: 3
        }
    );

    slow.release();
    let stale = pending.await.unwrap();
    assert_eq!(
        stale,
        SyncOutcome::Superseded {
            generation: 2,
            current: 3
        }
    );

    let expected = third_metadata();
    coordinator
        .inspect(|scene| {
            assert_eq!(scene.map.max_bounds(), Some(expected.max_bounds));
            assert_eq!(
                image_url(&scene.map, PARTICLE_SOURCE_ID),
                Some(endpoints().vector_url(&third()))
            );
            let active = scene.active.as_ref().unwrap();
            assert_eq!(active.dataset, third());
            assert_eq!(active.metadata, expected);
            let binding = scene.field.binding().unwrap();
            assert_eq!(binding.bounds, expected.bounds);
            // third dataset's image encodes u = 0, v = 1
            let (u, v) = binding.velocity_at(0.5, 0.5);
            assert_approx_eq!(u, 0.0, 0.01);
            assert_approx_eq!(v, 1.0, 1e-9);
        })
        .await;
}

#[tokio::test]
async fn test_superseded_switch_finishing_first_is_discarded() {
    let mut loader = loader();
    let slow = loader.gate(&second());
    let slower = loader.gate(&third());
    let (coordinator, _) = displayed(loader).await;

    let older = tokio::spawn({
        let coordinator = coordinator.clone();
        async move { coordinator.select_dataset(second()).await }
    });
    wait_for_generation(&coordinator, 2).await;
    let newer = tokio::spawn({
        let coordinator = coordinator.clone();
        async move { coordinator.select_dataset(third()).await }
    });
    wait_for_generation(&coordinator, 3).await;

    slow.release();
    assert!(older.await.unwrap().is_superseded());

    // the older result never touched the map, the first dataset is still shown
    coordinator
        .inspect(|scene| {
            assert_eq!(scene.active.as_ref().unwrap().dataset, first());
            assert_eq!(
                scene.map.max_bounds(),
                Some(sample_metadata().max_bounds)
            );
        })
        .await;

    slower.release();
    assert!(newer.await.unwrap().is_applied());
    let status = coordinator.status();
    assert_eq!(status.active, Some(third()));
    assert_eq!(status.phase, SyncPhase::Idle);
    assert_eq!(status.generation, 3);
}

// ============================================================================
// Mount and selection
// ============================================================================

#[tokio::test]
async fn test_mount_does_not_load() {
    let (coordinator, loader) = build(loader(), ui());

    assert_eq!(coordinator.mount().await, SyncOutcome::Skipped);
    assert_eq!(
        coordinator.select_dataset(first()).await,
        SyncOutcome::Skipped
    );
    assert_eq!(loader.request_count(), 0);
    assert_eq!(coordinator.generation(), 0);

    let outcome = coordinator.select_dataset(second()).await;
    assert!(outcome.is_applied());
    assert_eq!(
        loader.requests(),
        vec![
            endpoints().metadata_url(&second()),
            endpoints().vector_url(&second())
        ]
    );
}

#[tokio::test]
async fn test_first_selection_counts_as_mount() {
    let (coordinator, loader) = build(loader(), ui());

    assert_eq!(
        coordinator.select_dataset(second()).await,
        SyncOutcome::Skipped
    );
    assert_eq!(loader.request_count(), 0);
    assert_eq!(
        coordinator.select_dataset(second()).await,
        SyncOutcome::Skipped
    );
    assert!(coordinator.select_dataset(third()).await.is_applied());
}

#[tokio::test]
async fn test_mount_applies_particle_count() {
    let mut state = ui();
    state.num_particles = 10;
    let (coordinator, _) = build(loader(), state);
    coordinator.mount().await;

    let (count, requested) = coordinator
        .inspect(|scene| (scene.field.particle_count(), scene.ui.num_particles))
        .await;
    assert_eq!(count, 16);
    assert_eq!(requested, 16);

    let url = coordinator
        .share_url(&Url::parse("https://viewer.example/").unwrap())
        .await;
    assert!(url.query().unwrap().contains("numParticles=16"));
}

// ============================================================================
// Applying
// ============================================================================

#[tokio::test]
async fn test_apply_registers_sources_and_layers() {
    let (coordinator, _) = displayed(loader()).await;
    let metadata = sample_metadata();

    coordinator
        .inspect(|scene| {
            let map = &scene.map;
            assert_eq!(map.source_count(), 3);
            assert_eq!(map.max_bounds(), Some(metadata.max_bounds));
            assert_eq!(
                image_url(map, OVERLAY_SOURCE_ID),
                Some(endpoints().overlay_url(&first()))
            );
            match map.get_source(&SourceId::new(PARTICLE_SOURCE_ID)) {
                Some(LayerSource::Image { coordinates, .. }) => {
                    assert_eq!(coordinates, metadata.image_corners())
                }
                other => panic!("unexpected particle source {:?}", other),
            }
            match map.get_source(&SourceId::new(WAVE_BUOYS_SOURCE_ID)) {
                Some(LayerSource::GeoJson { data, cluster }) => {
                    assert_eq!(data, GeoJsonData::url(endpoints().buoys_url(&first())));
                    assert_eq!(cluster, Some(ClusterOptions::default()));
                }
                other => panic!("unexpected buoy source {:?}", other),
            }

            let order = LayerOrder::canonical();
            let managed: Vec<LayerId> = map
                .layer_ids()
                .into_iter()
                .filter(|id| order.contains(id))
                .collect();
            let expected: Vec<LayerId> = [
                OVERLAY_LAYER_ID,
                PARTICLE_LAYER_ID,
                WAVE_BUOYS_LAYER_ID,
                UNCLUSTERED_WAVE_BUOYS_LAYER_ID,
                WAVE_BUOYS_CLUSTER_LABEL_LAYER_ID,
            ]
            .into_iter()
            .map(LayerId::new)
            .collect();
            assert_eq!(managed, expected);

            // everything starts hidden
            assert_eq!(visibility(map, OVERLAY_LAYER_ID), Some(Visibility::None));
            assert_eq!(visibility(map, WAVE_BUOYS_LAYER_ID), Some(Visibility::None));
            assert_eq!(scene.field.state(), FieldState::Bound);
        })
        .await;
}

#[tokio::test]
async fn test_switch_updates_sources_in_place() {
    let (coordinator, _) = displayed(loader()).await;
    assert!(coordinator.select_dataset(second()).await.is_applied());

    coordinator
        .inspect(|scene| {
            let ops = scene.map.ops();
            assert_eq!(ops.sources_added, 3);
            assert_eq!(ops.layers_added, 5);
            assert_eq!(ops.images_updated, 2);
            // the OGC buoy collection does not depend on the date
            assert_eq!(ops.geojson_updated, 0);
            assert_eq!(
                scene.map.source_revision(&SourceId::new(OVERLAY_SOURCE_ID)),
                Some(1)
            );
            assert_eq!(
                scene.map.max_bounds(),
                Some(second_metadata().max_bounds)
            );
        })
        .await;
}

#[tokio::test]
async fn test_daily_buoy_locations_follow_switch() {
    let endpoints = EndpointConfig {
        buoys: BuoySource::DailyLocations,
        ..endpoints()
    };
    let loader = ScriptedLoader::new(endpoints.clone())
        .with_dataset(&first(), sample_metadata(), uniform_image(8, 4, 255, 128))
        .with_dataset(&second(), second_metadata(), uniform_image(8, 4, 0, 128));
    let (coordinator, _) = displayed(loader).await;
    assert!(coordinator.select_dataset(second()).await.is_applied());

    coordinator
        .inspect(|scene| {
            let ops = scene.map.ops();
            assert_eq!(ops.sources_added, 3);
            assert_eq!(ops.geojson_updated, 1);
            assert_eq!(
                geojson_data(&scene.map, WAVE_BUOYS_SOURCE_ID),
                Some(GeoJsonData::url(endpoints.buoys_url(&second())))
            );
        })
        .await;
}

#[tokio::test]
async fn test_failed_image_leaves_previous_dataset() {
    let loader = loader().with_image_error(
        &second(),
        SyncError::decode("https://data.example/ocean/25-03-02/vector.png", "truncated"),
    );
    let (coordinator, _) = displayed(loader).await;
    let before = coordinator.inspect(|scene| scene.map.clone()).await;

    let outcome = coordinator.select_dataset(second()).await;
    match &outcome {
        SyncOutcome::Unavailable { dataset, error } => {
            assert_eq!(dataset, &second());
            assert_eq!(error.kind(), "decode");
        }
        other => panic!("expected unavailable, got {:?}", other),
    }

    coordinator
        .inspect(|scene| {
            assert_eq!(scene.map.ops(), before.ops());
            assert_eq!(scene.map.max_bounds(), before.max_bounds());
            assert_eq!(
                image_url(&scene.map, PARTICLE_SOURCE_ID),
                Some(endpoints().vector_url(&first()))
            );
            assert_eq!(scene.active.as_ref().unwrap().dataset, first());
            assert_eq!(
                scene.field.binding().unwrap().bounds,
                sample_metadata().bounds
            );
        })
        .await;

    let status = coordinator.status();
    assert_eq!(status.unavailable, Some(second()));
    assert_eq!(status.active, Some(first()));
    assert_eq!(status.phase, SyncPhase::Idle);

    assert!(coordinator.select_dataset(third()).await.is_applied());
    assert_eq!(coordinator.status().unavailable, None);
}

#[tokio::test]
async fn test_missing_dataset_is_unavailable() {
    let (coordinator, _) = displayed(loader()).await;
    let outcome = coordinator.select_dataset(key("25-03-05")).await;
    match outcome {
        SyncOutcome::Unavailable { error, .. } => assert_eq!(error.kind(), "fetch"),
        other => panic!("expected unavailable, got {:?}", other),
    }
}

#[tokio::test]
async fn test_style_reload_restores_everything() {
    let (coordinator, _) = displayed(loader()).await;
    coordinator.set_overlay_visible(true).await.unwrap();

    coordinator.set_style(MapStyle::Satellite).await;
    coordinator
        .inspect(|scene| {
            assert_eq!(scene.map.source_count(), 0);
            assert_eq!(scene.map.style(), MapStyle::Satellite.source());
        })
        .await;

    assert!(coordinator.on_style_loaded().await.is_applied());
    coordinator
        .inspect(|scene| {
            assert_eq!(scene.map.source_count(), 3);
            assert_eq!(scene.map.ops().sources_added, 6);
            assert_eq!(
                visibility(&scene.map, OVERLAY_LAYER_ID),
                Some(Visibility::Visible)
            );
            assert_eq!(scene.ui.style, MapStyle::Satellite);
        })
        .await;
}

#[tokio::test]
async fn test_same_style_is_not_reloaded() {
    let (coordinator, _) = displayed(loader()).await;
    coordinator.set_style(MapStyle::Dark).await;
    let ops = coordinator.inspect(|scene| scene.map.ops()).await;
    assert_eq!(ops.style_changes, 0);
}

#[tokio::test]
async fn test_reapplying_same_dataset_is_unchanged() {
    let (coordinator, _) = displayed(loader()).await;
    assert!(coordinator.on_style_loaded().await.is_applied());

    let ops = coordinator.inspect(|scene| scene.map.ops()).await;
    assert_eq!(ops.sources_added, 3);
    assert_eq!(ops.images_updated, 0);
    assert_eq!(ops.geojson_updated, 0);
    assert_eq!(ops.layers_added, 5);
}

// ============================================================================
// Events
// ============================================================================

#[tokio::test]
async fn test_events_follow_cycle() {
    let (coordinator, _) = build(loader(), ui());
    let mut events = coordinator.subscribe();

    coordinator.mount().await;
    coordinator.on_style_loaded().await;
    coordinator.select_dataset(key("25-03-06")).await;

    assert_eq!(
        events.recv().await.unwrap(),
        SyncEvent::Started {
            dataset: first(),
            generation: 1
        }
    );
    assert_eq!(
        events.recv().await.unwrap(),
        SyncEvent::Applied {
            dataset: first(),
            generation: 1
        }
    );
    assert_eq!(events.recv().await.unwrap().generation(), 2);
    match events.recv().await.unwrap() {
        SyncEvent::Unavailable {
            dataset,
            generation,
            ..
        } => {
            assert_eq!(dataset, key("25-03-06"));
            assert_eq!(generation, 2);
        }
        other => panic!("unexpected event {:?}", other),
    }
}

#[tokio::test]
async fn test_status_watch_sees_apply() {
    let (coordinator, _) = build(loader(), ui());
    let mut status = coordinator.watch_status();
    coordinator.mount().await;
    coordinator.on_style_loaded().await;

    assert!(status.has_changed().unwrap());
    let current = status.borrow_and_update().clone();
    assert_eq!(current.active, Some(first()));
    assert_eq!(current.generation, 1);
}

// ============================================================================
// UI adapters
// ============================================================================

#[tokio::test]
async fn test_buoy_toggle_covers_all_buoy_layers() {
    let (coordinator, _) = displayed(loader()).await;
    coordinator.set_buoys_visible(true).await.unwrap();

    coordinator
        .inspect(|scene| {
            for id in [
                WAVE_BUOYS_LAYER_ID,
                UNCLUSTERED_WAVE_BUOYS_LAYER_ID,
                WAVE_BUOYS_CLUSTER_LABEL_LAYER_ID,
            ] {
                assert_eq!(visibility(&scene.map, id), Some(Visibility::Visible));
            }
            assert_eq!(visibility(&scene.map, OVERLAY_LAYER_ID), Some(Visibility::None));
            assert!(scene.ui.circle);
        })
        .await;
}

#[tokio::test]
async fn test_particles_follow_visibility_and_camera() {
    let (coordinator, _) = displayed(loader()).await;
    let state = || coordinator.inspect(|scene| scene.field.state());

    coordinator.set_particles_visible(true).await.unwrap();
    assert_eq!(state().await, FieldState::Animating);

    coordinator.on_move_start().await;
    assert_eq!(state().await, FieldState::Stopped);
    coordinator.on_move_end().await;
    assert_eq!(state().await, FieldState::Animating);

    coordinator.set_particles_visible(false).await.unwrap();
    assert_eq!(state().await, FieldState::Stopped);

    // hidden particles ignore camera gestures
    coordinator.on_move_end().await;
    assert_eq!(state().await, FieldState::Stopped);
}

#[tokio::test]
async fn test_particles_before_data_stay_idle() {
    let (coordinator, _) = build(loader(), ui());
    coordinator.mount().await;
    coordinator.set_particles_visible(true).await.unwrap();
    assert_eq!(
        coordinator.inspect(|scene| scene.field.state()).await,
        FieldState::Uninitialized
    );

    coordinator.on_style_loaded().await;
    assert_eq!(
        coordinator.inspect(|scene| scene.field.state()).await,
        FieldState::Animating
    );
}

#[tokio::test]
async fn test_particle_count_is_clamped() {
    let (coordinator, _) = displayed(loader()).await;
    assert_eq!(coordinator.set_particle_count(-5).await, 1);
    assert_eq!(coordinator.set_particle_count(10).await, 16);
    assert_eq!(
        coordinator.inspect(|scene| scene.ui.num_particles).await,
        16
    );
}

#[tokio::test]
async fn test_zoom_end_is_recorded() {
    let (coordinator, _) = build(loader(), ui());
    coordinator.on_zoom_end(5.678912).await;
    assert_eq!(coordinator.inspect(|scene| scene.ui.zoom).await, 5.6789);
}

#[tokio::test]
async fn test_shared_url_drives_initial_load() {
    let loader = loader().with_dataset(
        &key("25-03-04"),
        sample_metadata(),
        uniform_image(4, 4, 200, 200),
    );
    let (coordinator, loader) = build(loader, ui());
    let shared =
        Url::parse("https://viewer.example/?dataset=25-03-04&particles=true&lang=en").unwrap();

    let adopted = coordinator.adopt_shared_url(&shared).await;
    assert_eq!(adopted, vec!["dataset", "particles"]);

    coordinator.mount().await;
    assert!(coordinator.on_style_loaded().await.is_applied());
    assert_eq!(
        loader.requests()[0],
        endpoints().metadata_url(&key("25-03-04"))
    );
    assert_eq!(
        coordinator.inspect(|scene| scene.field.state()).await,
        FieldState::Animating
    );

    let base = Url::parse("https://viewer.example/?lang=en").unwrap();
    let url = coordinator.share_url(&base).await;
    let query = url.query().unwrap();
    assert!(query.contains("lang=en"));
    assert!(query.contains("dataset=25-03-04"));
    assert!(query.contains("particles=true"));
}

#[tokio::test]
async fn test_draw_frame_advances_animation() {
    let (coordinator, _) = displayed(loader()).await;
    coordinator.resize(vector_field::SurfaceSize::new(32, 16)).await;
    coordinator.set_particles_visible(true).await.unwrap();

    for _ in 0..3 {
        coordinator.draw_frame().await;
    }
    let snapshot = coordinator.inspect(|scene| scene.field.snapshot()).await;
    assert_eq!(snapshot.frames_drawn, 3);
    assert!(snapshot.lit_pixels > 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_selections_settle_on_last_selected() {
    let (coordinator, _) = displayed(loader()).await;
    let targets = [second(), third(), first()];

    for round in 0..200usize {
        let a = targets[round % 3].clone();
        let b = targets[(round + 1) % 3].clone();
        let (first_done, second_done) = tokio::join!(
            tokio::spawn({
                let coordinator = coordinator.clone();
                async move { coordinator.select_dataset(a).await }
            }),
            tokio::spawn({
                let coordinator = coordinator.clone();
                async move { coordinator.select_dataset(b).await }
            }),
        );
        first_done.unwrap();
        second_done.unwrap();

        let (selected, active) = coordinator
            .inspect(|scene| {
                (
                    scene.ui.dataset.clone(),
                    scene.active.as_ref().map(|a| a.dataset.clone()),
                )
            })
            .await;
        assert_eq!(active, Some(selected), "round {}", round);
    }
}

// ============================================================================
// Current at a point
// ============================================================================

#[tokio::test]
async fn test_current_at_clicked_point() {
    let (coordinator, _) = build(loader(), ui());
    assert!(coordinator.current_at(130.0, 0.0).await.is_none());

    coordinator.mount().await;
    assert!(coordinator.on_style_loaded().await.is_applied());

    // first dataset: r = 255, g = 128 over unit ranges
    let sample = coordinator.current_at(130.0, 0.0).await.unwrap();
    assert_approx_eq!(sample.u, 1.0, 1e-12);
    assert_approx_eq!(sample.v, -1.0 + 128.0 / 255.0 * 2.0, 1e-12);
    assert_approx_eq!(sample.speed, sample.u.hypot(sample.v), 1e-12);
    assert_eq!(sample.direction, "E");
    assert_eq!((sample.lon, sample.lat), (130.0, 0.0));
}

#[tokio::test]
async fn test_current_at_bounds_edges() {
    let (coordinator, _) = displayed(loader()).await;

    // sample metadata spans lon [100, 160], lat [-10, 10]
    assert!(coordinator.current_at(100.0, 10.0).await.is_some());
    assert!(coordinator.current_at(160.0, -10.0).await.is_some());
    assert!(coordinator.current_at(99.9, 0.0).await.is_none());
    assert!(coordinator.current_at(160.1, 0.0).await.is_none());
    assert!(coordinator.current_at(130.0, 10.1).await.is_none());
    assert!(coordinator.current_at(130.0, -10.1).await.is_none());
}

#[tokio::test]
async fn test_current_at_follows_switch() {
    let (coordinator, _) = displayed(loader()).await;
    assert!(coordinator.select_dataset(second()).await.is_applied());

    assert!(coordinator.current_at(130.0, 0.0).await.is_none());
    let sample = coordinator.current_at(25.0, -30.0).await.unwrap();
    assert_approx_eq!(sample.u, -1.0, 1e-12);
    assert_eq!(sample.direction, "W");
}

// ============================================================================
// Distance measurement
// ============================================================================

#[tokio::test]
async fn test_measuring_attaches_layers_on_top() {
    let (coordinator, _) = displayed(loader()).await;
    let measurement = coordinator.set_measuring(true).await.unwrap();
    assert!(measurement.points.is_empty());
    assert_eq!(measurement.length_km, None);

    coordinator
        .inspect(|scene| {
            let map = &scene.map;
            let expected: Vec<LayerId> = LayerOrder::canonical().iter().cloned().collect();
            assert_eq!(managed_layers(map), expected);
            assert_eq!(map.source_count(), 4);
            assert_eq!(
                visibility(map, MEASURE_POINTS_LAYER_ID),
                Some(Visibility::Visible)
            );
            assert_eq!(
                visibility(map, MEASURE_LINES_LAYER_ID),
                Some(Visibility::Visible)
            );
        })
        .await;
}

#[tokio::test]
async fn test_measurement_reports_path_length() {
    let (coordinator, _) = displayed(loader()).await;
    coordinator.set_measuring(true).await.unwrap();

    let single = coordinator.add_measure_point(150.0, -30.0).await.unwrap();
    assert_eq!(single.points.len(), 1);
    assert_eq!(single.length_km, None);

    coordinator.add_measure_point(151.0, -30.0).await.unwrap();
    let path = coordinator.add_measure_point(151.0, -31.0).await.unwrap();
    let expected =
        haversine_km(150.0, -30.0, 151.0, -30.0) + haversine_km(151.0, -30.0, 151.0, -31.0);
    assert_approx_eq!(path.length_km.unwrap(), expected, 1e-9);

    coordinator
        .inspect(|scene| {
            let ops = scene.map.ops();
            // created once, then rewritten in place per vertex
            assert_eq!(ops.sources_added, 4);
            assert_eq!(ops.geojson_updated, 3);
            let data = geojson_data(&scene.map, MEASURE_POINTS_SOURCE_ID).unwrap();
            assert_eq!(data.feature_count(), Some(4));
        })
        .await;

    // dropping the middle vertex reconnects the ends
    let shorter = coordinator
        .remove_measure_point(path.points[1].id)
        .await
        .unwrap();
    assert_eq!(shorter.points.len(), 2);
    assert_approx_eq!(
        shorter.length_km.unwrap(),
        haversine_km(150.0, -30.0, 151.0, -31.0),
        1e-9
    );
}

#[tokio::test]
async fn test_leaving_measurement_clears_path() {
    let (coordinator, _) = displayed(loader()).await;
    coordinator.set_measuring(true).await.unwrap();
    coordinator.add_measure_point(150.0, -30.0).await.unwrap();
    coordinator.add_measure_point(151.0, -30.0).await.unwrap();

    let cleared = coordinator.set_measuring(false).await.unwrap();
    assert!(cleared.points.is_empty());
    assert_eq!(cleared.length_km, None);

    coordinator
        .inspect(|scene| {
            let data = geojson_data(&scene.map, MEASURE_POINTS_SOURCE_ID).unwrap();
            assert_eq!(data.feature_count(), Some(0));
            assert_eq!(
                visibility(&scene.map, MEASURE_POINTS_LAYER_ID),
                Some(Visibility::None)
            );
            assert_eq!(
                visibility(&scene.map, MEASURE_LINES_LAYER_ID),
                Some(Visibility::None)
            );
        })
        .await;

    // clicks outside measurement mode are not recorded
    let ignored = coordinator.add_measure_point(152.0, -30.0).await.unwrap();
    assert!(ignored.points.is_empty());
}

#[tokio::test]
async fn test_clicks_before_measuring_touch_nothing() {
    let (coordinator, _) = displayed(loader()).await;
    let measurement = coordinator.add_measure_point(150.0, -30.0).await.unwrap();
    assert!(measurement.points.is_empty());
    coordinator
        .inspect(|scene| {
            assert!(scene
                .map
                .get_source(&SourceId::new(MEASURE_POINTS_SOURCE_ID))
                .is_none());
            assert!(!scene.map.has_layer(&LayerId::new(MEASURE_POINTS_LAYER_ID)));
        })
        .await;
}

#[tokio::test]
async fn test_style_reload_restores_measurement() {
    let (coordinator, _) = displayed(loader()).await;
    coordinator.set_measuring(true).await.unwrap();
    coordinator.add_measure_point(150.0, -30.0).await.unwrap();
    coordinator.add_measure_point(151.0, -30.0).await.unwrap();

    coordinator.set_style(MapStyle::Streets).await;
    assert!(coordinator.on_style_loaded().await.is_applied());

    coordinator
        .inspect(|scene| {
            let map = &scene.map;
            let expected: Vec<LayerId> = LayerOrder::canonical().iter().cloned().collect();
            assert_eq!(managed_layers(map), expected);
            let data = geojson_data(map, MEASURE_POINTS_SOURCE_ID).unwrap();
            assert_eq!(data.feature_count(), Some(3));
            assert_eq!(scene.measure.points().len(), 2);
        })
        .await;
}
