//! Final state report printed by the viewer.

use std::collections::BTreeMap;

use dataset_sync::{ActiveDataset, DatasetSyncCoordinator, MapStyle, SyncEvent, SyncStatus};
use map_sync::{InMemoryMap, MapOps, MapRenderer};
use ocean_common::{LayerSource, Visibility};
use serde::Serialize;
use vector_field::{ParticleSimulation, SimulationSnapshot};

pub type ViewerCoordinator = DatasetSyncCoordinator<InMemoryMap, ParticleSimulation>;

/// Counts of sync events seen during the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EventCounts {
    pub started: u64,
    pub applied: u64,
    pub discarded: u64,
    pub unavailable: u64,
}

impl EventCounts {
    pub fn record(&mut self, event: &SyncEvent) {
        match event {
            SyncEvent::Started { .. } => self.started += 1,
            SyncEvent::Applied { .. } => self.applied += 1,
            SyncEvent::Discarded { .. } => self.discarded += 1,
            SyncEvent::Unavailable { .. } => self.unavailable += 1,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LayerSummary {
    pub id: String,
    pub visibility: Visibility,
}

#[derive(Debug, Clone, Serialize)]
pub struct ViewerSummary {
    pub status: SyncStatus,
    pub style: MapStyle,
    pub active: Option<ActiveDataset>,
    pub sources: BTreeMap<String, LayerSource>,
    /// Managed layers, bottom to top.
    pub layers: Vec<LayerSummary>,
    pub map_ops: MapOps,
    pub simulation: SimulationSnapshot,
    pub events: EventCounts,
    pub share_url: Option<String>,
}

impl ViewerSummary {
    pub async fn capture(
        coordinator: &ViewerCoordinator,
        events: EventCounts,
        share_url: Option<String>,
    ) -> Self {
        let status = coordinator.status();
        coordinator
            .inspect(|scene| {
                let map = &scene.map;
                let sources = map
                    .source_ids()
                    .into_iter()
                    .filter_map(|id| map.get_source(&id).map(|s| (id.0, s)))
                    .collect();
                let layers = map
                    .layer_ids()
                    .into_iter()
                    .filter_map(|id| {
                        map.layer_visibility(&id).map(|visibility| LayerSummary {
                            id: id.0,
                            visibility,
                        })
                    })
                    .collect();

                ViewerSummary {
                    status,
                    style: scene.ui.style,
                    active: scene.active.clone(),
                    sources,
                    layers,
                    map_ops: map.ops(),
                    simulation: scene.field.snapshot(),
                    events,
                    share_url,
                }
            })
            .await
    }
}
