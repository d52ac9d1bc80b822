//! Sync cycle outcomes, events and status.

use ocean_common::{DatasetKey, SyncError};
use serde::Serialize;

/// Phase of the coordinator's state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPhase {
    #[default]
    Idle,
    Loading,
    Applying,
}

/// Result of one selection update or sync cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// No cycle ran: the first value after mount, an unchanged selection, or
    /// nothing selected yet.
    Skipped,

    Applied { dataset: DatasetKey, generation: u64 },

    /// A newer request started before this one finished; its result was dropped.
    Superseded { generation: u64, current: u64 },

    /// The dataset could not be loaded or applied. The previous dataset stays
    /// on screen.
    Unavailable { dataset: DatasetKey, error: SyncError },
}

impl SyncOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, SyncOutcome::Applied { .. })
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, SyncOutcome::Superseded { .. })
    }
}

/// Published to subscribers as cycles progress.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    Started {
        dataset: DatasetKey,
        generation: u64,
    },
    Applied {
        dataset: DatasetKey,
        generation: u64,
    },
    Discarded {
        dataset: DatasetKey,
        generation: u64,
        current: u64,
    },
    /// Shown to the user as "dataset unavailable".
    Unavailable {
        dataset: DatasetKey,
        generation: u64,
        error: SyncError,
    },
}

impl SyncEvent {
    pub fn generation(&self) -> u64 {
        match self {
            SyncEvent::Started { generation, .. }
            | SyncEvent::Applied { generation, .. }
            | SyncEvent::Discarded { generation, .. }
            | SyncEvent::Unavailable { generation, .. } => *generation,
        }
    }
}

/// Snapshot of the coordinator.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SyncStatus {
    pub phase: SyncPhase,
    /// Latest issued generation.
    pub generation: u64,
    /// Dataset currently on screen.
    pub active: Option<DatasetKey>,
    /// Set when the latest completed cycle failed; cleared by the next apply.
    pub unavailable: Option<DatasetKey>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_phase_in_snake_case() {
        let status = SyncStatus {
            phase: SyncPhase::Applying,
            generation: 4,
            active: Some(DatasetKey::parse("25-01-01").unwrap()),
            unavailable: None,
        };
        let value = serde_json::to_value(&status).unwrap();
        assert_eq!(value["phase"], "applying");
        assert_eq!(value["generation"], 4);
        assert_eq!(value["active"], "25-01-01");
        assert!(value["unavailable"].is_null());
    }

    #[test]
    fn test_event_generation() {
        let event = SyncEvent::Discarded {
            dataset: DatasetKey::parse("25-01-02").unwrap(),
            generation: 2,
            current: 5,
        };
        assert_eq!(event.generation(), 2);
    }
}
