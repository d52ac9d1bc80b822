//! UI-driven map state and the dataset selection.

use chrono::NaiveDate;
use ocean_common::{recent_datasets, DatasetKey};
use reqwest::Url;
use serde::{Deserialize, Serialize};

/// Base map style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MapStyle {
    #[default]
    Dark,
    Streets,
    Satellite,
    Terrain,
}

impl MapStyle {
    pub const ALL: [MapStyle; 4] = [
        MapStyle::Dark,
        MapStyle::Streets,
        MapStyle::Satellite,
        MapStyle::Terrain,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            MapStyle::Dark => "Dark",
            MapStyle::Streets => "Streets",
            MapStyle::Satellite => "Satellite",
            MapStyle::Terrain => "Terrain",
        }
    }

    /// Style document handed to the renderer.
    pub fn source(&self) -> &'static str {
        match self {
            MapStyle::Dark => "mapbox://styles/mapbox/dark-v11",
            MapStyle::Streets => "mapbox://styles/mapbox/streets-v12",
            MapStyle::Satellite => "mapbox://styles/mapbox/satellite-v9",
            MapStyle::Terrain => "terrain",
        }
    }

    pub fn from_title(title: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.title() == title)
    }
}

/// Map state set by the UI and mirrored into shareable URLs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapUiState {
    pub style: MapStyle,
    /// Sea-level overlay visible.
    pub overlay: bool,
    /// Wave buoys visible.
    pub circle: bool,
    pub particles: bool,
    pub num_particles: u32,
    pub dataset: DatasetKey,
    /// Selectable datasets, oldest first.
    pub datasets: Vec<DatasetKey>,
    pub zoom: f64,
    /// Distance measurement mode. Not part of shared URLs.
    #[serde(default)]
    pub measuring: bool,
}

impl MapUiState {
    pub const INITIAL_ZOOM: f64 = 3.0;

    /// Initial state for `today`: the oldest selectable dataset, all layers hidden.
    pub fn for_date(today: NaiveDate) -> Self {
        let datasets = recent_datasets(today);
        let dataset = datasets
            .first()
            .cloned()
            .unwrap_or_else(|| DatasetKey::from_date(today));
        Self {
            style: MapStyle::default(),
            overlay: false,
            circle: false,
            particles: false,
            num_particles: 10_000,
            dataset,
            datasets,
            zoom: Self::INITIAL_ZOOM,
            measuring: false,
        }
    }

    pub fn is_selectable(&self, key: &DatasetKey) -> bool {
        self.datasets.contains(key)
    }

    /// Record the zoom reported at the end of a zoom gesture.
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = (zoom * 1e4).round() / 1e4;
    }

    fn query_pairs(&self) -> [(&'static str, String); 6] {
        [
            ("style", self.style.title().to_string()),
            ("overlay", self.overlay.to_string()),
            ("circle", self.circle.to_string()),
            ("particles", self.particles.to_string()),
            ("numParticles", self.num_particles.to_string()),
            ("dataset", self.dataset.to_string()),
        ]
    }

    /// Write the state into `url`'s query, keeping unrelated parameters.
    pub fn write_to_url(&self, url: &mut Url) {
        let pairs = self.query_pairs();
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(k, _)| !pairs.iter().any(|(name, _)| name == k))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        url.query_pairs_mut()
            .clear()
            .extend_pairs(kept)
            .extend_pairs(pairs);
    }

    /// Adopt the recognised parameters of a shared URL.
    ///
    /// Values that do not parse are ignored, and a dataset is adopted only
    /// when it is currently selectable. Returns the names of adopted
    /// parameters.
    pub fn read_from_url(&mut self, url: &Url) -> Vec<&'static str> {
        let mut adopted = Vec::new();
        for (name, value) in url.query_pairs() {
            let applied = match name.as_ref() {
                "style" => MapStyle::from_title(&value)
                    .map(|s| self.style = s)
                    .map(|_| "style"),
                "overlay" => value.parse().ok().map(|v| self.overlay = v).map(|_| "overlay"),
                "circle" => value.parse().ok().map(|v| self.circle = v).map(|_| "circle"),
                "particles" => value
                    .parse()
                    .ok()
                    .map(|v| self.particles = v)
                    .map(|_| "particles"),
                "numParticles" => value
                    .parse()
                    .ok()
                    .map(|v| self.num_particles = v)
                    .map(|_| "numParticles"),
                "dataset" => DatasetKey::parse(&value)
                    .ok()
                    .filter(|key| self.is_selectable(key))
                    .map(|key| self.dataset = key)
                    .map(|_| "dataset"),
                _ => None,
            };
            adopted.extend(applied);
        }
        adopted
    }
}

/// How a selection update relates to the previous one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionChange {
    /// First value after mount. Never starts a sync cycle.
    Mounted,
    Unchanged,
    Changed { previous: DatasetKey },
}

/// Tracks the selected dataset so only real changes after mount trigger a sync.
#[derive(Debug, Clone, Default)]
pub struct SelectionTracker {
    current: Option<DatasetKey>,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&DatasetKey> {
        self.current.as_ref()
    }

    pub fn observe(&mut self, key: DatasetKey) -> SelectionChange {
        match self.current.replace(key.clone()) {
            None => SelectionChange::Mounted,
            Some(previous) if previous == key => SelectionChange::Unchanged,
            Some(previous) => SelectionChange::Changed { previous },
        }
    }
}
