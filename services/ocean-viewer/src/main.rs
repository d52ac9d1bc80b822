//! Headless ocean-current viewer.
//!
//! Drives the dataset synchronization pipeline against live endpoints:
//! - Mounts with the oldest selectable dataset (or the one in a shared URL)
//! - Displays it once the map style has loaded
//! - Switches through the requested dates, optionally all at once
//! - Draws particle frames and prints the final map and simulation state

mod config;
mod summary;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, Utc};
use clap::Parser;
use dataset_loader::HttpDatasetClient;
use dataset_sync::{DatasetSyncCoordinator, Loaders, MapUiState, Scene};
use map_sync::InMemoryMap;
use ocean_common::DatasetKey;
use reqwest::Url;
use tokio::sync::{broadcast, mpsc};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;
use vector_field::{ParticleSimulation, SurfaceSize};

use config::ViewerConfig;
use summary::{EventCounts, ViewerSummary};

#[derive(Parser, Debug)]
#[command(name = "ocean-viewer")]
#[command(about = "Headless ocean-current viewer with race-free dataset switching")]
struct Args {
    /// Dataset to switch to after the initial one (yy-mm-dd), repeatable
    #[arg(short, long = "date")]
    dates: Vec<String>,

    /// Issue all switches at once instead of one after another
    #[arg(long)]
    overlap: bool,

    /// YAML configuration file (endpoints, field, sync sections)
    #[arg(long, env = "OCEAN_VIEWER_CONFIG")]
    config: Option<PathBuf>,

    /// Dataset bucket base URL, overrides the config
    #[arg(long)]
    base_url: Option<String>,

    /// Shared viewer URL whose query seeds the initial state
    #[arg(long)]
    share_url: Option<String>,

    /// Reference date for the selectable window (default: today, UTC)
    #[arg(long)]
    today: Option<NaiveDate>,

    /// Show the sea-level overlay
    #[arg(long)]
    overlay: bool,

    /// Show wave buoys
    #[arg(long)]
    buoys: bool,

    /// Show and animate particles
    #[arg(long)]
    particles: bool,

    /// Frames to draw after the last switch
    #[arg(long, default_value = "60")]
    frames: u32,

    /// Surface width in pixels
    #[arg(long, default_value = "800")]
    width: u32,

    /// Surface height in pixels
    #[arg(long, default_value = "600")]
    height: u32,

    /// Log level
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // stdout carries the summary
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);
    if args.json_logs {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }

    info!("Starting ocean viewer");

    let mut config = match &args.config {
        Some(path) => ViewerConfig::load(path)?,
        None => ViewerConfig::from_env(),
    };
    if let Some(base_url) = &args.base_url {
        config.endpoints.base_url = base_url.clone();
    }
    config.validate()?;

    let today = args.today.unwrap_or_else(|| Utc::now().date_naive());
    let mut ui = MapUiState::for_date(today);
    ui.overlay = args.overlay;
    ui.circle = args.buoys;
    ui.particles = args.particles;
    ui.num_particles = config.field.particle_count;

    let targets = args
        .dates
        .iter()
        .map(|d| DatasetKey::parse(d).with_context(|| format!("Invalid dataset date: {}", d)))
        .collect::<Result<Vec<_>>>()?;

    let client = Arc::new(HttpDatasetClient::new(&config.endpoints)?);
    let simulation = ParticleSimulation::new(config.field.clone())?;
    let map = InMemoryMap::new(ui.style.source());
    let coordinator = Arc::new(DatasetSyncCoordinator::new(
        Scene::new(map, simulation, ui),
        Loaders::shared(client),
        config.endpoints.clone(),
        config.sync.clone(),
    ));

    // Shutdown signal
    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    let mut events = coordinator.subscribe();
    let mut shutdown = shutdown_tx.subscribe();
    let event_task = tokio::spawn(async move {
        let mut counts = EventCounts::default();
        loop {
            tokio::select! {
                // drain pending events before honouring shutdown
                biased;
                event = events.recv() => match event {
                    Ok(event) => counts.record(&event),
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        warn!(missed, "Sync event subscriber lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
                _ = shutdown.recv() => break,
            }
        }
        counts
    });

    let (resize_tx, resize_rx) = mpsc::channel(8);
    let resize_task = tokio::spawn({
        let coordinator = coordinator.clone();
        async move { coordinator.run_resize_loop(resize_rx).await }
    });
    resize_tx
        .send(SurfaceSize::new(args.width, args.height))
        .await
        .context("Resize loop stopped")?;
    drop(resize_tx);
    resize_task.await?;

    if let Some(shared) = &args.share_url {
        let url = Url::parse(shared).with_context(|| format!("Invalid share URL: {}", shared))?;
        let adopted = coordinator.adopt_shared_url(&url).await;
        info!(?adopted, "Adopted shared viewer state");
    }

    coordinator.mount().await;
    let initial = coordinator.on_style_loaded().await;
    info!(outcome = ?initial, "Initial dataset");

    for key in &targets {
        let selectable = coordinator.inspect(|scene| scene.ui.is_selectable(key)).await;
        if !selectable {
            warn!(dataset = %key, "Dataset is outside the selectable window");
        }
    }

    if args.overlap {
        let switches = targets.iter().map(|key| coordinator.select_dataset(key.clone()));
        for outcome in futures::future::join_all(switches).await {
            info!(outcome = ?outcome, "Dataset switch finished");
        }
    } else {
        for key in &targets {
            let outcome = coordinator.select_dataset(key.clone()).await;
            info!(outcome = ?outcome, "Dataset switch finished");
        }
    }

    for _ in 0..args.frames {
        coordinator.draw_frame().await;
    }

    shutdown_tx.send(()).ok();
    let counts = event_task.await?;

    let share_url = match &args.share_url {
        Some(shared) => {
            let base = Url::parse(shared)?;
            Some(coordinator.share_url(&base).await.to_string())
        }
        None => None,
    };

    let status = coordinator.status();
    let summary = ViewerSummary::capture(&coordinator, counts, share_url).await;
    println!("{}", serde_json::to_string_pretty(&summary)?);

    if status.active.is_none() {
        bail!("No dataset could be displayed");
    }

    info!(
        active = ?status.active,
        generation = status.generation,
        discarded = counts.discarded,
        "Viewer session complete"
    );

    Ok(())
}
