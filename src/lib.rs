pub mod aggregator;
pub mod coverage;
pub mod db;
pub mod domain_rules;
pub mod errors;
pub mod hierarchy;
pub mod models;
pub mod overview;
pub mod refresher;
pub mod service;
pub mod store;

pub use crate::aggregator::{build_snapshot, build_snapshot_with, CollectionBag, HealthThresholds};
pub use crate::coverage::compute_coverage;
pub use crate::errors::{AppError, AppResult, SourceError};
pub use crate::hierarchy::validate_hierarchy;
pub use crate::models::{DashboardSettings, DashboardSnapshot, Domain, SnapshotSource};
pub use crate::refresher::SnapshotRefresher;
pub use crate::service::DashboardService;

use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_appender::non_blocking::WorkerGuard;

static LOG_GUARD: std::sync::OnceLock<WorkerGuard> = std::sync::OnceLock::new();

const DATA_DIR_ENV: &str = "PROGRAM_DASHBOARD_HOME";

/// `PROGRAM_DASHBOARD_HOME` when set, otherwise the platform data directory.
pub fn resolve_data_dir() -> AppResult<PathBuf> {
    if let Some(home) = std::env::var_os(DATA_DIR_ENV).filter(|value| !value.is_empty()) {
        return Ok(PathBuf::from(home));
    }
    dirs::data_dir()
        .map(|dir| dir.join("program-dashboard"))
        .ok_or_else(|| AppError::Io(format!("no platform data directory; set {DATA_DIR_ENV}")))
}

pub fn init_tracing(app_data_dir: &Path) -> Result<(), String> {
    let log_dir = app_data_dir.join("logs");
    std::fs::create_dir_all(&log_dir).map_err(|error| error.to_string())?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "dashboard.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = LOG_GUARD.set(guard);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .json()
        .with_writer(non_blocking)
        .try_init()
        .map_err(|error| error.to_string())
}

/// Opens the store, refreshes snapshots on the configured interval and runs
/// until interrupted.
pub async fn run() -> anyhow::Result<()> {
    let app_data_dir = resolve_data_dir()?;
    std::fs::create_dir_all(&app_data_dir)?;
    init_tracing(&app_data_dir).map_err(anyhow::Error::msg)?;

    let service = DashboardService::new(&app_data_dir)?;
    let settings = service.get_settings()?;
    let period = Duration::from_secs(settings.refresh_interval_seconds.max(1));
    tracing::info!(
        data_dir = %app_data_dir.display(),
        source = ?settings.snapshot_source,
        refresh_interval_seconds = period.as_secs(),
        "dashboard engine started"
    );

    let refresher = SnapshotRefresher::new(service);
    let handle = refresher.spawn_interval(period);

    tokio::signal::ctrl_c().await?;
    handle.abort();
    tracing::info!("dashboard engine stopped");
    Ok(())
}
