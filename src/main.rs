//! WormDriller - Directional drilling trajectory service
//!
//! Serves the trajectory engine and project data over HTTP, and offers
//! offline subcommands for survey files and project backups.
//!
//! # Usage
//!
//! ```bash
//! # Run the API server (default 0.0.0.0:8000)
//! cargo run --release
//!
//! # Calculate a wellpath from a survey CSV
//! ./wormdriller wellpath --csv survey.csv --method minimum_curvature --out wellpath.csv
//!
//! # Back up and restore a project
//! ./wormdriller backup --project <id> --dir ./backups
//! ./wormdriller restore --archive ./backups/<file>.zip
//! ```
//!
//! # Environment Variables
//!
//! - `WORMDRILLER_CONFIG`: Path to the service TOML (default: ./wormdriller.toml)
//! - `WORMDRILLER_ADDR`: Override the server bind address
//! - `WORMDRILLER_API_KEY`: Add an API key and require it on /api/v1
//! - `RUST_LOG`: Logging level (default: info)
//! - `RESET_DB`: Set to "true" to wipe all persistent data when the server starts (for testing)

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use wormdriller::api::{create_app, AppState};
use wormdriller::config::{self, LogFormat, ServiceConfig, StorageBackend};
use wormdriller::interchange;
use wormdriller::storage::{self, ProcessLock};
use wormdriller::trajectory::TrajectoryEngine;
use wormdriller::types::{CalculationMethod, UnitSystem};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "wormdriller")]
#[command(about = "WormDriller Directional Drilling Trajectory Service")]
#[command(version)]
struct CliArgs {
    /// Override the server address (default: "0.0.0.0:8000")
    #[arg(short, long)]
    addr: Option<String>,

    /// Path to the service configuration TOML
    #[arg(short, long, env = "WORMDRILLER_CONFIG")]
    config: Option<PathBuf>,

    /// Reset all persistent data (projects, wells, surveys) when the server
    /// starts. Ignored by the offline subcommands.
    /// WARNING: This is destructive and cannot be undone!
    /// Can also be set via RESET_DB=true environment variable.
    #[arg(long)]
    reset_db: bool,

    #[command(subcommand)]
    command: Option<SubCommand>,
}

#[derive(clap::Subcommand, Debug)]
enum SubCommand {
    /// Run the HTTP API server (default)
    Serve,

    /// Calculate a wellpath from a survey CSV (md, inc, azi columns)
    Wellpath {
        /// Survey CSV file
        #[arg(long)]
        csv: PathBuf,
        /// Calculation method (default from config)
        #[arg(long)]
        method: Option<CalculationMethod>,
        /// Unit system (default from config)
        #[arg(long)]
        units: Option<UnitSystem>,
        /// Vertical section reference azimuth in degrees
        #[arg(long, default_value = "0")]
        reference_azimuth: f64,
        /// Output CSV file (default: stdout)
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Write a project and all its well data to a zip archive
    Backup {
        /// Project identifier
        #[arg(long)]
        project: String,
        /// Directory for the archive
        #[arg(long, default_value = "./backups")]
        dir: PathBuf,
    },

    /// Restore a project from a backup archive, replacing any existing copy
    Restore {
        /// Archive written by `backup`
        #[arg(long)]
        archive: PathBuf,
    },
}

// ============================================================================
// Configuration & Logging
// ============================================================================

fn load_config(path: Option<&Path>) -> Result<ServiceConfig> {
    match path {
        Some(p) => {
            let mut cfg = ServiceConfig::load_from_file(p)
                .with_context(|| format!("Failed to load config from {}", p.display()))?;
            cfg.apply_overrides(|key| std::env::var(key).ok());
            Ok(cfg)
        }
        None => Ok(ServiceConfig::load()),
    }
}

fn init_tracing(cfg: &ServiceConfig) {
    let default_level = if cfg.service.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    match cfg.service.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(false)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init(),
    }
}

// ============================================================================
// Database Reset
// ============================================================================

/// Check if database reset is requested via CLI flag or environment variable.
fn should_reset_db(cli_flag: bool) -> bool {
    if cli_flag {
        return true;
    }
    if let Ok(val) = std::env::var("RESET_DB") {
        let val_lower = val.to_lowercase();
        return val_lower == "true" || val_lower == "1" || val_lower == "yes";
    }
    false
}

/// Only the server wipes storage; offline commands read the data a reset
/// would destroy.
fn command_allows_reset(command: &SubCommand) -> bool {
    matches!(command, SubCommand::Serve)
}

/// Remove everything in the data directory except the held lock file.
fn reset_data_directory(data_path: &Path, lock: Option<&ProcessLock>) -> Result<()> {
    if !data_path.exists() {
        info!("Data directory does not exist, nothing to reset");
        return Ok(());
    }

    warn!("RESET_DB detected, wiping all persistent data");
    warn!("  Removing contents of: {}", data_path.display());

    let keep = lock.map(ProcessLock::path);
    let entries = std::fs::read_dir(data_path).context("Failed to read data directory")?;
    for entry in entries {
        let path = entry.context("Failed to read data directory entry")?.path();
        if Some(path.as_path()) == keep {
            continue;
        }
        if path.is_dir() {
            warn!("    DIR  {}", path.display());
            std::fs::remove_dir_all(&path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
        } else {
            warn!("    FILE {}", path.display());
            std::fs::remove_file(&path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
        }
    }

    warn!("  Data directory cleared, a fresh database will be created");
    Ok(())
}

/// Take the process lock when the backend keeps data on disk.
fn lock_storage(cfg: &ServiceConfig) -> Result<Option<ProcessLock>> {
    match cfg.storage.backend {
        StorageBackend::Sled => Ok(Some(ProcessLock::acquire(&cfg.storage.data_dir)?)),
        StorageBackend::Memory => Ok(None),
    }
}

// ============================================================================
// Task Names for Supervisor Logging
// ============================================================================

#[derive(Debug, Clone, Copy)]
enum TaskName {
    HttpServer,
}

impl std::fmt::Display for TaskName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskName::HttpServer => write!(f, "HttpServer"),
        }
    }
}

// ============================================================================
// Server
// ============================================================================

/// Spawn the HTTP server task into the JoinSet.
fn spawn_http_server(
    task_set: &mut JoinSet<Result<TaskName>>,
    listener: tokio::net::TcpListener,
    app: axum::Router,
    cancel_token: CancellationToken,
) {
    task_set.spawn(async move {
        info!("[HttpServer] Task starting");

        let result = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                cancel_token.cancelled().await;
                info!("[HttpServer] Received shutdown signal");
            })
            .await;

        match result {
            Ok(()) => {
                info!("[HttpServer] Graceful shutdown complete");
                Ok(TaskName::HttpServer)
            }
            Err(e) => {
                error!("[HttpServer] Server error: {}", e);
                Err(anyhow::anyhow!("HTTP server error: {}", e))
            }
        }
    });
}

/// Monitor tasks until shutdown, cancelling everything on the first failure.
async fn run_supervisor(
    task_set: &mut JoinSet<Result<TaskName>>,
    cancel_token: CancellationToken,
) -> Result<()> {
    loop {
        tokio::select! {
            _ = cancel_token.cancelled() => {
                info!("Supervisor: Shutdown signal received");
                break;
            }
            result = task_set.join_next() => {
                match result {
                    Some(Ok(Ok(task_name))) => {
                        info!("Supervisor: Task {} completed normally", task_name);
                    }
                    Some(Ok(Err(e))) => {
                        error!("Supervisor: Task failed with error: {}", e);
                        cancel_token.cancel();
                        return Err(e);
                    }
                    Some(Err(e)) => {
                        error!("Supervisor: Task panicked: {}", e);
                        cancel_token.cancel();
                        return Err(anyhow::anyhow!("Task panicked: {}", e));
                    }
                    None => break,
                }
            }
        }
    }

    // Let the server drain in-flight requests
    while let Some(result) = task_set.join_next().await {
        if let Ok(Err(e)) = result {
            error!("Supervisor: Task failed during shutdown: {}", e);
        }
    }
    Ok(())
}

async fn run_server(cfg: ServiceConfig, reset_db: bool, cancel_token: CancellationToken) -> Result<()> {
    let process_lock = lock_storage(&cfg)?;
    // Only the lock holder may wipe the data directory
    if reset_db {
        reset_data_directory(&cfg.storage.data_dir, process_lock.as_ref())?;
    }
    let repo = storage::open_repository(&cfg.storage).context("Failed to open storage")?;

    info!(
        backend = repo.backend_name(),
        data_dir = %cfg.storage.data_dir.display(),
        auth = cfg.auth.require_api_key,
        "Storage ready"
    );

    let addr = cfg.server.addr.clone();
    let state = AppState::new(repo, cfg);
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Listening on http://{}", addr);

    let mut task_set: JoinSet<Result<TaskName>> = JoinSet::new();
    spawn_http_server(&mut task_set, listener, app, cancel_token.clone());
    run_supervisor(&mut task_set, cancel_token).await
}

// ============================================================================
// Offline Commands
// ============================================================================

fn run_wellpath(
    cfg: &ServiceConfig,
    csv: &Path,
    method: Option<CalculationMethod>,
    units: Option<UnitSystem>,
    reference_azimuth: f64,
    out: Option<&Path>,
) -> Result<()> {
    let engine = TrajectoryEngine::from_config(&cfg.engine);
    let units = units.unwrap_or(engine.default_unit_system);

    let file = std::fs::File::open(csv).with_context(|| format!("Failed to open {}", csv.display()))?;
    let stations = interchange::read_stations(file)?;
    let result = engine.calculate_wellpath(&stations, method, units, reference_azimuth)?;

    info!(
        stations = stations.len(),
        method = %result.method,
        total_md = result.total_md,
        total_tvd = result.total_tvd,
        max_dls = result.max_dls,
        "Wellpath calculated"
    );

    match out {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            interchange::export_survey_csv(&result.wellpath, file)?;
            info!("Wellpath written to {}", path.display());
        }
        None => interchange::export_survey_csv(&result.wellpath, std::io::stdout().lock())?,
    }
    Ok(())
}

fn run_backup(cfg: &ServiceConfig, project_id: &str, dir: &Path) -> Result<()> {
    let _process_lock = lock_storage(cfg)?;
    let repo = storage::open_repository(&cfg.storage)?;
    let path = storage::backup_project(repo.as_ref(), project_id, dir)?;
    info!("Backup written to {}", path.display());
    Ok(())
}

fn run_restore(cfg: &ServiceConfig, archive: &Path) -> Result<()> {
    let _process_lock = lock_storage(cfg)?;
    let repo = storage::open_repository(&cfg.storage)?;
    let project = storage::restore_project(repo.as_ref(), archive)?;
    info!(
        project_id = %project.project_id,
        wells = project.well_ids.len(),
        "Project '{}' restored",
        project.name
    );
    Ok(())
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();

    let mut cfg = load_config(args.config.as_deref())?;
    if let Some(addr) = args.addr {
        cfg.server.addr = addr;
    }
    cfg.validate()?;
    init_tracing(&cfg);
    config::init(cfg);
    let cfg = config::get();

    let command = args.command.unwrap_or(SubCommand::Serve);
    let reset_db = should_reset_db(args.reset_db);
    if reset_db && !command_allows_reset(&command) {
        warn!("RESET_DB ignored: only the server resets storage");
    }

    match command {
        SubCommand::Serve => {}
        SubCommand::Wellpath {
            csv,
            method,
            units,
            reference_azimuth,
            out,
        } => return run_wellpath(cfg, &csv, method, units, reference_azimuth, out.as_deref()),
        SubCommand::Backup { project, dir } => return run_backup(cfg, &project, &dir),
        SubCommand::Restore { archive } => return run_restore(cfg, &archive),
    }

    info!("WormDriller - Directional Drilling Trajectory Service");
    info!(
        "Service: {} v{} ({})",
        cfg.service.name,
        config::defaults::VERSION,
        cfg.service.environment
    );

    // Graceful shutdown via Ctrl+C
    let cancel_token = CancellationToken::new();
    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received Ctrl+C, initiating shutdown...");
        shutdown_token.cancel();
    });

    run_server(cfg.clone(), reset_db, cancel_token).await?;

    info!("WormDriller shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_keeps_held_lock() {
        let dir = tempfile::tempdir().unwrap();
        let lock = ProcessLock::acquire(dir.path()).unwrap();
        std::fs::create_dir_all(dir.path().join("projects.db")).unwrap();
        std::fs::write(dir.path().join("projects.db").join("conf"), "x").unwrap();
        std::fs::write(dir.path().join("stray.tmp"), "x").unwrap();

        reset_data_directory(dir.path(), Some(&lock)).unwrap();

        let remaining: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().path())
            .collect();
        assert_eq!(remaining, vec![lock.path().to_path_buf()]);
    }

    #[test]
    fn test_only_serve_resets_storage() {
        let args = CliArgs::parse_from(["wormdriller", "--reset-db", "backup", "--project", "p-1"]);
        assert!(args.reset_db);
        let command = args.command.unwrap();
        assert!(!command_allows_reset(&command));
        assert!(!command_allows_reset(&SubCommand::Restore {
            archive: PathBuf::from("a.zip"),
        }));
        assert!(command_allows_reset(&SubCommand::Serve));
    }
}
