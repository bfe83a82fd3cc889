use anyhow::{Context, Result};
use clap::Parser;
use hunt_core::config::{validate_config, Config, ConfigError, ConfigLoader, LoggingConfig};
use hunt_core::engage::{
    dry_run_collaborators, load_profiles_json, EngagementController, EngagementHandle,
    WalkingOwnership,
};
use hunt_core::game::GameStateSnapshot;
use hunt_core::process::{AttachOptions, ProcessAttacher};
use hunt_core::Address;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Engage targets in a running game client using its memory
#[derive(Parser, Debug)]
#[command(name = "hunt", version, about)]
struct Cli {
    /// Path to the TOML configuration
    #[arg(short, long, env = "HUNT_CONFIG", default_value = "hunt.toml")]
    config: PathBuf,

    /// Process id of the game client; overrides `process.pid`
    #[arg(short, long)]
    pid: Option<u32>,

    /// Log level; overrides `logging.level`
    #[arg(long)]
    log_level: Option<String>,
}

fn load(cli: &Cli) -> Result<Config> {
    let mut config = match ConfigLoader::new(&cli.config).load() {
        Ok(config) => config,
        Err(ConfigError::FileNotFound(_)) => Config::default(),
        Err(e) => return Err(e).context("loading configuration"),
    };

    if let Some(pid) = cli.pid {
        config.process.pid = Some(pid);
    }
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }

    validate_config(&config)?;
    Ok(config)
}

fn init_logging(logging: &LoggingConfig) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let file_layer = if logging.file.is_empty() {
        None
    } else {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&logging.file)
            .with_context(|| format!("opening log file {}", logging.file))?;
        Some(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(file_layer)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = load(&cli)?;
    init_logging(&config.logging)?;

    info!("Starting hunt v{}", env!("CARGO_PKG_VERSION"));

    if let Some(path) = config.targeting.profiles_file.clone() {
        let imported = load_profiles_json(&path)
            .with_context(|| format!("loading profiles from {}", path.display()))?;
        info!(count = imported.len(), path = %path.display(), "imported target profiles");
        config.targeting.profiles.extend(imported);
    }
    if config.targeting.profiles.is_empty() {
        warn!("no target profiles configured, every target will be skipped");
    }

    let pid = config
        .process
        .pid
        .context("no process id: pass --pid or set process.pid")?;

    let attacher = ProcessAttacher::with_options(AttachOptions {
        enable_debug_privilege: config.process.enable_debug_privilege,
        architecture: config.process.architecture,
        base_override: config.process.base_override.map(Address::from),
    });
    let attached = attacher.attach(pid)?;

    let snapshot = GameStateSnapshot::new(attached.address_space(), config.addresses.clone());
    let ownership = Arc::new(WalkingOwnership::new());
    let controller =
        EngagementController::new(snapshot, dry_run_collaborators(), ownership, &config);
    let handle = EngagementHandle::spawn(controller)?;

    info!("Engagement running. Press Ctrl+C to stop.");

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut watchdog = tokio::time::interval(Duration::from_millis(250));
    loop {
        tokio::select! {
            result = &mut ctrl_c => {
                result?;
                info!("Shutting down");
                break;
            }
            _ = watchdog.tick() => {
                if handle.is_finished() {
                    warn!("engagement loop exited");
                    break;
                }
            }
        }
    }

    tokio::task::spawn_blocking(move || handle.stop()).await?;
    Ok(())
}
