use anyhow::{Context, Result};
use listing_dash::config::{Config, DatasetLocation};
use listing_dash::snapshot::build_snapshot;
use listing_dash::source::{load_table, FileSource, HttpSource, ListingSource};
use listing_dash::tui::{self, state::AppState};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = "config.toml";

/// `--config <path>`, falling back to ./config.toml, or built-in defaults when
/// neither is given nor present.
fn load_config(args: &[String]) -> Result<Config> {
    let explicit = args
        .iter()
        .position(|a| a == "--config")
        .map(|i| {
            args.get(i + 1)
                .map(PathBuf::from)
                .context("--config needs a path")
        })
        .transpose()?;

    match explicit {
        Some(path) => Config::load(&path),
        None if Path::new(DEFAULT_CONFIG).exists() => Config::load(Path::new(DEFAULT_CONFIG)),
        None => Ok(Config::default()),
    }
}

fn init_logging(config: &Config) -> Result<()> {
    let log_file = std::fs::File::create(&config.logging.file)
        .with_context(|| format!("Failed to create log file: {}", config.logging.file))?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(log_file)
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let snapshot_mode = args.iter().any(|arg| arg == "--snapshot");

    // Load saved settings from .env (real env vars take precedence)
    Config::load_env_file();
    let config = load_config(&args)?;
    init_logging(&config)?;

    let source: Box<dyn ListingSource> = match config.dataset.location()? {
        DatasetLocation::Path(p) => Box::new(FileSource::new(p)),
        DatasetLocation::Url(u) => Box::new(HttpSource::new(&u, config.dataset.request_timeout_ms)?),
    };
    let label = source.describe();

    if !snapshot_mode {
        println!();
        println!("  Listing dashboard v{}", env!("CARGO_PKG_VERSION"));
        println!("  Loading {} ...", label);
    }

    let report = load_table(source.as_ref()).await?;

    if snapshot_mode {
        let snapshot = build_snapshot(&report.table, &config.dashboard, &label)?;
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    let mut state = AppState::new(&report.table, &config.dashboard, &label);
    state.push_log(
        "INFO",
        format!("loaded {} of {} rows from {}", report.table.len(), report.rows_read, label),
    );
    if !report.row_errors.is_empty() {
        state.push_log(
            "WARN",
            format!("{} rows rejected, see {}", report.row_errors.len(), config.logging.file),
        );
    }

    let tick = Duration::from_millis(config.dashboard.tick_rate_ms);
    let table = report.table;
    tokio::task::spawn_blocking(move || tui::run_tui(&table, &mut state, tick))
        .await
        .context("dashboard thread panicked")??;

    tracing::debug!("shutting down");
    Ok(())
}
