use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const ENV_FILE: &str = ".env";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatasetConfig {
    /// Remote CSV. Ignored when `path` is set.
    pub url: Option<String>,
    pub path: Option<PathBuf>,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,
}

fn default_request_timeout() -> u64 { 30_000 }

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            url: None,
            path: None,
            request_timeout_ms: default_request_timeout(),
        }
    }
}

/// Where the dataset should be read from, after env overrides.
#[derive(Debug, Clone, PartialEq)]
pub enum DatasetLocation {
    Url(String),
    Path(PathBuf),
}

impl DatasetConfig {
    /// `LISTINGS_PATH` beats `LISTINGS_URL`, which beats the config file.
    /// A local path always wins over a URL at the same level.
    pub fn location(&self) -> Result<DatasetLocation> {
        self.location_with(env_value)
    }

    fn location_with(&self, env: impl Fn(&str) -> Option<String>) -> Result<DatasetLocation> {
        if let Some(p) = env("LISTINGS_PATH") {
            return Ok(DatasetLocation::Path(PathBuf::from(p)));
        }
        if let Some(u) = env("LISTINGS_URL") {
            return Ok(DatasetLocation::Url(u));
        }
        match (&self.path, &self.url) {
            (Some(p), _) => Ok(DatasetLocation::Path(p.clone())),
            (None, Some(u)) if !u.trim().is_empty() => Ok(DatasetLocation::Url(u.trim().to_string())),
            _ => anyhow::bail!(
                "no dataset configured: set [dataset] url or path in the config, or LISTINGS_URL / LISTINGS_PATH"
            ),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Increment of the price slider, in the dataset's currency.
    #[serde(default = "default_price_step")]
    pub price_step: f64,
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
    #[serde(default)]
    pub default_country: Option<String>,
}

fn default_top_k() -> usize { 10 }
fn default_price_step() -> f64 { 500.0 }
fn default_tick_rate() -> u64 { 100 }

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            price_step: default_price_step(),
            tick_rate_ms: default_tick_rate(),
            default_country: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_file")]
    pub file: String,
    /// `EnvFilter` directive. `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_file() -> String { "listing-dash.log".to_string() }
fn default_log_filter() -> String { "listing_dash=info".to_string() }

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: default_log_file(),
            filter: default_log_filter(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .with_context(|| "Failed to parse config TOML")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !(self.dashboard.price_step.is_finite() && self.dashboard.price_step > 0.0) {
            anyhow::bail!("dashboard.price_step must be a positive number, got {}", self.dashboard.price_step);
        }
        if self.dashboard.tick_rate_ms == 0 {
            anyhow::bail!("dashboard.tick_rate_ms must be at least 1");
        }
        Ok(())
    }

    /// Load .env file into process environment. Real env vars take precedence.
    pub fn load_env_file() {
        let content = match std::fs::read_to_string(Path::new(ENV_FILE)) {
            Ok(c) => c,
            Err(_) => return,
        };
        for (key, value) in parse_env(&content) {
            if std::env::var(&key).is_err() {
                std::env::set_var(key, value);
            }
        }
    }
}

/// KEY=VALUE pairs from a dotenv file. Comments, blank lines and surrounding
/// quotes are dropped.
fn parse_env(content: &str) -> Vec<(String, String)> {
    // Strip BOM if present (common on Windows-created files)
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    content
        .lines()
        .map(|line| line.trim().trim_matches('\r'))
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            (key.trim().to_string(), value.to_string())
        })
        .collect()
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
