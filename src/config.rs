//! Configuration types and loading

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::cli::Cli;
use crate::source::DEFAULT_DELAY;

const APP_DIR: &str = "hacker-stories";

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Story source and fetch behaviour
    pub fetch: FetchConfig,

    /// Where the search term is remembered
    pub storage: StorageConfig,

    /// Terminal UI settings
    pub ui: UiConfig,

    /// Log file settings
    pub log: LogConfig,
}

impl Config {
    /// Load configuration with fallback chain
    ///
    /// An explicit path must load; the implicit locations are tried in order
    /// (`./.hacker-stories.yml`, then the user config dir) and skipped when
    /// unreadable.  Skipped files are returned as warnings, because no logger
    /// is installed yet when this runs.
    pub fn load(config_path: Option<&PathBuf>) -> Result<(Self, Vec<String>)> {
        if let Some(path) = config_path {
            let config = Self::load_from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?;
            return Ok((config, Vec::new()));
        }

        Ok(Self::load_first(&implicit_locations()))
    }

    /// Use the first candidate that exists and parses.
    fn load_first(candidates: &[PathBuf]) -> (Self, Vec<String>) {
        let mut warnings = Vec::new();
        for path in candidates.iter().filter(|path| path.exists()) {
            match Self::load_from_file(path) {
                Ok(config) => return (config, warnings),
                Err(e) => warnings.push(format!(
                    "Failed to load config from {}: {:#}",
                    path.display(),
                    e
                )),
            }
        }
        (Self::default(), warnings)
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        Self::from_yaml(&content)
    }

    fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content).context("Failed to parse config file")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would only fail later, deep inside the UI.
    pub fn validate(&self) -> Result<()> {
        self.log.level()?;
        if self.ui.tick_ms == 0 {
            anyhow::bail!("ui.tick-ms must be greater than zero");
        }
        if self.storage.search_key.is_empty() {
            anyhow::bail!("storage.search-key must not be empty");
        }
        Ok(())
    }

    /// Command-line flags take precedence over the file.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(path) = &cli.stories {
            self.fetch.stories_file = Some(path.clone());
        }
        if let Some(ms) = cli.delay_ms {
            self.fetch.delay_ms = ms;
        }
        if let Some(ms) = cli.timeout_ms {
            self.fetch.timeout_ms = Some(ms);
        }
        if cli.fail {
            self.fetch.simulate_failure = true;
        }
        if let Some(path) = &cli.state {
            self.storage.path = Some(path.clone());
        }
        if cli.no_persist {
            self.storage.persist = false;
        }
        if cli.verbose {
            self.log.level = "debug".to_string();
        }
    }

    pub fn state_path(&self) -> PathBuf {
        self.storage
            .path
            .clone()
            .unwrap_or_else(|| data_dir().join("state.json"))
    }

    pub fn log_path(&self) -> PathBuf {
        self.log
            .file
            .clone()
            .unwrap_or_else(|| data_dir().join("hacker-stories.log"))
    }
}

fn implicit_locations() -> Vec<PathBuf> {
    let mut locations = vec![PathBuf::from(".hacker-stories.yml")];
    if let Some(config_dir) = dirs::config_dir() {
        locations.push(config_dir.join(APP_DIR).join("hacker-stories.yml"));
    }
    locations
}

fn data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Story source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FetchConfig {
    /// Simulated latency of the stub source in milliseconds
    pub delay_ms: u64,

    /// Give up on a fetch after this many milliseconds
    pub timeout_ms: Option<u64>,

    /// JSON file with seed stories; the built-in samples are used when unset
    pub stories_file: Option<PathBuf>,

    /// Make every fetch fail (to see the error state)
    pub simulate_failure: bool,
}

impl FetchConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            delay_ms: DEFAULT_DELAY.as_millis() as u64,
            timeout_ms: None,
            stories_file: None,
            simulate_failure: false,
        }
    }
}

/// Persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct StorageConfig {
    /// State file path; defaults to the user data dir
    pub path: Option<PathBuf>,

    /// Key the search term is stored under
    pub search_key: String,

    /// Set to false to keep the search term in memory only
    pub persist: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: None,
            search_key: "search".to_string(),
            persist: true,
        }
    }
}

/// Terminal UI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct UiConfig {
    /// Redraw interval in milliseconds when nothing else happens
    pub tick_ms: u64,
}

impl UiConfig {
    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self { tick_ms: 250 }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log file path; defaults to the user data dir
    pub file: Option<PathBuf>,

    /// One of off, error, warn, info, debug, trace
    pub level: String,
}

impl LogConfig {
    pub fn level(&self) -> Result<LevelFilter> {
        self.level
            .parse()
            .map_err(|_| anyhow::anyhow!("Unknown log level '{}'", self.level))
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file: None,
            level: "info".to_string(),
        }
    }
}
