//! Application configuration for probcat.
//!
//! User config lives at `~/.probcat/probcat.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ProbcatError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "probcat.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".probcat";

// ---------------------------------------------------------------------------
// Config structs (matching probcat.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// The upstream listing to crawl.
    #[serde(default)]
    pub listing: ListingConfig,

    /// Sweep scheduling and fetch behavior.
    #[serde(default)]
    pub sweep: SweepConfig,

    /// Catalog database location.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// `[listing]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingConfig {
    /// Base origin; relative links from rows are joined against this.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path (plus query) of the first listing page.
    #[serde(default = "default_start_path")]
    pub start_path: String,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            start_path: default_start_path(),
        }
    }
}

fn default_base_url() -> String {
    "https://codeforces.com".into()
}
fn default_start_path() -> String {
    "/problemset?order=BY_SOLVED_DESC".into()
}

/// `[sweep]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Idle time between scheduled sweeps, in seconds.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Per-request timeout for page fetches, in seconds.
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
        }
    }
}

fn default_interval_secs() -> u64 {
    3600
}
fn default_fetch_timeout_secs() -> u64 {
    30
}

/// `[storage]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path to the libSQL database file. `~` expands to the home directory.
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

fn default_db_path() -> String {
    "~/.probcat/catalog.db".into()
}

impl StorageConfig {
    /// Resolve the configured db path, expanding a leading `~`.
    pub fn resolved_db_path(&self) -> Result<PathBuf> {
        if let Some(rest) = self.db_path.strip_prefix("~/") {
            let home = dirs::home_dir()
                .ok_or_else(|| ProbcatError::config("could not determine home directory"))?;
            Ok(home.join(rest))
        } else {
            Ok(PathBuf::from(&self.db_path))
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.probcat/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| ProbcatError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.probcat/probcat.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| ProbcatError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| ProbcatError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| ProbcatError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| ProbcatError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| ProbcatError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
