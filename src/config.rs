//! # Configuration Module
//!
//! Data directory layout and runtime settings for Colisten.
//!
//! ## Data Storage
//!
//! Everything lives in the platform-standard data directory:
//! - Linux: `~/.local/share/colisten/`
//! - macOS: `~/Library/Application Support/colisten/`
//! - Windows: `%APPDATA%\colisten\`
//!
//! The directory holds the interaction store (`colisten.db`), the default
//! catalog location (`dataset.csv`) and an optional `config.json` whose values
//! replace the built-in defaults. Command-line flags override both.
//!
//! Resolving paths never creates anything. The directory appears the first
//! time something is written into it (`seed`, `ingest`, `config init`).

use crate::catalog::DEFAULT_CATALOG_LIMIT;
use crate::ranker::RankingParams;
use crate::synthesis::SynthesisParams;
use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const APP_DIR: &str = "colisten";
const DB_FILE: &str = "colisten.db";
const CATALOG_FILE: &str = "dataset.csv";
const CONFIG_FILE: &str = "config.json";

/// Returns the platform-appropriate data directory for Colisten.
///
/// # Platform Behavior
///
/// - **Linux**: `~/.local/share/colisten`
/// - **macOS**: `~/Library/Application Support/colisten`
/// - **Windows**: `%APPDATA%\colisten`
///
/// The directory is only resolved, not created. Writers create it on demand
/// ([`RuntimeConfig::save_to`], `SqliteInteractionStore::open`).
///
/// # Errors
///
/// Fails if the system data directory cannot be determined.
pub fn get_data_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir().ok_or_else(|| {
        anyhow::anyhow!(
            "Could not determine system data directory. Please ensure your platform supports standard data directories."
        )
    })?;
    Ok(data_dir.join(APP_DIR))
}

/// Path of the interaction store database.
pub fn get_db_path() -> Result<PathBuf> {
    Ok(get_data_dir()?.join(DB_FILE))
}

/// Path of the optional configuration file.
pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_data_dir()?.join(CONFIG_FILE))
}

/// Synthesis settings as stored in the config file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub num_users: usize,
    pub songs_per_user: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let params = SynthesisParams::default();
        Self {
            num_users: params.num_users,
            songs_per_user: params.songs_per_user,
        }
    }
}

impl From<SimulationConfig> for SynthesisParams {
    fn from(config: SimulationConfig) -> Self {
        Self {
            num_users: config.num_users,
            songs_per_user: config.songs_per_user,
        }
    }
}

/// Configuration for runtime behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Path to the interaction store
    pub db_path: PathBuf,
    /// Path to the catalog CSV
    pub catalog_path: PathBuf,
    /// How many of the most popular catalog tracks synthesis draws from
    pub catalog_limit: usize,
    pub simulation: SimulationConfig,
    pub ranking: RankingParams,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        let dir = get_data_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::in_dir(&dir)
    }
}

impl RuntimeConfig {
    /// Defaults with every file placed inside `dir`
    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            db_path: dir.join(DB_FILE),
            catalog_path: dir.join(CATALOG_FILE),
            catalog_limit: DEFAULT_CATALOG_LIMIT,
            simulation: SimulationConfig::default(),
            ranking: RankingParams::default(),
        }
    }

    /// Load `config.json` from the data directory, or defaults if it is absent.
    pub fn load() -> Result<Self> {
        Self::load_from(&get_config_path()?)
    }

    /// Load configuration from `path`; a missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Write the configuration to `path` atomically, creating its directory.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}. Please check file permissions.", parent.display()))?;
        let temp_file = NamedTempFile::new_in(parent)
            .with_context(|| format!("Failed to create temporary file in {}", parent.display()))?;

        {
            let mut writer = BufWriter::new(&temp_file);
            serde_json::to_writer_pretty(&mut writer, self).context("Failed to serialize config")?;
            writer.flush().context("Failed to write config")?;
        }

        temp_file
            .persist(path)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        info!("Saved config to {}", path.display());
        Ok(())
    }
}
