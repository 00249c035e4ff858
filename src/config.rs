//! Engine tuning knobs.
//!
//! Defaults reproduce the reference behaviour. A JSON file can override any
//! subset of fields; its path is read from `IDLE_GOLD_CONFIG`.

use std::{
    env, fs, io,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;

use crate::progression::OFFLINE_CAP_HOURS;

pub const CONFIG_PATH_ENV: &str = "IDLE_GOLD_CONFIG";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct IdleConfig {
    /// Game seconds credited per periodic tick.
    pub tick_seconds: f64,
    /// Upper bound for offline income.
    pub offline_cap_hours: f64,
    /// Ticks between autosaves; 0 disables autosave.
    pub autosave_interval_ticks: u32,
    /// Largest frame gap fed to the tick accumulator.
    pub max_frame_gap_ms: f64,
    /// Snapshot file used by native hosts.
    pub save_path: PathBuf,
    /// localStorage key used in the browser.
    pub storage_key: String,
}

impl Default for IdleConfig {
    fn default() -> Self {
        Self {
            tick_seconds: 1.0,
            offline_cap_hours: OFFLINE_CAP_HOURS,
            autosave_interval_ticks: 30,
            max_frame_gap_ms: 5_000.0,
            save_path: PathBuf::from("idle_save.json"),
            storage_key: "idle_gold_save".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read config from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl IdleConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Load from the file named by `IDLE_GOLD_CONFIG`, falling back to defaults.
    pub fn load_from_env() -> Self {
        let Some(path) = env::var_os(CONFIG_PATH_ENV).map(PathBuf::from) else {
            return Self::default();
        };
        match Self::from_file(&path) {
            Ok(config) => {
                tracing::info!(
                    target: "idle_gold::config",
                    path = %path.display(),
                    "config.loaded=file"
                );
                config
            }
            Err(err) => {
                tracing::warn!(
                    target: "idle_gold::config",
                    path = %path.display(),
                    error = %err,
                    "config.load_failed"
                );
                Self::default()
            }
        }
    }

    /// Milliseconds of real time per periodic tick.
    pub fn ms_per_tick(&self) -> f64 {
        self.tick_seconds * 1000.0
    }
}
