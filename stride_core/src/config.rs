//! Configuration file support for Stride.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/stride/config.toml`.
//! The numeric gates here are the tunable part of the prescription rules;
//! defaults are chosen so the engine works with no config file at all.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub readiness: ReadinessConfig,

    #[serde(default)]
    pub prescription: PrescriptionConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Readiness gate configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReadinessConfig {
    /// Below this score, prescribed sprint volume is reduced
    #[serde(default = "default_reduced_volume_threshold")]
    pub reduced_volume_threshold: u8,

    /// Below this score, the day becomes a mandatory break day
    #[serde(default = "default_break_day_threshold")]
    pub break_day_threshold: u8,

    /// Reporting at least this many pain areas forces a break day
    #[serde(default = "default_pain_break_areas")]
    pub pain_break_areas: usize,
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            reduced_volume_threshold: default_reduced_volume_threshold(),
            break_day_threshold: default_break_day_threshold(),
            pain_break_areas: default_pain_break_areas(),
        }
    }
}

/// Sprint prescription progression configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PrescriptionConfig {
    /// Baseline repetitions at session index 0
    #[serde(default = "default_base_reps")]
    pub base_reps: u32,

    /// One rep is added every this many completed sessions
    #[serde(default = "default_sessions_per_increment")]
    pub sessions_per_increment: u32,

    /// Barefoot work is not offered before this session index
    #[serde(default = "default_barefoot_intro_session")]
    pub barefoot_intro_session: u32,

    /// Minimum readiness score for barefoot eligibility
    #[serde(default = "default_barefoot_min_readiness")]
    pub barefoot_min_readiness: u8,

    /// Barefoot work is limited to distances at or under this length
    #[serde(default = "default_barefoot_max_distance_m")]
    pub barefoot_max_distance_m: u32,
}

impl Default for PrescriptionConfig {
    fn default() -> Self {
        Self {
            base_reps: default_base_reps(),
            sessions_per_increment: default_sessions_per_increment(),
            barefoot_intro_session: default_barefoot_intro_session(),
            barefoot_min_readiness: default_barefoot_min_readiness(),
            barefoot_max_distance_m: default_barefoot_max_distance_m(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        let home = std::env::var("HOME")
            .expect("HOME environment variable not set");
        PathBuf::from(home).join(".local/share")
    });
    base.join("stride")
}

fn default_reduced_volume_threshold() -> u8 {
    60
}

fn default_break_day_threshold() -> u8 {
    40
}

fn default_pain_break_areas() -> usize {
    3
}

fn default_base_reps() -> u32 {
    2
}

fn default_sessions_per_increment() -> u32 {
    2
}

fn default_barefoot_intro_session() -> u32 {
    3
}

fn default_barefoot_min_readiness() -> u8 {
    70
}

fn default_barefoot_max_distance_m() -> u32 {
    40
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            let home = std::env::var("HOME")
                .expect("HOME environment variable not set");
            PathBuf::from(home).join(".config")
        });
        base.join("stride").join("config.toml")
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Check the gate values are internally consistent
    fn validate(&self) -> Result<()> {
        if self.readiness.break_day_threshold > self.readiness.reduced_volume_threshold {
            return Err(Error::Config(format!(
                "break_day_threshold ({}) must not exceed reduced_volume_threshold ({})",
                self.readiness.break_day_threshold, self.readiness.reduced_volume_threshold
            )));
        }
        if self.prescription.sessions_per_increment == 0 {
            return Err(Error::Config(
                "sessions_per_increment must be at least 1".into(),
            ));
        }
        if self.prescription.base_reps == 0 {
            return Err(Error::Config("base_reps must be at least 1".into()));
        }
        Ok(())
    }
}
