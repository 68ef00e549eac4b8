//! Global configuration for voicetone
//!
//! Configuration is stored as YAML in the user config directory.
//! Default location: ~/.config/voicetone/config.yaml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::cluster::ClusterConfig;
use crate::pitch::PitchConfig;
use crate::plot::PlotConfig;
use crate::tone::RegisterConfig;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Pitch extraction settings (search range, framing, thresholds)
    pub pitch: PitchConfig,
    /// Speaker clustering settings (seed, solver limits)
    pub cluster: ClusterConfig,
    /// Register threshold settings
    pub register: RegisterConfig,
    /// Density plot settings
    pub plot: PlotConfig,
}

impl Config {
    /// Validate and clamp every section to usable ranges
    pub fn validate(&mut self) {
        self.pitch.validate();
        self.cluster.validate();
        self.register.validate();
        self.plot.validate();
    }
}

/// Get the default config file path
///
/// Returns: ~/.config/voicetone/config.yaml (platform equivalent)
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("voicetone")
        .join("config.yaml")
}

/// Load configuration from a YAML file
///
/// If the file doesn't exist, returns default config.
/// If the file exists but is invalid, logs a warning and returns default config.
pub fn load_config(path: &Path) -> Config {
    if !path.exists() {
        log::info!("load_config: {:?} doesn't exist, using defaults", path);
        return Config::default();
    }

    match std::fs::read_to_string(path) {
        Ok(contents) => match serde_yaml::from_str::<Config>(&contents) {
            Ok(mut config) => {
                config.validate();
                log::info!(
                    "load_config: loaded {:?} (pitch range {:.0}-{:.0}Hz, seed {})",
                    path,
                    config.pitch.fmin_hz,
                    config.pitch.fmax_hz,
                    config.cluster.seed
                );
                config
            }
            Err(e) => {
                log::warn!("load_config: failed to parse config: {}, using defaults", e);
                Config::default()
            }
        },
        Err(e) => {
            log::warn!(
                "load_config: failed to read config file: {}, using defaults",
                e
            );
            Config::default()
        }
    }
}

/// Save configuration to a YAML file
///
/// Creates parent directories if they don't exist.
pub fn save_config(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
    }

    let yaml = serde_yaml::to_string(config).context("Failed to serialize config to YAML")?;

    std::fs::write(path, yaml).with_context(|| format!("Failed to write config file: {:?}", path))?;

    log::info!("save_config: wrote {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.cluster.seed, 42);
        assert_eq!(config.register.male_bass_max_hz, 110.0);
        assert_eq!(config.register.female_mezzo_max_hz, 260.0);
        assert!((config.pitch.fmin_hz - 65.41).abs() < 1e-9);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = load_config(Path::new("/nonexistent/voicetone.yaml"));
        assert_eq!(config.cluster.seed, 42);
    }

    #[test]
    fn test_invalid_yaml_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "pitch: [not, a, mapping]").unwrap();

        let config = load_config(&path);
        assert_eq!(config.cluster.seed, 42);
    }

    #[test]
    fn test_yaml_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        let mut config = Config::default();
        config.cluster.seed = 7;
        config.pitch.fmax_hz = 1000.0;
        save_config(&config, &path).unwrap();

        let loaded = load_config(&path);
        assert_eq!(loaded.cluster.seed, 7);
        assert_eq!(loaded.pitch.fmax_hz, 1000.0);
    }

    #[test]
    fn test_partial_yaml_uses_section_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "cluster:\n  seed: 9\n").unwrap();

        let config = load_config(&path);
        assert_eq!(config.cluster.seed, 9);
        assert_eq!(config.plot.grid_points, 200);
    }

    #[test]
    fn test_load_clamps_out_of_range_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "pitch:\n  fmin_hz: -10.0\n  fmax_hz: 5.0\n").unwrap();

        let config = load_config(&path);
        assert!(config.pitch.fmin_hz >= 20.0);
        assert!(config.pitch.fmax_hz > config.pitch.fmin_hz);
    }
}
