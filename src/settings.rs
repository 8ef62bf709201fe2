//! Simulation settings
//!
//! Read from the path given on the command line, else from
//! `~/.config/elementum/settings.toml`, else built-in defaults.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use elementum_combat::CombatConfig;
use elementum_core::TimeConfig;

use crate::scenario::Scenario;

/// All simulation settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimSettings {
    pub run: RunSettings,
    pub time: TimeConfig,
    pub combat: CombatConfig,
    pub scenario: Scenario,
}

impl SimSettings {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("elementum"))
    }

    /// Get the default settings file path
    fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.toml"))
    }

    /// Load settings. An explicit path must exist and parse; the default
    /// location falls back to built-in settings on any problem.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        if let Some(path) = path {
            let settings = Self::read(path)?;
            info!("Loaded settings from {:?}", path);
            return Ok(settings);
        }

        let Some(path) = Self::settings_path() else {
            warn!("Could not determine config directory");
            return Ok(Self::default());
        };

        if !path.exists() {
            info!("No settings file found, using defaults");
            return Ok(Self::default());
        }

        match Self::read(&path) {
            Ok(settings) => {
                info!("Loaded settings from {:?}", path);
                Ok(settings)
            }
            Err(e) => {
                warn!("{:#}, using defaults", e);
                Ok(Self::default())
            }
        }
    }

    fn read(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {:?}", path))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse settings file {:?}", path))
    }

    /// Save settings to the default location
    pub fn save(&self) -> anyhow::Result<PathBuf> {
        let Some(dir) = Self::config_dir() else {
            anyhow::bail!("Could not determine config directory");
        };

        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }

        let path = dir.join("settings.toml");
        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        info!("Saved settings to {:?}", path);
        Ok(path)
    }
}

/// How the binary drives the simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    /// Real seconds per frame fed to the clock
    pub frame_delta: f32,
    /// Simulated seconds before the run is cut off
    pub max_duration: f32,
    /// Print the text stats report to the log as well as JSON to stdout
    pub log_report: bool,
}

impl RunSettings {
    /// Reject settings under which simulated time would never advance
    pub fn validate(&self, time: &TimeConfig) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.frame_delta > 0.0,
            "frame_delta must be positive, got {}",
            self.frame_delta
        );
        anyhow::ensure!(
            time.time_scale > 0.0,
            "time_scale must be positive for a headless run, got {}",
            time.time_scale
        );
        Ok(())
    }
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            frame_delta: 1.0 / 30.0,
            max_duration: 120.0,
            log_report: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_settings_fill_defaults() {
        let toml = r#"
            [run]
            max_duration = 30.0

            [combat]
            seed = 42

            [combat.pool]
            initial_size = 4
            max_size = 16
        "#;
        let settings: SimSettings = toml::from_str(toml).unwrap();
        assert_eq!(settings.run.max_duration, 30.0);
        assert_eq!(settings.run.frame_delta, 1.0 / 30.0);
        assert_eq!(settings.combat.seed, Some(42));
        assert_eq!(settings.combat.pool.max_size, 16);
        assert_eq!(settings.combat.projectiles.len(), 6);
        assert!(!settings.scenario.turrets.is_empty());
    }

    #[test]
    fn test_default_settings_survive_toml() {
        let defaults = SimSettings::default();
        let text = toml::to_string_pretty(&defaults).unwrap();
        let back: SimSettings = toml::from_str(&text).unwrap();

        assert_eq!(back.combat, defaults.combat);
        assert_eq!(back.scenario, defaults.scenario);
        assert_eq!(back.time.fixed_timestep, defaults.time.fixed_timestep);
        assert_eq!(back.time.time_scale, defaults.time.time_scale);
        assert_eq!(back.run.max_duration, defaults.run.max_duration);
        assert_eq!(back.run.log_report, defaults.run.log_report);
    }

    #[test]
    fn test_stalled_clock_rejected() {
        let settings = SimSettings::default();
        assert!(settings.run.validate(&settings.time).is_ok());

        let stalled = TimeConfig {
            time_scale: 0.0,
            ..Default::default()
        };
        assert!(settings.run.validate(&stalled).is_err());
    }

    #[test]
    fn test_missing_explicit_path_is_an_error() {
        let result = SimSettings::load(Some(Path::new("/nonexistent/elementum.toml")));
        assert!(result.is_err());
    }
}
