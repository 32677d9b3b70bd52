use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::audio::spectrum::DEFAULT_SAMPLE_SIZE;
use crate::onset::{BandConfig, NeighborRule};

const CONFIG_NAME: &str = "pulsemap.toml";

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub spectrum: SpectrumConfig,
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub bands: Vec<BandConfig>,
}

#[derive(Debug, Deserialize)]
pub struct SpectrumConfig {
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,
}

#[derive(Debug, Default, Deserialize)]
pub struct DetectionConfig {
    #[serde(default)]
    pub neighbor: NeighborRule,
}

impl Default for SpectrumConfig {
    fn default() -> Self {
        Self {
            sample_size: default_sample_size(),
        }
    }
}

fn default_sample_size() -> usize { DEFAULT_SAMPLE_SIZE }

impl Config {
    /// Configured bands, or low/mid/high bands for a 1024-sample frame.
    pub fn bands_or_default(&self) -> Vec<BandConfig> {
        if self.bands.is_empty() {
            default_bands()
        } else {
            self.bands.clone()
        }
    }
}

pub fn default_bands() -> Vec<BandConfig> {
    vec![
        BandConfig::new(0, 0, 6).with_refractory(4),
        BandConfig::new(1, 7, 46).with_refractory(3),
        BandConfig::new(2, 47, 255).with_multiplier(1.3).with_refractory(2),
    ]
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Invalid config: {}", path.display()))
}

/// Explicit path first, then ./pulsemap.toml, then the user config dirs.
pub fn find_config(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let local = PathBuf::from(CONFIG_NAME);
    if local.exists() {
        return Some(local);
    }
    if let Some(home) = dirs::home_dir() {
        let xdg = home.join(".config").join("pulsemap").join("config.toml");
        if xdg.exists() {
            return Some(xdg);
        }
    }
    if let Some(config_dir) = dirs::config_dir() {
        let platform = config_dir.join("pulsemap").join("config.toml");
        if platform.exists() {
            return Some(platform);
        }
    }
    None
}
