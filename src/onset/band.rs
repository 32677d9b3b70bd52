use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// Detection settings for one frequency band.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BandConfig {
    /// Slot index in every frame's `per_band`
    pub band: usize,
    /// First bin of the band (inclusive)
    pub start_bin: usize,
    /// Last bin of the band (inclusive)
    pub end_bin: usize,
    /// Frames in the centered threshold window, split evenly before and after
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    #[serde(default = "default_threshold_multiplier")]
    pub threshold_multiplier: f32,
    /// Frames to stay silent after a peak
    #[serde(default)]
    pub refractory_frames: usize,
}

fn default_window_size() -> usize { 20 }
fn default_threshold_multiplier() -> f32 { 1.5 }

impl BandConfig {
    pub fn new(band: usize, start_bin: usize, end_bin: usize) -> Self {
        Self {
            band,
            start_bin,
            end_bin,
            window_size: default_window_size(),
            threshold_multiplier: default_threshold_multiplier(),
            refractory_frames: 0,
        }
    }

    pub fn with_window(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    pub fn with_multiplier(mut self, threshold_multiplier: f32) -> Self {
        self.threshold_multiplier = threshold_multiplier;
        self
    }

    pub fn with_refractory(mut self, refractory_frames: usize) -> Self {
        self.refractory_frames = refractory_frames;
        self
    }

    /// Frames taken on each side of the current frame for the threshold.
    pub fn half_window(&self) -> usize {
        self.window_size / 2
    }

    fn check(&self, band_count: usize, num_bins: Option<usize>) -> Result<(), ConfigError> {
        if self.band >= band_count {
            return Err(ConfigError::BandId {
                band: self.band,
                band_count,
            });
        }
        if !(self.threshold_multiplier.is_finite() && self.threshold_multiplier > 0.0) {
            return Err(ConfigError::Multiplier {
                band: self.band,
                value: self.threshold_multiplier,
            });
        }
        if let Some(num_bins) = num_bins {
            if self.start_bin > self.end_bin || self.end_bin >= num_bins {
                return Err(ConfigError::BinRange {
                    band: self.band,
                    start_bin: self.start_bin,
                    end_bin: self.end_bin,
                    num_bins,
                });
            }
        }
        Ok(())
    }
}

/// Which neighbouring pruned flux a peak candidate has to beat.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum NeighborRule {
    /// Compare against the next frame's stored pruned flux. Within a single
    /// forward pass that slot has not been computed yet, so it still holds zero.
    #[default]
    Following,
    /// Compare against the previous frame's pruned flux.
    Preceding,
}

/// Check every band up front. `num_bins` is `None` for an empty spectrogram,
/// where there is no bin range to check against.
pub fn validate(bands: &[BandConfig], num_bins: Option<usize>) -> Result<(), ConfigError> {
    let mut seen = vec![false; bands.len()];
    for band in bands {
        band.check(bands.len(), num_bins)?;
        if std::mem::replace(&mut seen[band.band], true) {
            return Err(ConfigError::DuplicateBand { band: band.band });
        }
    }
    Ok(())
}
