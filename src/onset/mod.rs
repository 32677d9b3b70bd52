//! Per-band onset detection over a precomputed spectrogram.
//!
//! Each band runs two forward passes over the shared frame sequence: spectral
//! flux first, then thresholding and peak picking. Bands run one after another
//! in the order given, so a frame's `peak_bands` lists bands in that order.

pub mod band;
pub mod error;
pub mod flux;
pub mod frame;
pub mod peak;

pub use band::{BandConfig, NeighborRule};
pub use error::ConfigError;
pub use frame::{BandSlot, FrameRecord};

/// Annotate `frames` for every band using the default neighbor rule.
pub fn analyze(
    frames: Vec<FrameRecord>,
    bands: &[BandConfig],
) -> Result<Vec<FrameRecord>, ConfigError> {
    analyze_with(frames, bands, NeighborRule::default())
}

/// Validate everything, then run flux and peak passes band by band.
/// On error no frame has been touched.
pub fn analyze_with(
    mut frames: Vec<FrameRecord>,
    bands: &[BandConfig],
    neighbor: NeighborRule,
) -> Result<Vec<FrameRecord>, ConfigError> {
    let num_bins = frames.first().map(FrameRecord::num_bins);
    if let Some(expected) = num_bins {
        if let Some((frame, f)) = frames
            .iter()
            .enumerate()
            .find(|(_, f)| f.num_bins() != expected)
        {
            return Err(ConfigError::RaggedSpectrum {
                frame,
                expected,
                found: f.num_bins(),
            });
        }
    }
    band::validate(bands, num_bins)?;

    if frames.is_empty() || bands.is_empty() {
        log::debug!("Nothing to analyze ({} frames, {} bands)", frames.len(), bands.len());
        return Ok(frames);
    }

    for frame in frames.iter_mut() {
        frame.reset(bands.len());
    }

    for config in bands {
        flux::run(&mut frames, config);
        peak::run(&mut frames, config, neighbor);

        let peaks = frames.iter().filter(|f| f.slot(config.band).is_peak).count();
        log::debug!(
            "Band {} (bins {}-{}): {} peaks",
            config.band, config.start_bin, config.end_bin, peaks
        );
    }

    Ok(frames)
}
