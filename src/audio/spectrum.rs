use anyhow::Result;
use indicatif::ProgressBar;
use rayon::prelude::*;
use rustfft::{num_complex::Complex, FftPlanner};

use crate::onset::FrameRecord;

pub const DEFAULT_SAMPLE_SIZE: usize = 1024;

/// Magnitude frames cut from a mono signal, one per `sample_size` samples.
pub struct Spectrogram {
    pub frames: Vec<FrameRecord>,
    pub sample_rate: u32,
    pub sample_size: usize,
}

impl Spectrogram {
    pub fn num_bins(&self) -> usize {
        self.sample_size / 2
    }

    /// Seconds covered by one frame.
    pub fn frame_duration(&self) -> f32 {
        frame_duration(self.sample_size, self.sample_rate)
    }
}

pub fn frame_duration(sample_size: usize, sample_rate: u32) -> f32 {
    if sample_rate == 0 {
        return 0.0;
    }
    sample_size as f32 / sample_rate as f32
}

/// Hann-windowed FFT over consecutive, non-overlapping frames. A short tail
/// is zero-padded into one last frame.
pub fn compute(
    samples: &[f32],
    sample_rate: u32,
    sample_size: usize,
    progress: &ProgressBar,
) -> Result<Spectrogram> {
    if sample_size < 2 || sample_size % 2 != 0 {
        anyhow::bail!("Sample size must be an even number of at least 2, got {}", sample_size);
    }

    let num_frames = samples.len().div_ceil(sample_size);
    let half = sample_size / 2;
    let hann = hann_window(sample_size);
    let fft = FftPlanner::<f32>::new().plan_fft_forward(sample_size);

    progress.set_length(num_frames as u64);
    let frames: Vec<FrameRecord> = (0..num_frames)
        .into_par_iter()
        .map(|frame_idx| {
            let start = frame_idx * sample_size;
            let chunk = &samples[start..(start + sample_size).min(samples.len())];

            let mut buffer = vec![Complex::new(0.0f32, 0.0); sample_size];
            for (i, &s) in chunk.iter().enumerate() {
                buffer[i] = Complex::new(s * hann[i], 0.0);
            }
            fft.process(&mut buffer);

            progress.inc(1);
            FrameRecord::new(buffer[..half].iter().map(|c| c.norm()).collect())
        })
        .collect();

    log::info!(
        "Spectrum: {} frames x {} bins, {:.1}ms per frame",
        frames.len(),
        half,
        frame_duration(sample_size, sample_rate) * 1000.0
    );

    Ok(Spectrogram {
        frames,
        sample_rate,
        sample_size,
    })
}

fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / (size - 1) as f32).cos())
        })
        .collect()
}
