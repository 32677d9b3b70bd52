use serde::Serialize;

/// Per-band detection values for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct BandSlot {
    /// Rectified spectral flux against the previous frame
    pub flux: f32,
    /// Adaptive threshold from the surrounding flux window
    pub threshold: f32,
    /// Flux above threshold, floored at zero
    pub pruned_flux: f32,
    pub is_peak: bool,
}

/// One spectrogram frame plus everything the band passes write into it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameRecord {
    /// Magnitude per frequency bin
    pub magnitudes: Vec<f32>,
    /// Indexed by band id
    pub per_band: Vec<BandSlot>,
    pub has_any_peak: bool,
    /// Band ids that peaked here, in processing order
    pub peak_bands: Vec<usize>,
}

impl FrameRecord {
    pub fn new(magnitudes: Vec<f32>) -> Self {
        Self {
            magnitudes,
            ..Self::default()
        }
    }

    pub fn num_bins(&self) -> usize {
        self.magnitudes.len()
    }

    /// Results for `band`, or `None` before analysis or for an unknown id.
    pub fn band(&self, band: usize) -> Option<&BandSlot> {
        self.per_band.get(band)
    }

    pub(crate) fn slot(&self, band: usize) -> &BandSlot {
        &self.per_band[band]
    }

    pub(crate) fn band_mut(&mut self, band: usize) -> &mut BandSlot {
        &mut self.per_band[band]
    }

    /// Record a detection for `band` on this frame.
    pub(crate) fn mark_peak(&mut self, band: usize) {
        self.per_band[band].is_peak = true;
        self.has_any_peak = true;
        self.peak_bands.push(band);
    }

    /// Drop the results of any previous analysis and size the slot map.
    pub(crate) fn reset(&mut self, band_count: usize) {
        self.per_band.clear();
        self.per_band.resize(band_count, BandSlot::default());
        self.has_any_peak = false;
        self.peak_bands.clear();
    }
}
