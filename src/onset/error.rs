use thiserror::Error;

/// Rejected band setups. Raised before any frame is written.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("band {band}: bin range {start_bin}..={end_bin} outside spectrum of {num_bins} bins")]
    BinRange {
        band: usize,
        start_bin: usize,
        end_bin: usize,
        num_bins: usize,
    },

    #[error("band {band}: threshold multiplier must be positive and finite, got {value}")]
    Multiplier { band: usize, value: f32 },

    #[error("band id {band} out of range for {band_count} configured bands")]
    BandId { band: usize, band_count: usize },

    #[error("band id {band} configured more than once")]
    DuplicateBand { band: usize },

    #[error("frame {frame} has {found} bins, expected {expected}")]
    RaggedSpectrum {
        frame: usize,
        expected: usize,
        found: usize,
    },
}
