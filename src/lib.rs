//! Per-band onset detection over audio spectrograms, producing peak flags a
//! beat-mapping stage can turn into timed events.

pub mod audio;
pub mod config;
pub mod onset;
pub mod report;
