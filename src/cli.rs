use clap::Parser;
use std::path::PathBuf;

use pulsemap::onset::NeighborRule;

#[derive(Parser, Debug)]
#[command(name = "pulsemap", about = "Per-band onset detection for beat mapping")]
pub struct Cli {
    /// Input audio file (WAV, MP3, FLAC, OGG)
    pub input: PathBuf,

    /// Report file (JSON). Printed to stdout when omitted.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Track configuration (TOML). Defaults to ./pulsemap.toml or the user config dir.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Samples per spectrum frame (overrides config)
    #[arg(long)]
    pub sample_size: Option<usize>,

    /// Neighbor a peak candidate is compared against (overrides config)
    #[arg(long, value_enum)]
    pub neighbor: Option<NeighborRule>,

    /// Include every frame's per-band values in the report
    #[arg(long)]
    pub dump_frames: bool,

    /// Only log warnings and errors
    #[arg(short, long)]
    pub quiet: bool,
}
