mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use cli::Cli;
use pulsemap::config::{self, Config};
use pulsemap::report::{OnsetReport, TrackInfo};
use pulsemap::{audio, onset};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .init();

    let config = match config::find_config(cli.config.as_deref()) {
        Some(path) => {
            let cfg = config::load_config(&path)?;
            log::info!("Loaded config from {}", path.display());
            cfg
        }
        None => {
            log::info!("No config found, using default bands");
            Config::default()
        }
    };

    let sample_size = cli.sample_size.unwrap_or(config.spectrum.sample_size);
    let neighbor = cli.neighbor.unwrap_or(config.detection.neighbor);
    let bands = config.bands_or_default();

    if !cli.input.exists() {
        anyhow::bail!("Input file not found: {}", cli.input.display());
    }

    log::info!("pulsemap - per-band onset detection");
    log::info!("Input: {}", cli.input.display());
    log::info!("Bands: {}, sample size: {}, neighbor: {:?}", bands.len(), sample_size, neighbor);

    // 1. Decode
    let track = audio::decode::decode_track(&cli.input)?;

    // 2. Spectrum
    let pb = ProgressBar::new(0);
    if cli.quiet {
        pb.set_draw_target(indicatif::ProgressDrawTarget::hidden());
    }
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} frames ({eta} remaining)")
            .context("Invalid progress template")?
            .progress_chars("=>-"),
    );
    let spectrogram =
        audio::spectrum::compute(&track.samples, track.sample_rate, sample_size, &pb)?;
    pb.finish_and_clear();

    // 3. Onsets
    let info = TrackInfo {
        sample_rate: spectrogram.sample_rate,
        sample_size: spectrogram.sample_size,
        frame_duration: spectrogram.frame_duration(),
    };
    let frames = onset::analyze_with(spectrogram.frames, &bands, neighbor)
        .context("Band configuration rejected")?;

    // 4. Report
    let report = OnsetReport::build(&info, &frames, &bands, cli.dump_frames);
    for band in &report.bands {
        log::info!(
            "Band {} (bins {}-{}): {} peaks",
            band.band, band.start_bin, band.end_bin, band.peak_count
        );
    }
    log::info!("{} onset frames across {} frames", report.onsets.len(), report.frame_count);

    report.write(cli.output.as_deref())
}
