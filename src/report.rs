use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

use crate::onset::{BandConfig, BandSlot, FrameRecord};

/// Detection results in a form a beat-mapping stage can consume.
#[derive(Debug, Serialize)]
pub struct OnsetReport {
    pub sample_rate: u32,
    pub sample_size: usize,
    pub frame_count: usize,
    /// Seconds per frame
    pub frame_duration: f32,
    pub bands: Vec<BandSummary>,
    /// Frames where at least one band peaked
    pub onsets: Vec<Onset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frames: Option<Vec<FrameDump>>,
}

#[derive(Debug, Serialize)]
pub struct BandSummary {
    pub band: usize,
    pub start_bin: usize,
    pub end_bin: usize,
    pub peak_count: usize,
    pub peaks: Vec<Peak>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Peak {
    pub frame: usize,
    pub time: f32,
}

#[derive(Debug, Serialize)]
pub struct Onset {
    pub frame: usize,
    pub time: f32,
    /// In band processing order
    pub bands: Vec<usize>,
}

#[derive(Debug, Serialize)]
pub struct FrameDump {
    pub frame: usize,
    pub time: f32,
    pub has_any_peak: bool,
    pub per_band: Vec<BandSlot>,
}

pub struct TrackInfo {
    pub sample_rate: u32,
    pub sample_size: usize,
    pub frame_duration: f32,
}

impl OnsetReport {
    pub fn build(
        info: &TrackInfo,
        frames: &[FrameRecord],
        bands: &[BandConfig],
        dump_frames: bool,
    ) -> Self {
        let time_of = |frame: usize| frame as f32 * info.frame_duration;

        let bands: Vec<BandSummary> = bands
            .iter()
            .map(|config| {
                let peaks: Vec<Peak> = frames
                    .iter()
                    .enumerate()
                    .filter(|(_, f)| f.band(config.band).is_some_and(|s| s.is_peak))
                    .map(|(frame, _)| Peak { frame, time: time_of(frame) })
                    .collect();
                BandSummary {
                    band: config.band,
                    start_bin: config.start_bin,
                    end_bin: config.end_bin,
                    peak_count: peaks.len(),
                    peaks,
                }
            })
            .collect();

        let onsets: Vec<Onset> = frames
            .iter()
            .enumerate()
            .filter(|(_, f)| f.has_any_peak)
            .map(|(frame, f)| Onset {
                frame,
                time: time_of(frame),
                bands: f.peak_bands.clone(),
            })
            .collect();

        let frames_dump = dump_frames.then(|| {
            frames
                .iter()
                .enumerate()
                .map(|(frame, f)| FrameDump {
                    frame,
                    time: time_of(frame),
                    has_any_peak: f.has_any_peak,
                    per_band: f.per_band.clone(),
                })
                .collect::<Vec<_>>()
        });

        Self {
            sample_rate: info.sample_rate,
            sample_size: info.sample_size,
            frame_count: frames.len(),
            frame_duration: info.frame_duration,
            bands,
            onsets,
            frames: frames_dump,
        }
    }

    /// Pretty JSON to `path`, or stdout when `None`.
    pub fn write(&self, path: Option<&Path>) -> Result<()> {
        match path {
            Some(path) => {
                let file = std::fs::File::create(path)
                    .with_context(|| format!("Failed to create report: {}", path.display()))?;
                let mut writer = std::io::BufWriter::new(file);
                serde_json::to_writer_pretty(&mut writer, self)
                    .context("Failed to serialize report")?;
                writer.flush().context("Failed to write report")?;
                log::info!("Report written to {}", path.display());
            }
            None => {
                let stdout = std::io::stdout();
                let mut lock = stdout.lock();
                serde_json::to_writer_pretty(&mut lock, self)
                    .context("Failed to serialize report")?;
                writeln!(lock)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::onset;

    fn analyzed() -> (Vec<FrameRecord>, Vec<BandConfig>) {
        let frames = [0.0, 10.0, 0.0, 10.0, 0.0, 10.0, 0.0]
            .iter()
            .map(|&v| FrameRecord::new(vec![v, 0.0]))
            .collect();
        let bands = vec![
            BandConfig::new(0, 0, 0).with_window(2).with_multiplier(1.0),
            BandConfig::new(1, 0, 1)
                .with_window(2)
                .with_multiplier(1.0)
                .with_refractory(2),
        ];
        (onset::analyze(frames, &bands).unwrap(), bands)
    }

    fn info() -> TrackInfo {
        TrackInfo {
            sample_rate: 1000,
            sample_size: 250,
            frame_duration: 0.25,
        }
    }

    #[test]
    fn summarizes_peaks_per_band() {
        let (frames, bands) = analyzed();
        let report = OnsetReport::build(&info(), &frames, &bands, false);

        assert_eq!(report.frame_count, 7);
        assert_eq!(report.bands[0].peak_count, 3);
        assert_eq!(
            report.bands[0].peaks,
            vec![
                Peak { frame: 1, time: 0.25 },
                Peak { frame: 3, time: 0.75 },
                Peak { frame: 5, time: 1.25 },
            ]
        );
        assert_eq!(report.bands[1].peaks.len(), 2);
        assert_eq!(report.bands[1].end_bin, 1);
        assert!(report.frames.is_none());
    }

    #[test]
    fn onsets_list_peaking_bands_in_order() {
        let (frames, bands) = analyzed();
        let report = OnsetReport::build(&info(), &frames, &bands, false);

        let onset_frames: Vec<usize> = report.onsets.iter().map(|o| o.frame).collect();
        assert_eq!(onset_frames, vec![1, 3, 5]);
        assert_eq!(report.onsets[0].bands, vec![0, 1]);
        assert_eq!(report.onsets[1].bands, vec![0]);
    }

    #[test]
    fn dump_includes_every_frame() {
        let (frames, bands) = analyzed();
        let report = OnsetReport::build(&info(), &frames, &bands, true);
        let dump = report.frames.as_ref().unwrap();
        assert_eq!(dump.len(), 7);
        assert_eq!(dump[1].per_band.len(), 2);
        assert!(dump[1].per_band[0].is_peak);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["frames"][1]["per_band"][0]["flux"], 10.0);
        assert_eq!(json["onsets"][0]["bands"], serde_json::json!([0, 1]));
    }

    #[test]
    fn writes_report_file() {
        let (frames, bands) = analyzed();
        let report = OnsetReport::build(&info(), &frames, &bands, false);
        let name = format!("pulsemap-report-{}.json", std::process::id());
        let path = std::env::temp_dir().join(name);
        report.write(Some(&path)).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(written["frame_count"], 7);
        assert!(written.get("frames").is_none());
    }
}
