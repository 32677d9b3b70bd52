use super::band::{BandConfig, NeighborRule};
use super::frame::FrameRecord;

/// Second pass: adaptive threshold, pruned flux and refractory-gated peaks.
/// Needs the band's flux already written for every frame.
struct PeakPicker<'a> {
    config: &'a BandConfig,
    neighbor: NeighborRule,
    /// Frames left before this band may peak again
    refractory_left: usize,
}

impl<'a> PeakPicker<'a> {
    fn new(config: &'a BandConfig, neighbor: NeighborRule) -> Self {
        Self {
            config,
            neighbor,
            refractory_left: 0,
        }
    }

    fn step(&mut self, frames: &mut [FrameRecord], index: usize) {
        let band = self.config.band;
        let threshold = self.threshold(frames, index);

        let slot = frames[index].band_mut(band);
        slot.threshold = threshold;
        slot.pruned_flux = (slot.flux - threshold).max(0.0);

        if self.refractory_left > 0 {
            self.refractory_left -= 1;
        } else if self.is_candidate(frames, index) {
            frames[index].mark_peak(band);
            self.refractory_left = self.config.refractory_frames;
        }
    }

    /// Window clamps at the sequence edges instead of padding. A window that
    /// clamps down to zero width (single-frame sequence) has no threshold.
    fn threshold(&self, frames: &[FrameRecord], index: usize) -> f32 {
        let half = self.config.half_window();
        let start = index.saturating_sub(half);
        let end = (index + half).min(frames.len() - 1);
        if start == end && half > 0 {
            return 0.0;
        }
        let window = &frames[start..=end];
        let sum: f32 = window.iter().map(|f| f.slot(self.config.band).flux).sum();
        sum / window.len() as f32 * self.config.threshold_multiplier
    }

    fn is_candidate(&self, frames: &[FrameRecord], index: usize) -> bool {
        if index == 0 || index + 1 >= frames.len() {
            return false;
        }
        let band = self.config.band;
        let current = frames[index].slot(band).pruned_flux;
        let neighbor = match self.neighbor {
            NeighborRule::Following => frames[index + 1].slot(band).pruned_flux,
            NeighborRule::Preceding => frames[index - 1].slot(band).pruned_flux,
        };
        current > neighbor
    }
}

pub fn run(frames: &mut [FrameRecord], config: &BandConfig, neighbor: NeighborRule) {
    let mut picker = PeakPicker::new(config, neighbor);
    for index in 0..frames.len() {
        picker.step(frames, index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_flux(values: &[f32]) -> Vec<FrameRecord> {
        values
            .iter()
            .map(|&flux| {
                let mut frame = FrameRecord::new(vec![0.0]);
                frame.reset(1);
                frame.band_mut(0).flux = flux;
                frame
            })
            .collect()
    }

    fn peaks(frames: &[FrameRecord]) -> Vec<usize> {
        frames
            .iter()
            .enumerate()
            .filter(|(_, f)| f.slot(0).is_peak)
            .map(|(i, _)| i)
            .collect()
    }

    #[test]
    fn threshold_averages_clamped_window() {
        let mut seq = with_flux(&[0.0, 0.0, 0.0, 10.0, 0.0]);
        let config = BandConfig::new(0, 0, 0).with_window(2).with_multiplier(1.0);
        run(&mut seq, &config, NeighborRule::Following);

        let expected = 10.0 / 3.0;
        assert!((seq[3].slot(0).threshold - expected).abs() < 1e-5);
        assert!((seq[3].slot(0).pruned_flux - (10.0 - expected)).abs() < 1e-5);
        // last frame: window is frames 3..=4
        assert!((seq[4].slot(0).threshold - 5.0).abs() < 1e-5);
        assert_eq!(seq[0].slot(0).threshold, 0.0);
    }

    #[test]
    fn zero_window_scales_own_flux() {
        let mut seq = with_flux(&[2.0, 4.0, 1.0]);
        let config = BandConfig::new(0, 0, 0).with_window(0).with_multiplier(0.5);
        run(&mut seq, &config, NeighborRule::Following);

        let thresholds: Vec<f32> = seq.iter().map(|f| f.slot(0).threshold).collect();
        assert_eq!(thresholds, vec![1.0, 2.0, 0.5]);
        let pruned: Vec<f32> = seq.iter().map(|f| f.slot(0).pruned_flux).collect();
        assert_eq!(pruned, vec![1.0, 2.0, 0.5]);
    }

    #[test]
    fn single_frame_has_zero_threshold() {
        let mut seq = with_flux(&[7.0]);
        let config = BandConfig::new(0, 0, 0).with_window(4).with_multiplier(1.0);
        run(&mut seq, &config, NeighborRule::Following);
        assert!(peaks(&seq).is_empty());
        assert_eq!(seq[0].slot(0).threshold, 0.0);
        assert_eq!(seq[0].slot(0).pruned_flux, 7.0);
    }

    #[test]
    fn single_frame_zero_window_scales_own_flux() {
        let mut seq = with_flux(&[7.0]);
        let config = BandConfig::new(0, 0, 0).with_window(0).with_multiplier(0.5);
        run(&mut seq, &config, NeighborRule::Following);
        assert_eq!(seq[0].slot(0).threshold, 3.5);
    }

    #[test]
    fn edges_are_never_peaks() {
        let mut seq = with_flux(&[50.0, 0.0, 0.0, 0.0, 50.0]);
        let config = BandConfig::new(0, 0, 0).with_window(2).with_multiplier(1.0);
        run(&mut seq, &config, NeighborRule::Following);
        assert!(seq[0].slot(0).pruned_flux > 0.0);
        assert!(seq[4].slot(0).pruned_flux > 0.0);
        assert!(peaks(&seq).is_empty());
    }

    #[test]
    fn following_rule_sees_uncomputed_neighbor() {
        // frames 1 and 2 both clear the threshold; the following slot still
        // reads zero when each is visited, so both count
        let mut seq = with_flux(&[0.0, 10.0, 20.0, 0.0, 0.0, 0.0]);
        let config = BandConfig::new(0, 0, 0).with_window(0).with_multiplier(0.5);
        run(&mut seq, &config, NeighborRule::Following);
        assert_eq!(peaks(&seq), vec![1, 2]);
    }

    #[test]
    fn preceding_rule_needs_a_rise() {
        let mut seq = with_flux(&[0.0, 10.0, 20.0, 5.0, 0.0, 0.0]);
        let config = BandConfig::new(0, 0, 0).with_window(0).with_multiplier(0.5);
        run(&mut seq, &config, NeighborRule::Preceding);
        // pruned: 0, 5, 10, 2.5, 0, 0
        assert_eq!(peaks(&seq), vec![1, 2]);

        let mut seq = with_flux(&[0.0, 20.0, 10.0, 0.0]);
        run(&mut seq, &config, NeighborRule::Preceding);
        assert_eq!(peaks(&seq), vec![1]);
    }

    #[test]
    fn refractory_suppresses_following_frames() {
        let mut seq = with_flux(&[0.0, 9.0, 9.0, 9.0, 9.0, 9.0, 9.0, 0.0]);
        let config = BandConfig::new(0, 0, 0)
            .with_window(0)
            .with_multiplier(0.5)
            .with_refractory(2);
        run(&mut seq, &config, NeighborRule::Following);
        // peak, two silent frames, peak again
        assert_eq!(peaks(&seq), vec![1, 4]);
    }

    #[test]
    fn peak_marks_frame_level_fields() {
        let mut seq = with_flux(&[0.0, 10.0, 0.0]);
        let config = BandConfig::new(0, 0, 0).with_window(0).with_multiplier(1.0);
        run(&mut seq, &config, NeighborRule::Following);
        assert!(seq[1].has_any_peak);
        assert_eq!(seq[1].peak_bands, vec![0]);
        assert!(!seq[0].has_any_peak && !seq[2].has_any_peak);
    }
}
