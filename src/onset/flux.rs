use super::band::BandConfig;
use super::frame::FrameRecord;

/// First pass: rectified spectral flux over the band's bins.
struct FluxComputer<'a> {
    config: &'a BandConfig,
    /// Band bins of the previous frame; zero before frame 0
    previous: Vec<f32>,
}

impl<'a> FluxComputer<'a> {
    fn new(config: &'a BandConfig) -> Self {
        Self {
            config,
            previous: vec![0.0; config.end_bin - config.start_bin + 1],
        }
    }

    fn step(&mut self, frame: &mut FrameRecord) {
        let current = &frame.magnitudes[self.config.start_bin..=self.config.end_bin];
        let flux: f32 = current
            .iter()
            .zip(self.previous.iter())
            .map(|(cur, prev)| (cur - prev).max(0.0))
            .sum();
        self.previous.copy_from_slice(current);
        frame.band_mut(self.config.band).flux = flux;
    }
}

pub fn run(frames: &mut [FrameRecord], config: &BandConfig) {
    let mut computer = FluxComputer::new(config);
    for frame in frames.iter_mut() {
        computer.step(frame);
    }
}
