use anyhow::{Context, Result};
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CodecParameters, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, Packet};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Mono PCM for one track.
pub struct DecodedTrack {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl DecodedTrack {
    pub fn duration(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

pub fn decode_track(path: &Path) -> Result<DecodedTrack> {
    let (mut reader, stream) = open_stream(path)?;
    let mut decoder = symphonia::default::get_codecs()
        .make(&stream.params, &DecoderOptions::default())
        .context("Failed to create audio decoder")?;

    let mut samples = Vec::new();
    let mut skipped = 0usize;
    while let Some(packet) = next_packet(reader.as_mut())? {
        if packet.track_id() != stream.track_id {
            continue;
        }
        match decoder.decode(&packet) {
            Ok(audio) => {
                let mut buf = SampleBuffer::<f32>::new(audio.capacity() as u64, *audio.spec());
                buf.copy_interleaved_ref(audio);
                downmix_into(buf.samples(), stream.channels, &mut samples);
            }
            Err(SymphoniaError::DecodeError(msg)) => {
                skipped += 1;
                log::debug!("Skipping undecodable packet: {}", msg);
            }
            Err(e) => return Err(e.into()),
        }
    }
    if skipped > 0 {
        log::warn!("{} packets could not be decoded", skipped);
    }

    let track = DecodedTrack {
        samples,
        sample_rate: stream.sample_rate,
    };
    log::info!(
        "Decoded {}: {} samples, {}Hz, {:.1}s",
        path.display(),
        track.samples.len(),
        track.sample_rate,
        track.duration()
    );
    Ok(track)
}

/// The audio stream picked out of a container.
struct StreamInfo {
    track_id: u32,
    channels: usize,
    sample_rate: u32,
    params: CodecParameters,
}

fn open_stream(path: &Path) -> Result<(Box<dyn FormatReader>, StreamInfo)> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open audio file: {}", path.display()))?;
    let source = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let reader = symphonia::default::get_probe()
        .format(&hint, source, &FormatOptions::default(), &MetadataOptions::default())
        .context("Failed to probe audio format")?
        .format;

    let track = reader
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .context("No audio tracks found")?;
    let stream = StreamInfo {
        track_id: track.id,
        channels: track.codec_params.channels.map_or(1, |c| c.count()),
        sample_rate: track.codec_params.sample_rate.context("Unknown sample rate")?,
        params: track.codec_params.clone(),
    };
    Ok((reader, stream))
}

/// `None` once the container runs out of packets.
fn next_packet(reader: &mut dyn FormatReader) -> Result<Option<Packet>> {
    match reader.next_packet() {
        Ok(packet) => Ok(Some(packet)),
        Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

/// Average interleaved channels into mono and append to `out`.
fn downmix_into(interleaved: &[f32], channels: usize, out: &mut Vec<f32>) {
    if channels <= 1 {
        out.extend_from_slice(interleaved);
        return;
    }
    out.extend(
        interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32),
    );
}
