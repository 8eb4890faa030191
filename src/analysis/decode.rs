//! Audio file decoding to mono PCM
//!
//! [`MonoStream`] yields one downmixed chunk per decoded packet, so callers
//! can stop early without buffering the whole file.

use anyhow::{Context, Result};
use std::path::Path;
use symphonia::core::audio::{AudioBufferRef, SampleBuffer};
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Longest stretch of audio decoded for tempo estimation
const MAX_SECONDS: usize = 120;

/// Packet-by-packet mono decoder for the first audio track of a file
pub struct MonoStream {
    reader: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    sample_rate: u32,
}

impl MonoStream {
    pub fn open(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path).with_context(|| format!("Failed to open audio file: {:?}", path))?;

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let reader = symphonia::default::get_probe()
            .format(
                &hint,
                MediaSourceStream::new(Box::new(file), Default::default()),
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .with_context(|| format!("Failed to probe audio format: {:?}", path))?
            .format;

        let (track_id, sample_rate, decoder) = {
            let track = reader
                .tracks()
                .iter()
                .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
                .context("No audio track found")?;
            let sample_rate = track.codec_params.sample_rate.context("No sample rate in audio track")?;
            let decoder = symphonia::default::get_codecs()
                .make(&track.codec_params, &DecoderOptions::default())
                .context("Failed to create audio decoder")?;
            (track.id, sample_rate, decoder)
        };

        Ok(Self {
            reader,
            decoder,
            track_id,
            sample_rate,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

impl Iterator for MonoStream {
    type Item = Vec<f32>;

    /// Next downmixed packet; corrupt packets are skipped, read errors end the stream
    fn next(&mut self) -> Option<Vec<f32>> {
        loop {
            let packet = match self.reader.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => return None,
                Err(e) => {
                    log::warn!("Stopping at unreadable packet: {}", e);
                    return None;
                }
            };

            if packet.track_id() != self.track_id {
                continue;
            }

            match self.decoder.decode(&packet) {
                Ok(decoded) => return Some(downmix(decoded)),
                Err(SymphoniaError::DecodeError(e)) => log::warn!("Skipping corrupt packet: {}", e),
                Err(e) => {
                    log::warn!("Decoder gave up: {}", e);
                    return None;
                }
            }
        }
    }
}

/// Average interleaved channels into one
fn downmix(decoded: AudioBufferRef<'_>) -> Vec<f32> {
    let spec = *decoded.spec();
    let mut interleaved = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
    interleaved.copy_interleaved_ref(decoded);

    let channels = spec.channels.count().max(1);
    interleaved
        .samples()
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Decode up to two minutes of an audio file to mono f32 samples
pub fn decode_to_mono(path: &Path) -> Result<(Vec<f32>, u32)> {
    let stream = MonoStream::open(path)?;
    let sample_rate = stream.sample_rate();
    let limit = sample_rate as usize * MAX_SECONDS;

    let mut samples: Vec<f32> = Vec::new();
    for chunk in stream {
        let room = limit - samples.len();
        samples.extend(chunk.into_iter().take(room));
        if samples.len() >= limit {
            break;
        }
    }

    log::debug!(
        "Decoded {:.1}s at {}Hz from {:?}",
        samples.len() as f32 / sample_rate as f32,
        sample_rate,
        path
    );

    Ok((samples, sample_rate))
}
