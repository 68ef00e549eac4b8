//! Audio file loading
//!
//! Decodes an audio file (MP3, WAV, FLAC, OGG — anything Symphonia can
//! probe) into a mono f32 buffer at the file's native sample rate.
//! Multi-channel input is downmixed to mono by channel averaging.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use thiserror::Error;

use crate::types::AudioBuffer;

/// Errors that can occur while loading an audio file
#[derive(Debug, Error)]
pub enum AudioFileError {
    #[error("Failed to read audio file: {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported audio format: {0}")]
    UnsupportedFormat(String),

    #[error("No audio track found in {path}")]
    NoAudioTrack { path: PathBuf },

    #[error("Unknown sample rate in {path}")]
    UnknownSampleRate { path: PathBuf },

    #[error("No audio samples decoded from {path}")]
    EmptyFile { path: PathBuf },

    #[error("Failed to stage uploaded audio: {0}")]
    Staging(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AudioFileError>;

/// Load an audio file into a mono buffer.
///
/// The sample rate is the file's native rate; no resampling is performed.
pub fn load_file(path: &Path) -> Result<AudioBuffer> {
    let (samples, sample_rate, channels) = decode_audio(path)?;

    if samples.is_empty() {
        return Err(AudioFileError::EmptyFile {
            path: path.to_path_buf(),
        });
    }

    let mono = downmix_to_mono(&samples, channels);
    let buffer = AudioBuffer::new(mono, sample_rate);

    log::info!(
        "load_file: decoded {:?} ({:.2}s at {}Hz, {} channel(s))",
        path,
        buffer.duration_secs(),
        sample_rate,
        channels
    );

    Ok(buffer)
}

/// Load audio from an in-memory byte stream (e.g. an upload).
///
/// The bytes are staged to a temporary file scoped to this call and removed
/// when it returns, on success and failure alike. `extension` is an optional
/// file-extension hint ("mp3", "wav") that helps format probing.
pub fn load_bytes(bytes: &[u8], extension: Option<&str>) -> Result<AudioBuffer> {
    let suffix = extension.map(|ext| format!(".{}", ext));

    let mut builder = tempfile::Builder::new();
    builder.prefix("voicetone-upload-");
    if let Some(suffix) = suffix.as_deref() {
        builder.suffix(suffix);
    }

    let mut staged = builder.tempfile().map_err(AudioFileError::Staging)?;
    staged.write_all(bytes).map_err(AudioFileError::Staging)?;
    staged.flush().map_err(AudioFileError::Staging)?;

    // The temp file is unlinked when `staged` drops at the end of this scope
    load_file(staged.path())
}

/// Decode an audio file to interleaved f32 samples using Symphonia
fn decode_audio(path: &Path) -> Result<(Vec<f32>, u32, u16)> {
    let file = File::open(path).map_err(|e| AudioFileError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    // Create a hint with the file extension
    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    // Probe the media source
    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| AudioFileError::UnsupportedFormat(e.to_string()))?;

    let mut format = probed.format;

    // Find the first audio track
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != symphonia::core::codecs::CODEC_TYPE_NULL)
        .ok_or_else(|| AudioFileError::NoAudioTrack {
            path: path.to_path_buf(),
        })?;

    let track_id = track.id;

    let sample_rate =
        track
            .codec_params
            .sample_rate
            .ok_or_else(|| AudioFileError::UnknownSampleRate {
                path: path.to_path_buf(),
            })?;

    let channels = track
        .codec_params
        .channels
        .map(|c| c.count() as u16)
        .unwrap_or(2);

    // Create decoder
    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| AudioFileError::UnsupportedFormat(e.to_string()))?;

    let mut samples: Vec<f32> = Vec::new();
    let mut sample_buf: Option<SampleBuffer<f32>> = None;

    // Decode all packets
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => {
                log::warn!("decode_audio: error reading packet: {}", e);
                break;
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(e) => {
                log::warn!("decode_audio: error decoding packet: {}", e);
                continue;
            }
        };

        // Initialize sample buffer on first decode
        if sample_buf.is_none() {
            let spec = *decoded.spec();
            let duration = decoded.capacity() as u64;
            sample_buf = Some(SampleBuffer::new(duration, spec));
        }

        if let Some(ref mut buf) = sample_buf {
            buf.copy_interleaved_ref(decoded);
            samples.extend_from_slice(buf.samples());
        }
    }

    Ok((samples, sample_rate, channels))
}

/// Average interleaved channels down to a single mono channel
fn downmix_to_mono(samples: &[f32], channels: u16) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }

    samples
        .chunks(channels as usize)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wav_bytes(samples: &[f32], sample_rate: u32, channels: u16) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels,
            sample_rate,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut cursor = std::io::Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for &s in samples {
                writer.write_sample(s).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn test_downmix_stereo_averages_channels() {
        let interleaved = [1.0, 0.0, 0.5, 0.5, -1.0, 1.0];
        let mono = downmix_to_mono(&interleaved, 2);
        assert_eq!(mono, vec![0.5, 0.5, 0.0]);
    }

    #[test]
    fn test_downmix_mono_passthrough() {
        let samples = [0.1, 0.2, 0.3];
        assert_eq!(downmix_to_mono(&samples, 1), samples.to_vec());
    }

    #[test]
    fn test_load_missing_file_is_read_error() {
        let result = load_file(Path::new("/nonexistent/audio.wav"));
        assert!(matches!(result, Err(AudioFileError::Read { .. })));
    }

    #[test]
    fn test_load_bytes_roundtrip() {
        let samples: Vec<f32> = (0..4410)
            .map(|i| (2.0 * std::f32::consts::PI * 220.0 * i as f32 / 44100.0).sin() * 0.5)
            .collect();
        let bytes = wav_bytes(&samples, 44100, 1);

        let buffer = load_bytes(&bytes, Some("wav")).unwrap();
        assert_eq!(buffer.sample_rate, 44100);
        assert_eq!(buffer.len(), 4410);
    }

    #[test]
    fn test_load_bytes_stereo_downmixes() {
        // Stereo frames with identical channels decode to the same mono values
        let interleaved: Vec<f32> = (0..1000).flat_map(|i| {
            let s = (i as f32 / 100.0).sin() * 0.25;
            [s, s]
        }).collect();
        let bytes = wav_bytes(&interleaved, 48000, 2);

        let buffer = load_bytes(&bytes, Some("wav")).unwrap();
        assert_eq!(buffer.len(), 1000);
    }

    #[test]
    fn test_load_bytes_garbage_is_unsupported() {
        let result = load_bytes(&[0u8; 64], Some("wav"));
        assert!(matches!(
            result,
            Err(AudioFileError::UnsupportedFormat(_))
        ));
    }
}
