//! Decode an uploaded audio file into a mono 48 kHz waveform.
//!
//! Symphonia probes the container, the first decodable track is pulled out
//! packet by packet, interleaved channels are averaged down to mono, and
//! rubato brings the result to the pipeline rate. The source rate reported
//! by the decoder is discarded once resampling is done.

use std::fs::File;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::debug;

use crate::audio::{resample::RateConverter, Waveform};
use crate::error::{ClarionError, Result};

/// Decode `path` into a mono f32 waveform resampled to `target_rate`.
///
/// # Errors
/// - `ClarionError::Io` if the file cannot be opened.
/// - `ClarionError::Decode` if the contents are not decodable audio.
pub fn load_waveform(path: &Path, target_rate: u32) -> Result<Waveform> {
    let src = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(src), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| ClarionError::Decode(format!("unsupported or corrupt audio: {e}")))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| ClarionError::Decode("no decodable audio track".into()))?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| ClarionError::Decode(format!("codec init: {e}")))?;

    let track_id = track.id;
    let mut samples: Vec<f32> = Vec::new();
    let mut source_rate = 0u32;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            // End of stream surfaces as an IO error.
            Err(SymphoniaError::IoError(_)) => break,
            Err(e) => return Err(ClarionError::Decode(e.to_string())),
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                source_rate = spec.rate;

                let mut sample_buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                sample_buf.copy_interleaved_ref(decoded);

                let channels = spec.channels.count();
                if channels == 1 {
                    samples.extend_from_slice(sample_buf.samples());
                } else {
                    for frame in sample_buf.samples().chunks(channels) {
                        let sum: f32 = frame.iter().sum();
                        samples.push(sum / channels as f32);
                    }
                }
            }
            // A corrupt packet mid-stream is skipped, not fatal.
            Err(SymphoniaError::DecodeError(_)) => (),
            Err(SymphoniaError::IoError(_)) => break,
            Err(e) => return Err(ClarionError::Decode(e.to_string())),
        }
    }

    if !samples.is_empty() && source_rate == 0 {
        return Err(ClarionError::Decode("source sample rate unknown".into()));
    }

    debug!(
        decoded = samples.len(),
        source_rate, target_rate, "waveform decoded"
    );

    if !samples.is_empty() && source_rate != target_rate {
        let mut converter = RateConverter::new(source_rate, target_rate)?;
        samples = converter.convert(&samples)?;
    }

    Ok(Waveform::new(samples, target_rate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_wav(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("clarion-loader-{tag}-{}.wav", std::process::id()))
    }

    fn write_wav(path: &Path, spec: hound::WavSpec, frames: usize, value: impl Fn(usize) -> f32) {
        let mut writer = hound::WavWriter::create(path, spec).unwrap();
        for i in 0..frames {
            for _ in 0..spec.channels {
                writer.write_sample(value(i)).unwrap();
            }
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn mono_48k_float_wav_roundtrips_exactly() {
        let path = temp_wav("mono48k");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 48_000,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        write_wav(&path, spec, 4_800, |i| (i as f32 * 0.01).sin() * 0.5);

        let waveform = load_waveform(&path, 48_000).unwrap();
        assert_eq!(waveform.sample_rate, 48_000);
        assert_eq!(waveform.len(), 4_800);
        let expected: Vec<f32> = (0..4_800).map(|i| (i as f32 * 0.01).sin() * 0.5).collect();
        assert_eq!(waveform.samples, expected);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn stereo_44_1k_wav_is_downmixed_and_resampled() {
        let path = temp_wav("stereo441");
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 44_100,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        write_wav(&path, spec, 44_100, |i| ((i % 100) as f32 / 100.0) - 0.5);

        let waveform = load_waveform(&path, 48_000).unwrap();
        assert_eq!(waveform.sample_rate, 48_000);
        // One second of audio, within resampler rounding of 48 000 samples.
        assert!(
            (waveform.len() as isize - 48_000).unsigned_abs() <= 48,
            "len={}",
            waveform.len()
        );

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn garbage_bytes_fail_with_decode_error() {
        let path = std::env::temp_dir().join(format!(
            "clarion-loader-garbage-{}.mp3",
            std::process::id()
        ));
        std::fs::write(&path, b"certainly not an audio container").unwrap();

        let err = load_waveform(&path, 48_000).unwrap_err();
        assert!(matches!(err, ClarionError::Decode(_)), "got {err:?}");

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn missing_file_fails_with_io_error() {
        let err = load_waveform(Path::new("/nonexistent/clarion.wav"), 48_000).unwrap_err();
        assert!(matches!(err, ClarionError::Io(_)), "got {err:?}");
    }
}
