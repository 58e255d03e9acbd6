//! WAV file encoding and decoding via hound.
//!
//! Output files are always mono 32-bit float at the pipeline rate; the
//! reader accepts int and float encodings at any channel count and
//! downmixes, which keeps the CLI and the tests independent of how a
//! fixture was produced.

use std::path::Path;

use crate::audio::Waveform;
use crate::error::{ClarionError, Result};

/// Write `samples` to `path` as a mono 32-bit float WAV at `sample_rate`.
///
/// # Errors
/// Returns `ClarionError::Encode` on any writer failure.
pub fn write_waveform(path: &Path, samples: &[f32], sample_rate: u32) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let mut writer = hound::WavWriter::create(path, spec)
        .map_err(|e| ClarionError::Encode(format!("creating {}: {e}", path.display())))?;
    for &sample in samples {
        writer
            .write_sample(sample)
            .map_err(|e| ClarionError::Encode(e.to_string()))?;
    }
    writer
        .finalize()
        .map_err(|e| ClarionError::Encode(e.to_string()))?;
    Ok(())
}

/// Read a WAV file into a mono f32 waveform at its native rate.
///
/// Multi-channel files are downmixed by averaging; integer encodings are
/// scaled into [-1.0, 1.0].
pub fn read_waveform(path: &Path) -> Result<Waveform> {
    let mut reader = hound::WavReader::open(path)
        .map_err(|e| ClarionError::Decode(format!("opening {}: {e}", path.display())))?;
    let spec = reader.spec();
    let channels = usize::from(spec.channels.max(1));

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .map(|s| s.map_err(|e| ClarionError::Decode(e.to_string())))
            .collect::<Result<Vec<_>>>()?,
        hound::SampleFormat::Int => {
            if spec.bits_per_sample <= 16 {
                reader
                    .samples::<i16>()
                    .map(|s| {
                        s.map(|v| (v as f32) / (i16::MAX as f32))
                            .map_err(|e| ClarionError::Decode(e.to_string()))
                    })
                    .collect::<Result<Vec<_>>>()?
            } else {
                let max = ((1_i64 << (spec.bits_per_sample - 1)) - 1) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| {
                        s.map(|v| (v as f32) / max)
                            .map_err(|e| ClarionError::Decode(e.to_string()))
                    })
                    .collect::<Result<Vec<_>>>()?
            }
        }
    };

    if channels == 1 {
        return Ok(Waveform::new(interleaved, spec.sample_rate));
    }

    let mut mono = Vec::with_capacity(interleaved.len() / channels);
    for frame in interleaved.chunks(channels) {
        let sum = frame.iter().copied().sum::<f32>();
        mono.push(sum / channels as f32);
    }
    Ok(Waveform::new(mono, spec.sample_rate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_wav(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("clarion-wav-{tag}-{}.wav", std::process::id()))
    }

    #[test]
    fn float_roundtrip_is_bit_exact() {
        let path = temp_wav("roundtrip");
        let samples: Vec<f32> = (0..2_000).map(|i| (i as f32 * 0.003).sin() * 0.8).collect();

        write_waveform(&path, &samples, 48_000).unwrap();
        let back = read_waveform(&path).unwrap();

        assert_eq!(back.sample_rate, 48_000);
        assert_eq!(back.samples, samples);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn int16_input_is_scaled() {
        let path = temp_wav("int16");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 48_000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        writer.write_sample(i16::MAX).unwrap();
        writer.write_sample(0i16).unwrap();
        writer.finalize().unwrap();

        let back = read_waveform(&path).unwrap();
        assert_eq!(back.samples, vec![1.0, 0.0]);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn unwritable_path_fails_with_encode_error() {
        let err = write_waveform(Path::new("/nonexistent/dir/out.wav"), &[0.0], 48_000)
            .unwrap_err();
        assert!(matches!(err, ClarionError::Encode(_)), "got {err:?}");
    }
}
