//! Audio sample-rate conversion using a rubato `FastFixedIn` resampler.
//!
//! ## Design
//!
//! Uploads arrive at whatever rate the source file was recorded at. The
//! model expects 48 kHz mono f32, so the loader converts each decoded
//! waveform in one offline pass.
//!
//! When source rate == target rate, `RateConverter` is a zero-copy
//! passthrough and no rubato session is created at all.
//!
//! ## Usage
//!
//! ```ignore
//! let mut rc = RateConverter::new(44_100, 48_000)?;
//! let out = rc.convert(&decoded)?; // Vec<f32> at 48 kHz
//! ```

use rubato::{FastFixedIn, PolynomialDegree, Resampler};

use crate::error::{ClarionError, Result};

/// Input frame count per rubato call.
const RESAMPLE_CHUNK: usize = 1024;

/// Converts a complete f32 mono buffer from one fixed sample rate to another.
pub struct RateConverter {
    /// `None` when source rate == target rate (passthrough mode).
    resampler: Option<FastFixedIn<f32>>,
    /// Target-to-source rate ratio (1.0 in passthrough mode).
    ratio: f64,
    /// Pre-allocated output buffer: `[1][output_frames_max]`.
    output_buf: Vec<Vec<f32>>,
}

impl RateConverter {
    /// Create a new converter.
    ///
    /// # Errors
    /// Returns `ClarionError::Decode` if rubato fails to initialise.
    pub fn new(source_rate: u32, target_rate: u32) -> Result<Self> {
        if source_rate == target_rate {
            return Ok(Self {
                resampler: None,
                ratio: 1.0,
                output_buf: Vec::new(),
            });
        }

        let ratio = target_rate as f64 / source_rate as f64;

        let resampler = FastFixedIn::<f32>::new(
            ratio,
            1.0, // fixed ratio, no dynamic adjustment
            PolynomialDegree::Cubic,
            RESAMPLE_CHUNK,
            1, // mono
        )
        .map_err(|e| ClarionError::Decode(format!("resampler init: {e}")))?;

        let max_out = resampler.output_frames_max();
        let output_buf = vec![vec![0f32; max_out]; 1];

        tracing::debug!(source_rate, target_rate, max_out, "resampling enabled");

        Ok(Self {
            resampler: Some(resampler),
            ratio,
            output_buf,
        })
    }

    /// Convert a complete buffer, returning the resampled samples.
    ///
    /// The buffer is fed to rubato in fixed-size blocks. The final partial
    /// block is zero-padded to a full block and the output trimmed back to
    /// the expected rounded length, so no tail samples are lost.
    pub fn convert(&mut self, samples: &[f32]) -> Result<Vec<f32>> {
        let Some(ref mut resampler) = self.resampler else {
            // Zero-copy passthrough
            return Ok(samples.to_vec());
        };

        let expected = (samples.len() as f64 * self.ratio).round() as usize;
        let mut out = Vec::with_capacity(expected + RESAMPLE_CHUNK);
        let mut padded = [0f32; RESAMPLE_CHUNK];

        for block in samples.chunks(RESAMPLE_CHUNK) {
            let input = if block.len() == RESAMPLE_CHUNK {
                block
            } else {
                padded[..block.len()].copy_from_slice(block);
                padded[block.len()..].fill(0.0);
                &padded[..]
            };

            let (_consumed, produced) = resampler
                .process_into_buffer(&[input], &mut self.output_buf, None)
                .map_err(|e| ClarionError::Decode(format!("resampler process: {e}")))?;
            out.extend_from_slice(&self.output_buf[0][..produced]);
        }

        out.truncate(expected);
        Ok(out)
    }

    /// Returns `true` when source rate == target rate (no resampling occurs).
    pub fn is_passthrough(&self) -> bool {
        self.resampler.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passthrough_identity() {
        let mut rc = RateConverter::new(48_000, 48_000).unwrap();
        assert!(rc.is_passthrough());
        let samples: Vec<f32> = (0..480).map(|i| i as f32 * 0.001).collect();
        let out = rc.convert(&samples).unwrap();
        assert_eq!(out, samples);
    }

    #[test]
    fn ratio_44_1k_to_48k_correct_length() {
        let mut rc = RateConverter::new(44_100, 48_000).unwrap();
        assert!(!rc.is_passthrough());
        // 44 100 input samples at 44.1 kHz → ~48 000 at 48 kHz
        let samples = vec![0.25f32; 44_100];
        let out = rc.convert(&samples).unwrap();
        let expected = 48_000usize;
        assert!(
            (out.len() as isize - expected as isize).unsigned_abs() <= 48,
            "output len={} expected≈{}",
            out.len(),
            expected
        );
    }

    #[test]
    fn short_tail_is_not_dropped() {
        let mut rc = RateConverter::new(16_000, 48_000).unwrap();
        // Fewer samples than one rubato block still produce output.
        let samples = vec![0.5f32; 100];
        let out = rc.convert(&samples).unwrap();
        assert_eq!(out.len(), 300);
    }

    #[test]
    fn downsample_halves_length() {
        let mut rc = RateConverter::new(48_000, 24_000).unwrap();
        let samples = vec![0.1f32; 9_600];
        let out = rc.convert(&samples).unwrap();
        assert_eq!(out.len(), 4_800);
    }
}
