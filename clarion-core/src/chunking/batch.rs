//! `ChunkBatch` — a rectangular batch of fixed-length waveform segments.

use crate::error::{ClarionError, Result};

/// Equal-length sample segments cut from one waveform, in original order.
///
/// Every segment holds exactly `chunk_samples` values; the final segment is
/// zero-padded up to that length so the whole batch can be stacked into a
/// single model input tensor. Built per request and discarded once the
/// response is produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkBatch {
    segments: Vec<Vec<f32>>,
    chunk_samples: usize,
}

impl ChunkBatch {
    /// Split `samples` into consecutive non-overlapping segments of
    /// `chunk_samples`, zero-padding the final segment.
    ///
    /// The padding step always runs; when the length is an exact multiple
    /// of `chunk_samples` it is a no-op, not skipped.
    ///
    /// # Errors
    /// - `ClarionError::EmptyWaveform` if `samples` is empty. There is no
    ///   segment to pad and the model cannot run on a zero-row batch.
    /// - `ClarionError::Shape` if `chunk_samples` is zero.
    pub fn split(samples: &[f32], chunk_samples: usize) -> Result<Self> {
        if chunk_samples == 0 {
            return Err(ClarionError::Shape("chunk size must be positive".into()));
        }
        if samples.is_empty() {
            return Err(ClarionError::EmptyWaveform);
        }

        let mut segments: Vec<Vec<f32>> =
            samples.chunks(chunk_samples).map(<[f32]>::to_vec).collect();
        if let Some(last) = segments.last_mut() {
            last.resize(chunk_samples, 0.0);
        }

        Ok(Self {
            segments,
            chunk_samples,
        })
    }

    /// Rebuild a batch from per-segment model output.
    ///
    /// # Errors
    /// `ClarionError::Shape` when the batch is empty or any segment does
    /// not hold exactly `chunk_samples` values.
    pub fn from_segments(segments: Vec<Vec<f32>>, chunk_samples: usize) -> Result<Self> {
        if segments.is_empty() {
            return Err(ClarionError::Shape("batch has no segments".into()));
        }
        if let Some(bad) = segments.iter().position(|s| s.len() != chunk_samples) {
            return Err(ClarionError::Shape(format!(
                "segment {bad} has {} samples, expected {chunk_samples}",
                segments[bad].len()
            )));
        }
        Ok(Self {
            segments,
            chunk_samples,
        })
    }

    /// Number of segments: `ceil(source_len / chunk_samples)` at split time.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Fixed per-segment sample count.
    pub fn chunk_samples(&self) -> usize {
        self.chunk_samples
    }

    /// Total sample count across all segments, padding included.
    pub fn padded_len(&self) -> usize {
        self.segments.len() * self.chunk_samples
    }

    pub fn segments(&self) -> &[Vec<f32>] {
        &self.segments
    }

    /// Concatenate all segments, in order, into one flat sample sequence.
    ///
    /// The zero-padded tail of the final segment is kept; the output is
    /// always `padded_len()` samples, not the original waveform length.
    pub fn flatten(self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.padded_len());
        for segment in &self.segments {
            out.extend_from_slice(segment);
        }
        out
    }
}
