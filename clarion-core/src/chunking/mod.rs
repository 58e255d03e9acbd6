//! Fixed-size chunking of decoded waveforms for batched inference.

pub mod batch;

/// Samples per model segment: 10 seconds of audio at 48 kHz.
pub const CHUNK_SAMPLES: usize = 480_000;
