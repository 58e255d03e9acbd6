//! # clarion-core
//!
//! Reusable audio denoising engine.
//!
//! ## Architecture
//!
//! ```text
//! upload.mp3 → loader (symphonia + rubato) → Waveform (48 kHz mono f32)
//!                                                │
//!                                     ChunkBatch::split (10 s segments,
//!                                     final segment zero-padded)
//!                                                │
//!                                     DenoiseModel::denoise (batched)
//!                                                │
//!                                     ChunkBatch::flatten → WAV (hound)
//! ```
//!
//! The model is loaded once via `DenoiseEngine::warm_up` and shared across
//! requests; per-file work is blocking and belongs in `spawn_blocking`.

#![forbid(unsafe_code)]
#![warn(clippy::all)]

pub mod audio;
pub mod chunking;
pub mod engine;
pub mod error;
pub mod inference;

// Convenience re-exports for downstream crates
pub use audio::Waveform;
pub use chunking::batch::ChunkBatch;
pub use engine::{DenoiseEngine, EngineConfig};
pub use error::ClarionError;
pub use inference::{DenoiseModel, ModelHandle};

#[cfg(feature = "onnx")]
pub use inference::{OnnxDenoiser, OnnxDenoiserConfig};
