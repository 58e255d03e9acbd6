//! Denoising model abstraction.
//!
//! The `DenoiseModel` trait decouples the pipeline from any specific
//! backend (identity passthrough, ONNX session, future GGUF export).
//!
//! `&mut self` on `denoise` intentionally expresses that backends may be
//! stateful (session scratch buffers, cached shapes). All mutation is
//! therefore serialised through `ModelHandle`'s `parking_lot::Mutex`, which
//! is also what serialises inference across concurrent HTTP requests.

pub mod stub;

#[cfg(feature = "onnx")]
pub mod onnx;

#[cfg(feature = "onnx")]
pub use onnx::{OnnxDenoiser, OnnxDenoiserConfig};

use std::sync::Arc;

use parking_lot::Mutex;

use crate::chunking::batch::ChunkBatch;
use crate::error::Result;

/// Contract for denoising backends.
pub trait DenoiseModel: Send + 'static {
    /// One-time warm-up: load weights and run a dummy forward pass so the
    /// first real request does not pay session-construction costs. Called
    /// once at startup, never per request.
    ///
    /// # Errors
    /// Returns an error if model files are missing or corrupt.
    fn warm_up(&mut self) -> Result<()>;

    /// Run inference on a full batch.
    ///
    /// # Returns
    /// One output segment per input segment, with the same per-segment
    /// length, so the caller can flatten the result back into a waveform.
    fn denoise(&mut self, batch: &ChunkBatch) -> Result<ChunkBatch>;
}

/// Thread-safe reference-counted handle to any `DenoiseModel` implementor.
///
/// Uses `parking_lot::Mutex` for non-poisoning behaviour on panic and a
/// faster uncontended lock than `std::sync::Mutex`.
#[derive(Clone)]
pub struct ModelHandle(pub Arc<Mutex<dyn DenoiseModel>>);

impl ModelHandle {
    /// Wrap any `DenoiseModel` in a `ModelHandle`.
    pub fn new<M: DenoiseModel>(model: M) -> Self {
        Self(Arc::new(Mutex::new(model)))
    }
}

impl std::fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelHandle").finish_non_exhaustive()
    }
}
