//! `PassthroughModel` — identity backend used when no weights are present.
//!
//! Keeps the whole upload → chunk → predict → encode path exercisable
//! end-to-end without the ONNX runtime, and is what the tests run against.

use tracing::debug;

use crate::chunking::batch::ChunkBatch;
use crate::error::Result;
use crate::inference::DenoiseModel;

/// Identity model: every output segment equals its input segment.
pub struct PassthroughModel;

impl PassthroughModel {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PassthroughModel {
    fn default() -> Self {
        Self::new()
    }
}

impl DenoiseModel for PassthroughModel {
    fn warm_up(&mut self) -> Result<()> {
        debug!("PassthroughModel::warm_up — no-op");
        Ok(())
    }

    fn denoise(&mut self, batch: &ChunkBatch) -> Result<ChunkBatch> {
        debug!(segments = batch.len(), "passthrough inference");
        Ok(batch.clone())
    }
}
