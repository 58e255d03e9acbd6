//! `DenoiseEngine` — the per-request denoising pipeline.
//!
//! ## Pipeline (per file)
//!
//! ```text
//! clean_file(input, output)
//!     1. decode + resample      loader (symphonia + rubato), 48 kHz mono
//!     2. ChunkBatch::split      10 s segments, final segment zero-padded
//!     3. DenoiseModel::denoise  one batched forward pass
//!     4. flatten + encode       hound WAV writer
//! ```
//!
//! The model handle is created once at startup and shared across requests;
//! inference serialises on the handle's mutex. The flattened output keeps
//! the zero-padded tail of the final segment, so a cleaned file's duration
//! is always a whole multiple of the segment length.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use tracing::{debug, info};

use crate::audio::{loader, wav, SAMPLE_RATE};
use crate::chunking::{batch::ChunkBatch, CHUNK_SAMPLES};
use crate::error::Result;
use crate::inference::ModelHandle;

/// Configuration for `DenoiseEngine`.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Pipeline sample rate (Hz). Uploads at other rates are resampled.
    /// Default: 48000.
    pub sample_rate: u32,
    /// Samples per model segment. Default: 480000 (10 s at 48 kHz).
    pub chunk_samples: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: SAMPLE_RATE,
            chunk_samples: CHUNK_SAMPLES,
        }
    }
}

/// Shared engine counters for observability.
#[derive(Debug, Default)]
pub struct EngineDiagnostics {
    pub files_cleaned: AtomicUsize,
    pub failures: AtomicUsize,
}

impl EngineDiagnostics {
    pub fn snapshot(&self) -> DiagnosticsSnapshot {
        DiagnosticsSnapshot {
            files_cleaned: self.files_cleaned.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DiagnosticsSnapshot {
    pub files_cleaned: usize,
    pub failures: usize,
}

/// The top-level engine handle.
///
/// `DenoiseEngine` is `Send + Sync`; wrap it in `Arc` to share between the
/// server state and request handlers.
pub struct DenoiseEngine {
    config: EngineConfig,
    model: ModelHandle,
    diagnostics: EngineDiagnostics,
}

impl DenoiseEngine {
    /// Create a new engine. Does not load the model — call `warm_up()`.
    pub fn new(config: EngineConfig, model: ModelHandle) -> Self {
        Self {
            config,
            model,
            diagnostics: EngineDiagnostics::default(),
        }
    }

    /// Warm up the denoise model (load weights, run a dummy forward pass).
    ///
    /// Call once at startup, before serving requests. Requests never reload
    /// the model from disk.
    pub fn warm_up(&self) -> Result<()> {
        info!("warming up denoise model");
        self.model.0.lock().warm_up()?;
        info!("denoise model ready");
        Ok(())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Decode `input`, run the model, write the cleaned WAV to `output`.
    ///
    /// Blocking (file I/O plus inference); callers on an async runtime
    /// should wrap this in `spawn_blocking`.
    ///
    /// # Errors
    /// Any stage failure aborts the whole request; nothing is written on a
    /// pre-encode failure and no partial result is reported as success.
    pub fn clean_file(&self, input: &Path, output: &Path) -> Result<()> {
        let result = self.clean_file_inner(input, output);
        match &result {
            Ok(()) => {
                self.diagnostics.files_cleaned.fetch_add(1, Ordering::Relaxed);
            }
            Err(_) => {
                self.diagnostics.failures.fetch_add(1, Ordering::Relaxed);
            }
        }
        result
    }

    fn clean_file_inner(&self, input: &Path, output: &Path) -> Result<()> {
        let started = Instant::now();

        let waveform = loader::load_waveform(input, self.config.sample_rate)?;
        debug!(
            samples = waveform.len(),
            duration_secs = waveform.duration_secs(),
            "waveform loaded"
        );

        let batch = ChunkBatch::split(&waveform.samples, self.config.chunk_samples)?;
        let segments = batch.len();

        let cleaned = self.model.0.lock().denoise(&batch)?;
        let flat = cleaned.flatten();

        wav::write_waveform(output, &flat, self.config.sample_rate)?;

        info!(
            input = ?input,
            output = ?output,
            segments,
            out_samples = flat.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "file cleaned"
        );
        Ok(())
    }

    /// Snapshot of engine counters for observability.
    pub fn diagnostics_snapshot(&self) -> DiagnosticsSnapshot {
        self.diagnostics.snapshot()
    }
}
