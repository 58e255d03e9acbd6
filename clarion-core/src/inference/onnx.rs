//! ONNX denoiser backend via the `ort` crate.
//!
//! Targets a single-input single-output export:
//! - input  `[batch, 480000, 1]` f32, mono 48 kHz segments
//! - output the same shape, cleaned samples
//!
//! Input/output tensor names vary between exporters, so both are resolved
//! from the graph at warm-up; `OnnxDenoiserConfig` can override them for
//! unusual exports.

use std::path::{Path, PathBuf};

use ndarray::Array3;
use ort::ep;
use ort::session::builder::{GraphOptimizationLevel, SessionBuilder};
use ort::session::{Session, SessionInputValue};
use ort::value::Value;
use tracing::{debug, info};

use crate::chunking::{batch::ChunkBatch, CHUNK_SAMPLES};
use crate::error::{ClarionError, Result};
use crate::inference::DenoiseModel;

// ── Model config ─────────────────────────────────────────────────────────────

pub struct OnnxDenoiserConfig {
    pub model_path: PathBuf,
    /// Override for the graph input name; `None` resolves the first input.
    pub input_name: Option<String>,
    /// Override for the graph output name; `None` resolves the first output.
    pub output_name: Option<String>,
    /// Per-segment sample count the model was exported for.
    pub chunk_samples: usize,
}

impl OnnxDenoiserConfig {
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            input_name: None,
            output_name: None,
            chunk_samples: CHUNK_SAMPLES,
        }
    }
}

fn create_session(model_path: &Path) -> Result<Session> {
    let logical_cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4);
    let intra_threads = std::env::var("CLARION_ORT_INTRA_THREADS")
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or_else(|| logical_cores.clamp(2, 12))
        .clamp(1, 32);

    let builder = SessionBuilder::new()
        .map_err(|e| ClarionError::OnnxSession(e.to_string()))?
        .with_intra_threads(intra_threads)
        .map_err(|e| ClarionError::OnnxSession(e.to_string()))?
        .with_optimization_level(GraphOptimizationLevel::All)
        .map_err(|e| ClarionError::OnnxSession(e.to_string()))?
        .with_execution_providers([ep::CPU::default().build()])
        .map_err(|e| ClarionError::OnnxSession(e.to_string()))?;
    info!(intra_threads, logical_cores, "ONNX session threading configured");

    builder
        .commit_from_file(model_path)
        .map_err(|e| ClarionError::OnnxSession(e.to_string()))
}

// ── OnnxDenoiser ─────────────────────────────────────────────────────────────

pub struct OnnxDenoiser {
    config: OnnxDenoiserConfig,
    session: Option<Session>,
    input_name: String,
    output_name: String,
}

impl OnnxDenoiser {
    pub fn new(config: OnnxDenoiserConfig) -> Self {
        Self {
            config,
            session: None,
            input_name: String::new(),
            output_name: String::new(),
        }
    }

    /// Run one batched forward pass, returning the flat output samples.
    fn run_batch(
        session: &mut Session,
        input_name: &str,
        output_name: &str,
        batch: &ChunkBatch,
    ) -> Result<Vec<f32>> {
        let rows = batch.len();
        let chunk = batch.chunk_samples();

        let mut flat = Vec::with_capacity(rows * chunk);
        for segment in batch.segments() {
            flat.extend_from_slice(segment);
        }
        let input = Array3::from_shape_vec((rows, chunk, 1), flat)
            .map_err(|e| ClarionError::Inference(format!("building input tensor: {e}")))?;
        let value = Value::from_array(input)
            .map_err(|e: ort::Error| ClarionError::OnnxSession(e.to_string()))?;

        let inputs: Vec<(String, SessionInputValue<'_>)> =
            vec![(input_name.to_string(), SessionInputValue::from(value))];
        let outputs = session
            .run(inputs)
            .map_err(|e| ClarionError::Inference(e.to_string()))?;

        let (_shape, data) = outputs[output_name]
            .try_extract_tensor::<f32>()
            .map_err(|e| ClarionError::Inference(e.to_string()))?;
        Ok(data.to_vec())
    }
}

impl DenoiseModel for OnnxDenoiser {
    fn warm_up(&mut self) -> Result<()> {
        let path = &self.config.model_path;
        if !path.exists() {
            return Err(ClarionError::ModelNotFound { path: path.clone() });
        }
        let size_mb = std::fs::metadata(path)
            .map(|m| m.len() as f64 / 1_048_576.0)
            .unwrap_or(0.0);
        info!("loading denoiser model from {:?} ({:.2} MB)", path, size_mb);

        let mut session = create_session(path)?;

        let first_input = session
            .inputs()
            .first()
            .map(|i| i.name().to_string())
            .ok_or_else(|| ClarionError::OnnxSession("model graph has no inputs".into()))?;
        let first_output = session
            .outputs()
            .first()
            .map(|o| o.name().to_string())
            .ok_or_else(|| ClarionError::OnnxSession("model graph has no outputs".into()))?;
        self.input_name = self.config.input_name.clone().unwrap_or(first_input);
        self.output_name = self.config.output_name.clone().unwrap_or(first_output);
        info!(
            input = %self.input_name,
            output = %self.output_name,
            "resolved model tensor names"
        );

        // Dummy forward pass so the first request does not pay one-time
        // allocation and graph-optimisation costs.
        let silence = vec![0.0f32; self.config.chunk_samples];
        let dummy = ChunkBatch::split(&silence, self.config.chunk_samples)?;
        Self::run_batch(&mut session, &self.input_name, &self.output_name, &dummy)?;

        self.session = Some(session);
        info!("denoiser warm-up complete");
        Ok(())
    }

    fn denoise(&mut self, batch: &ChunkBatch) -> Result<ChunkBatch> {
        let Some(session) = self.session.as_mut() else {
            return Err(ClarionError::OnnxSession(
                "model not loaded — call warm_up()".into(),
            ));
        };

        let rows = batch.len();
        let chunk = batch.chunk_samples();
        let data = Self::run_batch(session, &self.input_name, &self.output_name, batch)?;

        if data.len() != rows * chunk {
            return Err(ClarionError::Inference(format!(
                "model returned {} samples for a {rows}x{chunk} input",
                data.len()
            )));
        }
        debug!(segments = rows, "inference complete");

        ChunkBatch::from_segments(
            data.chunks_exact(chunk).map(<[f32]>::to_vec).collect(),
            chunk,
        )
    }
}
