use thiserror::Error;

/// All errors produced by clarion-core.
#[derive(Debug, Error)]
pub enum ClarionError {
    #[error("upload error: {0}")]
    Upload(String),

    #[error("audio decode error: {0}")]
    Decode(String),

    #[error("cannot chunk an empty waveform")]
    EmptyWaveform,

    #[error("invalid batch shape: {0}")]
    Shape(String),

    #[error("inference error: {0}")]
    Inference(String),

    #[error("audio encode error: {0}")]
    Encode(String),

    #[error("ONNX session error: {0}")]
    OnnxSession(String),

    #[error("model file not found: {path}")]
    ModelNotFound { path: std::path::PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ClarionError>;
