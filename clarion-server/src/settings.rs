//! Server settings (JSON file next to the binary, defaults when absent).

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct ServerSettings {
    /// Socket address the HTTP server binds to.
    pub bind_addr: String,
    /// Flat directory holding raw uploads and cleaned outputs.
    pub upload_dir: PathBuf,
    /// Path to the pretrained denoiser weights (ONNX).
    pub model_path: PathBuf,
    /// CORS allow-list; `"*"` permits any origin.
    pub allowed_origins: Vec<String>,
    /// Upper bound on accepted request bodies, in bytes.
    pub max_upload_bytes: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8000".into(),
            upload_dir: PathBuf::from("uploads"),
            model_path: PathBuf::from("models/denoiser.onnx"),
            allowed_origins: vec!["*".into()],
            max_upload_bytes: 100 * 1024 * 1024,
        }
    }
}

impl ServerSettings {
    pub fn normalize(&mut self) {
        if self.bind_addr.trim().is_empty() {
            self.bind_addr = Self::default().bind_addr;
        }
        self.allowed_origins.retain(|o| !o.trim().is_empty());
        if self.allowed_origins.is_empty() {
            self.allowed_origins.push("*".into());
        }
        self.max_upload_bytes = self.max_upload_bytes.clamp(1024 * 1024, 4 * 1024 * 1024 * 1024);
    }
}

/// Absolute or working-directory-relative path to the settings file.
pub fn default_settings_path() -> PathBuf {
    std::env::var_os("CLARION_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("clarion.json"))
}

/// Load settings from `path`, falling back to defaults when the file is
/// missing or unparseable. The result is always normalized.
pub fn load_settings(path: &Path) -> ServerSettings {
    let mut settings = match fs::read_to_string(path) {
        Ok(raw) => match serde_json::from_str::<ServerSettings>(&raw) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("failed to parse settings at {:?}: {e} — using defaults", path);
                ServerSettings::default()
            }
        },
        Err(_) => ServerSettings::default(),
    };
    settings.normalize();
    settings
}
