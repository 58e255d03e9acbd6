//! Clarion denoising service entry point.
//!
//! ## Startup order
//!
//! 1. Tracing subscriber (env-filtered, default `clarion=info`)
//! 2. Settings (JSON file, defaults when absent)
//! 3. Upload store root created
//! 4. Model selected (ONNX weights if present, passthrough otherwise)
//!    and warmed up exactly once
//! 5. Router built, server bound and served
//!
//! The model never reloads per request: the warmed handle is shared
//! through `AppState` and requests serialise on its mutex.

mod routes;
mod settings;
mod state;
mod storage;

use std::sync::Arc;

use anyhow::Context;
use clarion_core::inference::stub::PassthroughModel;
use clarion_core::{DenoiseEngine, EngineConfig, ModelHandle, OnnxDenoiser, OnnxDenoiserConfig};
use tracing::{info, warn};

use crate::settings::{default_settings_path, load_settings};
use crate::state::AppState;
use crate::storage::UploadStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── Tracing ───────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clarion=info".parse().unwrap()),
        )
        .init();

    info!("Clarion starting");

    let settings_path = default_settings_path();
    let settings = load_settings(&settings_path);
    info!(
        settings_path = ?settings_path,
        bind_addr = %settings.bind_addr,
        upload_dir = ?settings.upload_dir,
        model_path = ?settings.model_path,
        allowed_origins = ?settings.allowed_origins,
        max_upload_bytes = settings.max_upload_bytes,
        "runtime settings loaded"
    );

    // ── Storage ───────────────────────────────────────────────────────────
    let store = Arc::new(UploadStore::new(&settings.upload_dir));
    store
        .ensure_root()
        .with_context(|| format!("creating upload dir {:?}", settings.upload_dir))?;

    // ── Engine setup ──────────────────────────────────────────────────────
    let model = if settings.model_path.exists() {
        info!("loading OnnxDenoiser from {:?}", settings.model_path);
        ModelHandle::new(OnnxDenoiser::new(OnnxDenoiserConfig::new(
            &settings.model_path,
        )))
    } else {
        warn!(
            "denoiser weights not found at {:?} — using PassthroughModel",
            settings.model_path
        );
        ModelHandle::new(PassthroughModel::new())
    };

    let engine = Arc::new(DenoiseEngine::new(EngineConfig::default(), model));
    // A corrupt weights file should fail startup, not every request.
    engine.warm_up().context("model warm-up failed")?;

    // ── HTTP server ───────────────────────────────────────────────────────
    let app = routes::router(AppState { engine, store }, &settings);

    let listener = tokio::net::TcpListener::bind(&settings.bind_addr)
        .await
        .with_context(|| format!("binding {}", settings.bind_addr))?;
    info!(addr = %settings.bind_addr, "listening");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
