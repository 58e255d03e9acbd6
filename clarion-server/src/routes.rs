//! HTTP surface: the health probe and the upload → denoise → download flow.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use clarion_core::ClarionError;
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::settings::ServerSettings;
use crate::state::AppState;

pub fn router(state: AppState, settings: &ServerSettings) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/upload", post(upload))
        .layer(DefaultBodyLimit::max(settings.max_upload_bytes))
        .layer(cors_layer(&settings.allowed_origins))
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.iter().any(|o| o == "*") {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

/// Liveness probe. Always healthy, no side effects, independent of model
/// or storage state.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}

/// Accept a multipart upload, run it through the engine, return the
/// cleaned WAV.
async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut upload: Option<(String, Bytes)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ClarionError::Upload(format!("reading multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field
            .file_name()
            .map(str::to_owned)
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| "upload.bin".to_owned());
        let data = field
            .bytes()
            .await
            .map_err(|e| ClarionError::Upload(format!("reading field `file`: {e}")))?;
        upload = Some((filename, data));
        break;
    }
    let Some((filename, data)) = upload else {
        return Err(ClarionError::Upload("missing multipart field `file`".into()).into());
    };

    info!(filename = %filename, bytes = data.len(), "upload received");
    let input_path = state.store.save(&filename, &data)?;
    let output_path = state.store.cleaned_output_path(&input_path);

    // Decode, inference and encode are all blocking; keep them off the
    // async executor. Concurrent requests serialise on the model mutex.
    let engine = Arc::clone(&state.engine);
    let task_input = input_path.clone();
    let task_output = output_path.clone();
    tokio::task::spawn_blocking(move || engine.clean_file(&task_input, &task_output))
        .await
        .map_err(|e| ClarionError::Inference(format!("denoise task failed: {e}")))??;

    let cleaned = tokio::fs::read(&output_path).await.map_err(ClarionError::Io)?;
    let download_name = output_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("clean.wav");
    let disposition = HeaderValue::try_from(format!("attachment; filename=\"{download_name}\""))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("audio/wav")),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        cleaned,
    )
        .into_response())
}

/// Maps core errors onto HTTP statuses. A failed request never returns a
/// 200 with a malformed audio body.
#[derive(Debug)]
pub struct ApiError(pub ClarionError);

impl From<ClarionError> for ApiError {
    fn from(e: ClarionError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            ClarionError::Upload(_) => StatusCode::BAD_REQUEST,
            ClarionError::Decode(_) | ClarionError::EmptyWaveform | ClarionError::Shape(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        warn!(status = %status, error = %self.0, "request failed");
        (
            status,
            Json(serde_json::json!({ "error": self.0.to_string() })),
        )
            .into_response()
    }
}
