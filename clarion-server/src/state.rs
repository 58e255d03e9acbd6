//! Shared request-handler state.
//!
//! `AppState` is cloned into every handler by axum's `State` extractor;
//! all fields are shared references.

use std::sync::Arc;

use clarion_core::DenoiseEngine;

use crate::storage::UploadStore;

#[derive(Clone)]
pub struct AppState {
    /// The core engine, model loaded once at startup.
    pub engine: Arc<DenoiseEngine>,
    /// Upload root, created at startup.
    pub store: Arc<UploadStore>,
}
