//! Application state.
//!
//! Shared state for all request handlers.

use std::sync::Arc;

use canopy_engine::ContentEngine;

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// The content-tree engine.
    pub(crate) engine: Arc<ContentEngine>,
    /// Application version for ETag computation.
    pub(crate) version: String,
}
