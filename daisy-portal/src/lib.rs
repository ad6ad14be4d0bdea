//! daisy-portal library
//!
//! HTTP API of the student portfolio portal: profile lookup, attachment
//! galleries, uploads to the media host and biography edits.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use daisy_common::db::{AttachmentStore, BiographyStore};
use daisy_common::RosterStore;
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use crate::services::{MediaHost, UploadOrchestrator};

/// Maximum accepted request body (multipart uploads included)
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Read-only roster snapshot loaded at startup
    pub roster: Arc<RosterStore>,
    pub attachments: AttachmentStore,
    pub biographies: BiographyStore,
    pub uploads: Arc<UploadOrchestrator>,
}

impl AppState {
    pub fn new(db: SqlitePool, roster: Arc<RosterStore>, media: Arc<dyn MediaHost>) -> Self {
        let attachments = AttachmentStore::new(db.clone());
        let uploads = Arc::new(UploadOrchestrator::new(
            roster.clone(),
            attachments.clone(),
            media,
        ));

        Self {
            roster,
            attachments,
            biographies: BiographyStore::new(db),
            uploads,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::student_routes())
        .merge(api::attachment_routes())
        .merge(api::biography_routes())
        .merge(api::department_routes())
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
