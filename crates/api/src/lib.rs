//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - Submission, lookup and download routes
//! - Error responses
//! - Request size limits

pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use hashdrop_core::storage::StorageService;
use hashdrop_core::submission::{SubmissionLimits, SubmissionService};
use hashdrop_db::SubmissionRepository;
use hashdrop_shared::{ServerConfig, UploadConfig};
use sea_orm::DatabaseConnection;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

/// Submission service wired to Postgres and OpenDAL.
pub type Submissions = SubmissionService<SubmissionRepository, StorageService>;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Submission service.
    pub submissions: Arc<Submissions>,
    /// Public base URL used for redirect links.
    pub base_url: Arc<str>,
    /// Maximum request body size in bytes.
    pub max_upload_size: usize,
}

impl AppState {
    /// Build the state from a database connection and storage service.
    #[must_use]
    pub fn new(
        db: DatabaseConnection,
        storage: Arc<StorageService>,
        server: &ServerConfig,
        upload: &UploadConfig,
    ) -> Self {
        let repo = Arc::new(SubmissionRepository::new(db));
        let submissions =
            SubmissionService::new(repo, storage).with_limits(SubmissionLimits::from(upload));

        Self {
            submissions: Arc::new(submissions),
            base_url: Arc::from(server.base_url.trim_end_matches('/')),
            max_upload_size: upload.max_upload_size,
        }
    }

    /// Public link to a submission.
    #[must_use]
    pub fn link(&self, id: &str) -> String {
        format!("{}/{id}", self.base_url)
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.max_upload_size;

    Router::new()
        .merge(routes::api_routes())
        .fallback(routes::not_found)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
