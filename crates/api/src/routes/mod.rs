//! API route definitions.

use axum::Router;
use axum::response::IntoResponse;
use hashdrop_shared::AppError;

use crate::AppState;
use crate::error::ApiError;

pub mod health;
pub mod submissions;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(submissions::routes())
}

/// Response for any path no route matches.
pub async fn not_found() -> impl IntoResponse {
    ApiError(AppError::NotFound("page not found".to_string()))
}
