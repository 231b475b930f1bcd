//! JSON API surface under `/api`. Each submodule owns one resource; routes
//! that span resources (`/results`, `/blobs`, `/summarize`) are registered
//! here directly.

pub mod admin;
pub mod auth;
pub mod courses;
pub mod enrollments;
pub mod files;
pub mod quizzes;
pub mod summarize;

use axum::routing::{delete, get, post};
use axum::Router;

use crate::state::AppState;

pub fn api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/courses", courses::router())
        .nest("/enrollments", enrollments::router())
        .nest("/quizzes", quizzes::router())
        .nest("/admin", admin::router())
        .route("/results", get(quizzes::results))
        .route("/blobs", delete(files::delete_blob))
        .route("/summarize", post(summarize::summarize))
}
