use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use coursehub_domain::{
    Enrollment, EnrollmentStatus, PendingEnrollment, StudentEnrollment,
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::extract::{Authenticated, Caller};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(request))
        .route("/status", get(status))
        .route("/mine", get(mine))
        .route("/pending", get(pending))
        .route("/:id/approve", post(approve))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnrollRequest {
    course_id: String,
}

async fn request(
    State(state): State<AppState>,
    auth: Authenticated,
    Json(data): Json<EnrollRequest>,
) -> Result<(StatusCode, Json<Enrollment>), AppError> {
    let enrollment = state
        .enrollments
        .request(&auth.user_id, &data.course_id)
        .await?;
    Ok((StatusCode::CREATED, Json(enrollment)))
}

#[derive(Deserialize)]
struct StatusQuery {
    course_id: String,
}

#[derive(Serialize)]
struct StatusResponse {
    status: EnrollmentStatus,
    enrollment: Option<Enrollment>,
}

async fn status(
    State(state): State<AppState>,
    auth: Authenticated,
    Query(query): Query<StatusQuery>,
) -> Result<Json<StatusResponse>, AppError> {
    let enrollment = state
        .enrollments
        .status(&auth.user_id, &query.course_id)
        .await?;
    Ok(Json(StatusResponse {
        status: EnrollmentStatus::of(enrollment.as_ref()),
        enrollment,
    }))
}

async fn mine(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Vec<StudentEnrollment>>, AppError> {
    let student = caller.student()?;
    Ok(Json(state.enrollments.for_student(&student.id).await?))
}

async fn pending(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Vec<PendingEnrollment>>, AppError> {
    let lecturer = caller.lecturer()?;
    Ok(Json(
        state.enrollments.pending_for_lecturer(&lecturer.id).await?,
    ))
}

async fn approve(
    State(state): State<AppState>,
    caller: Caller,
    Path(enrollment_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let lecturer = caller.lecturer()?;
    state
        .enrollments
        .approve(&lecturer.id, &enrollment_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
