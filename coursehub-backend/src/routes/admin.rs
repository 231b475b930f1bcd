//! Administrative reporting and account management; every route requires the
//! admin role.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use coursehub_domain::{
    Admin, Course, Lecturer, NewLecturer, NewStudent, Student, SystemStats,
};

use crate::error::AppError;
use crate::extract::Caller;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stats", get(stats))
        .route("/students", get(students).post(create_student))
        .route("/lecturers", get(lecturers).post(create_lecturer))
        .route("/admins", post(create_admin))
        .route("/courses", get(courses))
        .route("/users/:id", delete(delete_user))
}

async fn stats(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<SystemStats>, AppError> {
    caller.admin()?;
    Ok(Json(state.accounts.stats().await?))
}

async fn students(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Vec<Student>>, AppError> {
    caller.admin()?;
    Ok(Json(state.accounts.list_students().await?))
}

async fn lecturers(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Vec<Lecturer>>, AppError> {
    caller.admin()?;
    Ok(Json(state.accounts.list_lecturers().await?))
}

async fn courses(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Vec<Course>>, AppError> {
    caller.admin()?;
    Ok(Json(state.courses.all().await?))
}

async fn create_student(
    State(state): State<AppState>,
    caller: Caller,
    Json(data): Json<NewStudent>,
) -> Result<(StatusCode, Json<Student>), AppError> {
    caller.admin()?;
    let student = state.accounts.register_student(data).await?;
    Ok((StatusCode::CREATED, Json(student)))
}

async fn create_lecturer(
    State(state): State<AppState>,
    caller: Caller,
    Json(data): Json<NewLecturer>,
) -> Result<(StatusCode, Json<Lecturer>), AppError> {
    caller.admin()?;
    let lecturer = state.accounts.register_lecturer(data).await?;
    Ok((StatusCode::CREATED, Json(lecturer)))
}

async fn create_admin(
    State(state): State<AppState>,
    caller: Caller,
    Json(data): Json<NewLecturer>,
) -> Result<(StatusCode, Json<Admin>), AppError> {
    caller.admin()?;
    let admin = state.accounts.register_admin(data).await?;
    Ok((StatusCode::CREATED, Json(admin)))
}

async fn delete_user(
    State(state): State<AppState>,
    caller: Caller,
    Path(user_id): Path<String>,
) -> Result<StatusCode, AppError> {
    caller.admin()?;
    state.accounts.delete_user(&user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
