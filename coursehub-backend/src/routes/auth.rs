use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use coursehub_domain::{NewLecturer, NewStudent, User};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::extract::Authenticated;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register/student", post(register_student))
        .route("/register/lecturer", post(register_lecturer))
        .route("/register/admin", post(register_admin))
        .route("/login", post(login))
        .route("/change-password", post(change_password))
}

async fn register_student(
    State(state): State<AppState>,
    Json(data): Json<NewStudent>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let student = state.accounts.register_student(data).await?;
    Ok((StatusCode::CREATED, Json(User::Student(student))))
}

async fn register_lecturer(
    State(state): State<AppState>,
    Json(data): Json<NewLecturer>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let lecturer = state.accounts.register_lecturer(data).await?;
    Ok((StatusCode::CREATED, Json(User::Lecturer(lecturer))))
}

/// First-admin bootstrap for a fresh deployment; 403 once an admin exists.
async fn register_admin(
    State(state): State<AppState>,
    Json(data): Json<NewLecturer>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let admin = state.accounts.register_first_admin(data).await?;
    Ok((StatusCode::CREATED, Json(User::Admin(admin))))
}

#[derive(Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Serialize)]
struct LoginResponse {
    token: String,
    user: User,
}

async fn login(
    State(state): State<AppState>,
    Json(data): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let (token, user) = state.accounts.login(&data.email, &data.password).await?;
    Ok(Json(LoginResponse { token, user }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChangePasswordRequest {
    current_password: String,
    new_password: String,
}

async fn change_password(
    State(state): State<AppState>,
    auth: Authenticated,
    Json(data): Json<ChangePasswordRequest>,
) -> Result<StatusCode, AppError> {
    state
        .accounts
        .change_password(&auth.user_id, &data.current_password, &data.new_password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
