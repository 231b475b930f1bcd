use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use coursehub_domain::{ClassLevel, Course, CourseStudent, Quiz, User};
use serde::Deserialize;

use crate::error::AppError;
use crate::extract::{Authenticated, Caller};
use crate::routes::files;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/mine", get(mine))
        .route("/:id", get(get_course).delete(delete_course))
        .route("/:id/students", get(students))
        .route("/:id/quizzes", get(course_quizzes))
        .route("/:id/files", post(files::upload))
        .route("/:id/files/:file_id", delete(files::remove))
}

#[derive(Deserialize)]
struct ListQuery {
    class: Option<String>,
}

/// Available courses. Students see their class's courses by default; an
/// explicit `class` query narrows for any caller, its absence means "all"
/// for lecturers and admins.
async fn list(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Course>>, AppError> {
    let class: Option<ClassLevel> = match (query.class, &caller.0) {
        (Some(raw), _) => Some(raw.parse().map_err(AppError::BadRequest)?),
        (None, User::Student(student)) => Some(student.class),
        (None, _) => None,
    };
    let courses = match class {
        Some(class) => state.courses.available_for_class(class).await?,
        None => state.courses.all().await?,
    };
    Ok(Json(courses))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateCourse {
    title: String,
    required_class: ClassLevel,
}

async fn create(
    State(state): State<AppState>,
    caller: Caller,
    Json(data): Json<CreateCourse>,
) -> Result<(StatusCode, Json<Course>), AppError> {
    let lecturer = caller.lecturer()?;
    let course = state
        .courses
        .create(
            &data.title,
            &lecturer.id,
            &lecturer.full_name,
            data.required_class,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(course)))
}

async fn mine(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<Vec<Course>>, AppError> {
    let lecturer = caller.lecturer()?;
    Ok(Json(state.courses.for_lecturer(&lecturer.id).await?))
}

async fn get_course(
    State(state): State<AppState>,
    _auth: Authenticated,
    Path(course_id): Path<String>,
) -> Result<Json<Course>, AppError> {
    Ok(Json(state.courses.get(&course_id).await?))
}

async fn delete_course(
    State(state): State<AppState>,
    caller: Caller,
    Path(course_id): Path<String>,
) -> Result<StatusCode, AppError> {
    caller.admin()?;
    state.courses.delete(&course_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Approved students of a course; visible only to its owning lecturer.
async fn students(
    State(state): State<AppState>,
    caller: Caller,
    Path(course_id): Path<String>,
) -> Result<Json<Vec<CourseStudent>>, AppError> {
    let lecturer = caller.lecturer()?;
    let course = state.courses.get(&course_id).await?;
    if course.lecturer_id != lecturer.id {
        return Err(AppError::Forbidden(
            "only the course owner can list its students".to_owned(),
        ));
    }
    Ok(Json(state.enrollments.approved_for_course(&course_id).await?))
}

async fn course_quizzes(
    State(state): State<AppState>,
    _auth: Authenticated,
    Path(course_id): Path<String>,
) -> Result<Json<Vec<Quiz>>, AppError> {
    Ok(Json(state.quizzes.for_course(&course_id).await?))
}
