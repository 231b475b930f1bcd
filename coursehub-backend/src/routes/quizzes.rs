use std::collections::HashMap;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::post;
use axum::Router;
use coursehub_domain::{NewQuestion, Quiz, QuizResult, User};
use serde::Deserialize;

use crate::error::AppError;
use crate::extract::Caller;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create))
        .route("/:id/submissions", post(submit))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateQuiz {
    course_id: String,
    title: String,
    questions: Vec<NewQuestion>,
}

async fn create(
    State(state): State<AppState>,
    caller: Caller,
    Json(data): Json<CreateQuiz>,
) -> Result<(StatusCode, Json<Quiz>), AppError> {
    let lecturer = caller.lecturer()?;
    let course = state.courses.get(&data.course_id).await?;
    if course.lecturer_id != lecturer.id {
        return Err(AppError::Forbidden(
            "only the course owner can create quizzes".to_owned(),
        ));
    }
    let quiz = state
        .quizzes
        .create(&data.course_id, &data.title, data.questions)
        .await?;
    Ok((StatusCode::CREATED, Json(quiz)))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Submission {
    course_id: String,
    answers: HashMap<String, String>,
}

async fn submit(
    State(state): State<AppState>,
    caller: Caller,
    Path(quiz_id): Path<String>,
    Json(data): Json<Submission>,
) -> Result<(StatusCode, Json<QuizResult>), AppError> {
    let student = caller.student()?;
    let result = state
        .quizzes
        .submit(&student.id, &quiz_id, &data.course_id, data.answers)
        .await?;
    Ok((StatusCode::CREATED, Json(result)))
}

/// Role-dispatched results view: students see their own attempts, lecturers
/// the fan-out across their courses.
pub async fn results(
    State(state): State<AppState>,
    Caller(user): Caller,
) -> Result<Response, AppError> {
    match user {
        User::Student(student) => Ok(Json(
            state.quizzes.results_for_student(&student.id).await?,
        )
        .into_response()),
        User::Lecturer(lecturer) => Ok(Json(
            state.quizzes.results_for_lecturer(&lecturer.id).await?,
        )
        .into_response()),
        User::Admin(_) => Err(AppError::Forbidden(
            "results are scoped to students and lecturers".to_owned(),
        )),
    }
}
