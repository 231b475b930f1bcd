//! Course material uploads and blob handling. Uploads are binary bodies, not
//! multipart: the filename travels as a query parameter, the content type as
//! the request header.

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use bytes::Bytes;
use chrono::Utc;
use coursehub_domain::{CourseFile, User};
use coursehub_store::DeleteOutcome;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::error::AppError;
use crate::extract::{Authenticated, Caller};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct UploadQuery {
    filename: Option<String>,
}

pub async fn upload(
    State(state): State<AppState>,
    caller: Caller,
    Path(course_id): Path<String>,
    Query(query): Query<UploadQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<CourseFile>), AppError> {
    let lecturer = caller.lecturer()?;
    let course = state.courses.get(&course_id).await?;
    if course.lecturer_id != lecturer.id {
        return Err(AppError::Forbidden(
            "only the course owner can upload materials".to_owned(),
        ));
    }
    let filename = query
        .filename
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("filename query parameter is required".to_owned()))?;
    if body.is_empty() {
        return Err(AppError::BadRequest(
            "upload body must not be empty".to_owned(),
        ));
    }
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_owned();

    // timestamp prefix keeps repeated uploads of the same filename distinct
    let file_id = format!("{}_{}", Utc::now().timestamp_millis(), filename);
    let size = u64::try_from(body.len()).unwrap_or(u64::MAX);
    let url = state
        .blobs
        .put(&format!("courses/{course_id}/materials/{file_id}"), body)
        .await?;
    let file = CourseFile {
        id: file_id,
        name: filename,
        url,
        size,
        uploaded_at: Utc::now(),
        content_type,
    };
    state.courses.add_file(&course_id, &file).await?;
    info!(course_id, file_id = %file.id, size, "stored course material");
    Ok((StatusCode::CREATED, Json(file)))
}

pub async fn remove(
    State(state): State<AppState>,
    caller: Caller,
    Path((course_id, file_id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    let course = state.courses.get(&course_id).await?;
    match &caller.0 {
        User::Admin(_) => {}
        User::Lecturer(lecturer) if lecturer.id == course.lecturer_id => {}
        _ => {
            return Err(AppError::Forbidden(
                "only the course owner can remove materials".to_owned(),
            ))
        }
    }
    state.courses.remove_file(&course_id, &file_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct DeleteBlobRequest {
    url: String,
}

/// Thin blob deletion by url. Deleting an already-absent blob is success.
pub async fn delete_blob(
    State(state): State<AppState>,
    _auth: Authenticated,
    Json(data): Json<DeleteBlobRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let outcome = state.blobs.delete(&data.url).await?;
    Ok(Json(
        json!({ "deleted": matches!(outcome, DeleteOutcome::Deleted) }),
    ))
}

/// Serves blob content back out for the urls the filesystem store issues.
pub async fn serve(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Response, AppError> {
    let content = state
        .blobs
        .get(&format!("/blobs/{path}"))
        .await?
        .ok_or(AppError::NotFound("blob"))?;
    Ok((
        [(header::CONTENT_TYPE, "application/octet-stream")],
        content,
    )
        .into_response())
}
