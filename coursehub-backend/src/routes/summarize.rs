use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use crate::error::AppError;
use crate::extract::Authenticated;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SummarizeRequest {
    #[serde(default)]
    text: String,
}

pub async fn summarize(
    State(state): State<AppState>,
    _auth: Authenticated,
    Json(data): Json<SummarizeRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    if data.text.trim().is_empty() {
        return Err(AppError::BadRequest("text must not be empty".to_owned()));
    }
    let summary = state.summarizer.summarize(&data.text).await?;
    Ok(Json(json!({ "summary": summary })))
}
