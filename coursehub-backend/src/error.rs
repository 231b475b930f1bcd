use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use coursehub_domain::DomainError;
use coursehub_identity::IdentityError;
use coursehub_store::{BlobError, StoreError};
use coursehub_summarizer::SummarizerError;
use serde_json::json;
use tracing::error;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("summarization unavailable")]
    SummarizationUnavailable,
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("identity error: {0}")]
    Identity(#[from] IdentityError),
    #[error("blob store error: {0}")]
    Blob(#[from] BlobError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("webserver error: {0}")]
    Axum(#[from] axum::Error),
    #[error("unknown error: {0}")]
    Other(#[from] anyhow::Error),
}

impl From<SummarizerError> for AppError {
    fn from(error: SummarizerError) -> Self {
        // the upstream detail is logged, the caller gets a generic condition
        error!(%error, "summarization failed");
        Self::SummarizationUnavailable
    }
}

fn identity_status(error: &IdentityError) -> StatusCode {
    match error {
        IdentityError::Unauthorized => StatusCode::UNAUTHORIZED,
        IdentityError::EmailTaken(_) => StatusCode::BAD_REQUEST,
        IdentityError::Unavailable(_) => StatusCode::BAD_GATEWAY,
    }
}

fn store_status(error: &StoreError) -> StatusCode {
    match error {
        StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
        StoreError::Malformed(_) | StoreError::Corrupt { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        StoreError::Unavailable(_) => StatusCode::BAD_GATEWAY,
    }
}

fn blob_status(error: &BlobError) -> StatusCode {
    match error {
        BlobError::InvalidPath(_) | BlobError::ForeignUrl(_) => StatusCode::BAD_REQUEST,
        BlobError::Io(_) | BlobError::Unavailable(_) => StatusCode::BAD_GATEWAY,
    }
}

fn domain_status(error: &DomainError) -> StatusCode {
    match error {
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::Validation(_) => StatusCode::BAD_REQUEST,
        DomainError::Forbidden(_) => StatusCode::FORBIDDEN,
        DomainError::Identity(error) => identity_status(error),
        DomainError::Store(error) => store_status(error),
        DomainError::Blob(error) => blob_status(error),
    }
}

impl AppError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::SummarizationUnavailable => StatusCode::BAD_GATEWAY,
            Self::Domain(error) => domain_status(error),
            Self::Identity(error) => identity_status(error),
            Self::Blob(error) => blob_status(error),
            Self::Json(_) | Self::Axum(_) | Self::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        if status.is_server_error() {
            error!(%status, error = %self, "request failed");
        }
        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}
