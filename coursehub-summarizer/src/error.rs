use thiserror::Error;

#[derive(Error, Debug)]
pub enum SummarizerError {
    #[error("summarization is not configured")]
    NotConfigured,
    #[error("summarization request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("summarization service returned status {0}")]
    Status(u16),
    #[error("summarization service returned no usable candidate")]
    EmptyResponse,
}
