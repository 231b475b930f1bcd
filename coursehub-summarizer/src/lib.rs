//! Summarization Service contract and a client for a Gemini-style
//! `generateContent` HTTP API. Callers only see "text in, summary out";
//! any failure surfaces as a generic "summarization unavailable" condition
//! at the API boundary.

pub mod error;

use async_trait::async_trait;
use coursehub_config::SummarizerConfig;
pub use error::SummarizerError;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, text: &str) -> Result<String, SummarizerError>;
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Content,
}

pub struct GenerativeSummarizer {
    http: reqwest::Client,
    config: SummarizerConfig,
}

impl GenerativeSummarizer {
    #[must_use]
    pub fn new(config: SummarizerConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }
}

#[async_trait]
impl Summarizer for GenerativeSummarizer {
    async fn summarize(&self, text: &str) -> Result<String, SummarizerError> {
        let prompt = format!(
            "Please provide a comprehensive summary of the following educational content. Focus \
             on key concepts, main points, and important details that students should \
             understand:\n\n{text}"
        );
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.config.endpoint, self.config.model, self.config.api_key
        );
        let response = self
            .http
            .post(&url)
            .json(&GenerateRequest {
                contents: vec![Content {
                    parts: vec![Part { text: prompt }],
                }],
            })
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(SummarizerError::Status(response.status().as_u16()));
        }
        let body: GenerateResponse = response.json().await?;
        let summary = body
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text)
            .ok_or(SummarizerError::EmptyResponse)?;
        debug!(length = summary.len(), "generated summary");
        Ok(summary)
    }
}

/// Stand-in used when no API key is configured; every call reports the
/// service as unavailable instead of failing server startup.
pub struct UnconfiguredSummarizer;

#[async_trait]
impl Summarizer for UnconfiguredSummarizer {
    async fn summarize(&self, _text: &str) -> Result<String, SummarizerError> {
        Err(SummarizerError::NotConfigured)
    }
}
