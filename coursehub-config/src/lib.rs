use core::fmt::{Debug, Display};
use std::path::PathBuf;

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::Deserialize;

/// Connection settings for the generative summarization API.
#[derive(Deserialize, Clone)]
pub struct SummarizerConfig {
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

fn default_model() -> String {
    "gemini-1.5-flash".to_owned()
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com".to_owned()
}

#[derive(Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_listen_address")]
    pub listen_address: String,
    #[serde(default = "default_blob_dir")]
    pub blob_dir: PathBuf,
    /// Absent means summarization reports "unavailable" instead of failing startup.
    #[serde(default)]
    pub summarizer: Option<SummarizerConfig>,
}

fn default_listen_address() -> String {
    "0.0.0.0:3000".to_owned()
}

fn default_blob_dir() -> PathBuf {
    PathBuf::from("blobs")
}

#[derive(thiserror::Error)]
pub enum ConfigError {
    #[error("config error: {0}")]
    Figment(#[from] figment::Error),
}

impl Debug for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

pub fn get_config() -> Result<Config, ConfigError> {
    Ok(Figment::new()
        .merge(Toml::file("coursehub.toml"))
        .merge(Env::prefixed("COURSEHUB_").split("__"))
        .extract()?)
}
