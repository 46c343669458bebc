//! Error handling and custom error types
//!
//! Provides unified error handling across the application using thiserror.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("AI provider error: {0}")]
    AiProvider(String),

    /// Text step failed; no post is created.
    #[error("Text generation failed: {0}")]
    TextGeneration(#[source] Box<Error>),

    /// Submit attempted without a usable configuration (blank topic).
    #[error("Invalid generation config: {0}")]
    ConfigInvalid(String),

    #[error("Unknown post: {0}")]
    UnknownPost(String),

    /// A response arrived for a request that has since been superseded.
    #[error("Discarded stale response for request {0}")]
    StaleResponse(u64),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] dotenvy::Error),

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

pub type Result<T> = std::result::Result<T, Error>;
