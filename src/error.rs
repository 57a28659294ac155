//! Error handling for the skill matcher engine

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SkillMatcherError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Vocabulary error: {0}")]
    Vocabulary(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Unknown user: {0}")]
    UnknownUser(String),

    #[error("Unknown job: {0}")]
    UnknownJob(String),

    #[error("Vector space error: {0}")]
    VectorSpace(String),

    #[error("Alignment error: {0}")]
    Alignment(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, SkillMatcherError>;

/// Convert anyhow errors to our custom error type
impl From<anyhow::Error> for SkillMatcherError {
    fn from(err: anyhow::Error) -> Self {
        SkillMatcherError::Store(err.to_string())
    }
}
