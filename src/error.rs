//! Error types for the PulseCheck engine

use thiserror::Error;

/// Errors that can occur while selecting questions, recording responses,
/// or computing risk.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Answer value {value} for question '{question_id}' is outside 1..=5")]
    InvalidAnswer { question_id: String, value: u8 },

    #[error("Question '{0}' is not part of today's selection")]
    UnknownQuestion(String),

    #[error("Question pool is empty")]
    EmptyPool,

    #[error("Insufficient data for computation: {0}")]
    InsufficientData(String),

    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Date parse error: {0}")]
    DateParseError(String),
}