//! Public protocol structs for the HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::domain::{ContentFormat, Difficulty, LearningStyle};
use crate::error::GenerationError;

/// Generation request as submitted by the UI. The duration arrives as one of
/// the fixed labels; objectives arrive newline-delimited from a textarea.
#[derive(Debug, Deserialize)]
pub struct GenerateIn {
    pub topic: String,
    pub duration: String,
    pub difficulty: Difficulty,
    #[serde(rename = "learningStyle")]
    pub learning_style: LearningStyle,
    #[serde(rename = "contentFormat")]
    pub content_format: ContentFormat,
    #[serde(default)]
    pub prerequisites: Option<String>,
    #[serde(default)]
    pub objectives: Option<String>,
}

/// Error DTO: `kind` is machine-readable so the UI can pick retry behavior
/// and messaging without string-matching the message.
#[derive(Debug, Serialize)]
pub struct ErrorOut {
    pub kind: String,
    pub message: String,
    pub retryable: bool,
}

impl ErrorOut {
    pub fn from_generation_error(e: &GenerationError) -> Self {
        Self { kind: e.kind().to_string(), message: e.to_string(), retryable: e.retryable() }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self { kind: "bad_request".into(), message: message.into(), retryable: false }
    }

    pub fn duplicate_in_flight() -> Self {
        Self {
            kind: "duplicate_in_flight".into(),
            message: "an identical generation request is already in flight".into(),
            retryable: true,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self { kind: "not_found".into(), message: message.into(), retryable: false }
    }
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}
