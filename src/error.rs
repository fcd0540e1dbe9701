//! Typed failure taxonomy for the generation pipeline.
//!
//! Callers pick retry policy and user-facing messaging by error kind, never
//! by matching message strings. `Auth` needs a new credential, `Transport`
//! is safe to retry with backoff, `MalformedResponse` and `SchemaValidation`
//! mean the model did not comply and the same prompt may simply be re-sent.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerationError {
  /// Credentials absent or rejected by the provider.
  #[error("authentication failed: {0}")]
  Auth(String),

  /// Network or provider-side failure (timeouts, 5xx, rate limits).
  #[error("transport failure: {0}")]
  Transport(String),

  /// Model output was not valid JSON after fence cleaning.
  #[error("model response is not valid JSON: {0}")]
  MalformedResponse(String),

  /// JSON parsed but the course schema checks failed.
  #[error("course schema validation failed: {}", .issues.join("; "))]
  SchemaValidation { issues: Vec<String> },
}

impl GenerationError {
  /// Stable machine-readable kind, exposed in error DTOs and logs.
  pub fn kind(&self) -> &'static str {
    match self {
      GenerationError::Auth(_) => "auth",
      GenerationError::Transport(_) => "transport",
      GenerationError::MalformedResponse(_) => "malformed_response",
      GenerationError::SchemaValidation { .. } => "schema_validation",
    }
  }

  /// True when re-sending the same prompt is a sensible recovery.
  pub fn retryable(&self) -> bool {
    !matches!(self, GenerationError::Auth(_))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn kinds_are_distinct_and_stable() {
    let errs = [
      GenerationError::Auth("no key".into()),
      GenerationError::Transport("timeout".into()),
      GenerationError::MalformedResponse("EOF".into()),
      GenerationError::SchemaValidation { issues: vec!["missing quiz".into()] },
    ];
    let kinds: Vec<_> = errs.iter().map(|e| e.kind()).collect();
    assert_eq!(kinds, ["auth", "transport", "malformed_response", "schema_validation"]);
  }

  #[test]
  fn only_auth_is_not_retryable() {
    assert!(!GenerationError::Auth("bad key".into()).retryable());
    assert!(GenerationError::Transport("503".into()).retryable());
    assert!(GenerationError::MalformedResponse("prose".into()).retryable());
    assert!(GenerationError::SchemaValidation { issues: vec![] }.retryable());
  }

  #[test]
  fn schema_error_lists_all_issues() {
    let e = GenerationError::SchemaValidation {
      issues: vec!["missing key 'sections'".into(), "quiz[2]: answer not in options".into()],
    };
    let msg = e.to_string();
    assert!(msg.contains("missing key 'sections'"));
    assert!(msg.contains("quiz[2]: answer not in options"));
  }
}
