//! Core request handling shared by the HTTP handlers.
//!
//! This owns input validation (empty topic, unknown duration label), the
//! duplicate-submission guard, and the store-last-course bookkeeping around
//! the generation pipeline. The pipeline itself lives in `gemini`/`validate`
//! and stays stateless.

use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::domain::{CourseRequest, DurationLabel};
use crate::error::GenerationError;
use crate::protocol::GenerateIn;
use crate::state::{request_fingerprint, AppState, GeneratedCourse};

/// Why a generation request was not served.
#[derive(Debug)]
pub enum Rejection {
  /// Caller error in the submitted parameters.
  BadRequest(String),
  /// An identical request is already in flight; the second one is refused
  /// rather than racing two billed provider calls.
  DuplicateInFlight,
  /// The pipeline ran and failed with a typed error.
  Generation(GenerationError),
}

/// Turn the UI payload into a typed `CourseRequest`.
pub fn build_request(input: &GenerateIn) -> Result<CourseRequest, Rejection> {
  let topic = input.topic.trim();
  if topic.is_empty() {
    return Err(Rejection::BadRequest("topic must not be empty".into()));
  }
  let duration = DurationLabel::from_label(&input.duration)
    .ok_or_else(|| Rejection::BadRequest(format!("unknown duration label '{}'", input.duration)))?;

  Ok(CourseRequest {
    topic: topic.to_string(),
    duration_minutes: duration.minutes(),
    difficulty: input.difficulty,
    learning_style: input.learning_style,
    content_format: input.content_format,
    prerequisites: input
      .prerequisites
      .as_deref()
      .map(str::trim)
      .filter(|p| !p.is_empty())
      .map(str::to_string),
    learning_objectives: split_objectives(input.objectives.as_deref()),
  })
}

/// Newline-delimited textarea content into an ordered objective list.
pub fn split_objectives(raw: Option<&str>) -> Vec<String> {
  raw
    .unwrap_or_default()
    .lines()
    .map(str::trim)
    .filter(|l| !l.is_empty())
    .map(str::to_string)
    .collect()
}

/// Run one generation end to end: validate input, claim the in-flight slot,
/// call the pipeline, store the result as the new most-recent course.
#[instrument(level = "info", skip(state, input), fields(topic = %input.topic, duration = %input.duration))]
pub async fn generate_course(state: &AppState, input: &GenerateIn) -> Result<GeneratedCourse, Rejection> {
  let request = build_request(input)?;

  let gemini = state.gemini.as_ref().ok_or_else(|| {
    Rejection::Generation(GenerationError::Auth("no API credential configured".into()))
  })?;

  // The guard holds the slot for the whole provider call and releases it in
  // Drop, so a handler future dropped on client disconnect frees it too.
  let fingerprint = request_fingerprint(&request);
  let Some(_guard) = state.begin_generation(&fingerprint) else {
    warn!(target: "course", topic = %request.topic, "Duplicate submission refused while first call is in flight");
    return Err(Rejection::DuplicateInFlight);
  };

  match gemini.generate_course(&request).await {
    Ok(course) => {
      let generated = GeneratedCourse { generation_id: Uuid::new_v4().to_string(), course };
      state.store_course(generated.clone()).await;
      info!(target: "course", generation_id = %generated.generation_id, topic = %request.topic, "Course stored as most recent");
      Ok(generated)
    }
    Err(e) => Err(Rejection::Generation(e)),
  }
}
