//! Minimal Gemini client for our one use-case.
//!
//! We only call `models/{model}:generateContent` with a single user turn and
//! expect free-form text back (ideally bare JSON, often fenced anyway).
//! Calls are instrumented and log model names, latencies, and response sizes
//! (not contents).
//!
//! NOTE: We never log the API key and we keep payload truncations short.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

use crate::config::{resolve_api_key, AppConfig};
use crate::domain::{ContentQuotas, Course, CourseRequest};
use crate::error::GenerationError;
use crate::{prompt, validate};

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Clone)]
pub struct Gemini {
  pub client: reqwest::Client,
  api_key: String,
  pub base_url: String,
  pub model: String,
}

impl Gemini {
  /// Construct the client if a credential resolves; otherwise return None.
  pub fn from_config(cfg: Option<&AppConfig>) -> Option<Self> {
    let api_key = resolve_api_key(cfg)?;
    let gemini_cfg = cfg.map(|c| c.gemini.clone()).unwrap_or_default();

    let client = match reqwest::Client::builder().timeout(Duration::from_secs(30)).build() {
      Ok(c) => c,
      Err(e) => {
        error!(target: "nanocourse_backend", error = %e, "Failed to build HTTP client; Gemini disabled");
        return None;
      }
    };

    Some(Self { client, api_key, base_url: gemini_cfg.base_url, model: gemini_cfg.model })
  }

  /// One text-in/text-out generateContent call. Returns the raw candidate
  /// text; the caller owns cleaning and parsing.
  #[instrument(level = "info", skip(self, prompt_text), fields(model = %self.model, prompt_len = prompt_text.len()))]
  async fn generate_text(&self, prompt_text: &str) -> Result<String, GenerationError> {
    let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
    let req = GenerateContentRequest {
      contents: vec![Content {
        role: "user".into(),
        parts: vec![Part { text: prompt_text.to_string() }],
      }],
      generation_config: Some(GenerationConfig { temperature: 0.7 }),
    };

    let res = self
      .client
      .post(&url)
      .header(CONTENT_TYPE, "application/json")
      .header(API_KEY_HEADER, &self.api_key)
      .json(&req)
      .send()
      .await
      .map_err(|e| GenerationError::Transport(e.to_string()))?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let msg = extract_gemini_error(&body).unwrap_or(body);
      // Gemini rejects bad keys with 400 INVALID_ARGUMENT, not just 401/403.
      let credential_problem = status.as_u16() == 401
        || status.as_u16() == 403
        || (status.as_u16() == 400 && msg.to_lowercase().contains("api key"));
      if credential_problem {
        return Err(GenerationError::Auth(format!("Gemini HTTP {status}: {msg}")));
      }
      return Err(GenerationError::Transport(format!("Gemini HTTP {status}: {msg}")));
    }

    let body: GenerateContentResponse = res
      .json()
      .await
      .map_err(|e| GenerationError::Transport(format!("unreadable provider response: {e}")))?;

    if let Some(usage) = &body.usage_metadata {
      info!(
        prompt_tokens = ?usage.prompt_token_count,
        candidate_tokens = ?usage.candidates_token_count,
        total_tokens = ?usage.total_token_count,
        "Gemini usage"
      );
    }

    let text = body
      .candidates
      .into_iter()
      .next()
      .map(|c| c.content.parts.into_iter().map(|p| p.text).collect::<String>())
      .unwrap_or_default();

    if text.trim().is_empty() {
      return Err(GenerationError::MalformedResponse("empty candidate text".into()));
    }

    info!(response_len = text.len(), "Gemini candidate text received");
    Ok(text)
  }

  /// Full pipeline for one request: build prompt, call the model, clean,
  /// parse, and validate. Model non-compliance (malformed or schema-invalid
  /// output) is retried once with the same prompt before surfacing.
  #[instrument(
    level = "info",
    skip(self, request),
    fields(topic = %request.topic, duration = request.duration_minutes, model = %self.model)
  )]
  pub async fn generate_course(&self, request: &CourseRequest) -> Result<Course, GenerationError> {
    let prompt_text = prompt::build(request);
    let quotas = ContentQuotas::for_duration(request.duration_minutes);

    let start = std::time::Instant::now();
    let raw = self.generate_text(&prompt_text).await?;

    let course = match validate::parse_course(&raw) {
      Ok(course) => course,
      Err(first) => {
        warn!(
          target: "course",
          kind = first.kind(),
          error = %first,
          raw_preview = %crate::util::trunc_for_log(&raw, 200),
          "Model reply failed validation; retrying once with the same prompt"
        );
        let raw = self.generate_text(&prompt_text).await?;
        validate::parse_course(&raw).map_err(|second| {
          error!(target: "course", kind = second.kind(), error = %second, "Retry also failed validation");
          second
        })?
      }
    };

    validate::warn_on_quota_mismatch(&course, &quotas);
    info!(
      target: "course",
      contract = prompt::PROMPT_CONTRACT_VERSION,
      elapsed = ?start.elapsed(),
      sections = course.sections.len(),
      quiz = course.quiz.len(),
      flashcards = course.flashcards.len(),
      examples = course.examples.len(),
      "Course generated and validated"
    );
    Ok(course)
  }
}

// --- generateContent DTOs ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
  contents: Vec<Content>,
  #[serde(skip_serializing_if = "Option::is_none")]
  generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content {
  role: String,
  parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
  #[serde(default)]
  text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
  temperature: f32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
  #[serde(default)]
  candidates: Vec<Candidate>,
  #[serde(default)]
  usage_metadata: Option<UsageMetadata>,
}

#[derive(Deserialize)]
struct Candidate {
  #[serde(default)]
  content: CandidateContent,
}

#[derive(Deserialize, Default)]
struct CandidateContent {
  #[serde(default)]
  parts: Vec<Part>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
  #[serde(default)]
  prompt_token_count: Option<u32>,
  #[serde(default)]
  candidates_token_count: Option<u32>,
  #[serde(default)]
  total_token_count: Option<u32>,
}

/// Try to extract a clean error message from a Gemini error body.
fn extract_gemini_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EWrap {
    error: EObj,
  }
  #[derive(Deserialize)]
  struct EObj {
    message: String,
  }
  match serde_json::from_str::<EWrap>(body) {
    Ok(w) => Some(w.error.message),
    Err(_) => None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn provider_error_body_is_unwrapped() {
    let body = r#"{"error": {"code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT"}}"#;
    assert_eq!(extract_gemini_error(body).as_deref(), Some("API key not valid"));
    assert_eq!(extract_gemini_error("not json"), None);
  }

  #[test]
  fn candidate_text_concatenates_parts() {
    let body = r#"{
      "candidates": [
        { "content": { "parts": [ { "text": "{\"a\":" }, { "text": " 1}" } ] } }
      ],
      "usageMetadata": { "promptTokenCount": 12, "candidatesTokenCount": 4, "totalTokenCount": 16 }
    }"#;
    let parsed: GenerateContentResponse = serde_json::from_str(body).unwrap();
    let text: String = parsed.candidates[0].content.parts.iter().map(|p| p.text.as_str()).collect();
    assert_eq!(text, "{\"a\": 1}");
    assert_eq!(parsed.usage_metadata.unwrap().total_token_count, Some(16));
  }
}
