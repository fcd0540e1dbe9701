//! Response cleaning and schema validation.
//!
//! The model is told to emit bare JSON but frequently wraps it in Markdown
//! code fences anyway, so cleaning is mandatory and must tolerate fenced and
//! unfenced replies alike. After parsing, the object is checked against the
//! course schema: required top-level keys, and every quiz answer must be an
//! exact member of its own options (a dangling answer cannot be scored).
//!
//! Quota mismatches (model under/over-delivering sections etc.) are reported
//! but never rejected; the delivered counts are kept as-is.

use serde_json::Value;
use tracing::warn;

use crate::domain::{ContentQuotas, Course, QuizQuestion};
use crate::error::GenerationError;

/// Top-level keys a course reply must carry. The remaining keys in the wire
/// contract (comprehensive_quiz, assignments, resources, rubric) are optional.
const REQUIRED_KEYS: [&str; 5] = ["course_metadata", "sections", "quiz", "flashcards", "examples"];

/// Strip a leading/trailing Markdown code fence if present. Idempotent:
/// cleaning already-clean text returns it unchanged.
pub fn clean_response(raw: &str) -> &str {
  let mut s = raw.trim();
  if let Some(rest) = s.strip_prefix("```") {
    // Drop an optional language tag directly after the opening fence.
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    s = rest.trim_start();
  }
  if let Some(rest) = s.strip_suffix("```") {
    s = rest.trim_end();
  }
  s
}

/// Clean, parse, and validate one raw model reply into a `Course`.
///
/// Failure kinds are deliberately distinct: non-JSON text is
/// `MalformedResponse` (retry with the same prompt), while valid JSON that
/// breaks the schema is `SchemaValidation` listing every offending field.
pub fn parse_course(raw: &str) -> Result<Course, GenerationError> {
  let cleaned = clean_response(raw);

  let value: Value = serde_json::from_str(cleaned)
    .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;

  let obj = value.as_object().ok_or_else(|| GenerationError::SchemaValidation {
    issues: vec!["top-level JSON value is not an object".into()],
  })?;

  let missing: Vec<String> = REQUIRED_KEYS
    .iter()
    .filter(|k| !obj.contains_key(**k))
    .map(|k| format!("missing required key '{k}'"))
    .collect();
  if !missing.is_empty() {
    return Err(GenerationError::SchemaValidation { issues: missing });
  }

  let course: Course = serde_json::from_value(value)
    .map_err(|e| GenerationError::SchemaValidation { issues: vec![e.to_string()] })?;

  let mut issues = Vec::new();
  check_quiz_entries("quiz", &course.quiz, &mut issues);
  if let Some(cq) = &course.comprehensive_quiz {
    check_quiz_entries("comprehensive_quiz", cq, &mut issues);
  }
  if !issues.is_empty() {
    return Err(GenerationError::SchemaValidation { issues });
  }

  Ok(course)
}

fn check_quiz_entries(field: &str, entries: &[QuizQuestion], issues: &mut Vec<String>) {
  for (i, q) in entries.iter().enumerate() {
    if q.options.len() < 2 {
      issues.push(format!("{field}[{i}]: fewer than 2 options"));
    }
    if !q.options.iter().any(|o| o == &q.answer) {
      issues.push(format!("{field}[{i}]: answer is not one of the options"));
    }
  }
}

/// Compare delivered counts against the requested quotas. Pure; the caller
/// decides what to do with the notes (we log them as warnings and move on).
pub fn quota_mismatches(course: &Course, quotas: &ContentQuotas) -> Vec<String> {
  let mut notes = Vec::new();
  let pairs = [
    ("sections", course.sections.len(), quotas.num_sections),
    ("quiz questions", course.quiz.len(), quotas.num_quizzes),
    ("flashcards", course.flashcards.len(), quotas.num_flashcards),
    ("examples", course.examples.len(), quotas.num_examples),
  ];
  for (name, got, want) in pairs {
    if got != want as usize {
      notes.push(format!("{name}: requested {want}, model delivered {got}"));
    }
  }
  notes
}

/// Log quota mismatches, if any. Soft policy: the course is served as-is.
pub fn warn_on_quota_mismatch(course: &Course, quotas: &ContentQuotas) {
  for note in quota_mismatches(course, quotas) {
    warn!(target: "course", %note, "Model did not meet the requested content quota");
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const MOCK_COURSE: &str = r#"{
    "course_metadata": {
      "topic": "Binary Search",
      "duration_minutes": 5,
      "difficulty": "Beginner",
      "learning_style": "Visual",
      "content_format": "Comprehensive",
      "learning_objectives": ["Understand halving"],
      "skills_gained": ["Algorithmic thinking"],
      "target_audience": "New programmers"
    },
    "sections": [
      { "title": "How halving works", "content": "Each probe halves the search space.", "key_takeaways": ["O(log n)"] }
    ],
    "quiz": [
      { "question": "Input must be?", "options": ["Sorted", "Reversed", "Random"], "answer": "Sorted" },
      { "question": "Complexity?", "options": ["O(n)", "O(log n)"], "answer": "O(log n)", "explanation": "Halving." },
      { "question": "Probe position?", "options": ["Start", "Middle", "End"], "answer": "Middle", "concept": "invariant" }
    ],
    "flashcards": [
      { "term": "Pivot", "definition": "Middle element probed each step." },
      { "term": "Invariant", "definition": "Target stays inside the live range." },
      { "term": "Lo", "definition": "Lower bound of the live range." },
      { "term": "Hi", "definition": "Upper bound of the live range." },
      { "term": "Probe", "definition": "One comparison against the pivot." }
    ],
    "examples": [
      { "title": "Rust implementation", "language": "rust", "code": "slice.binary_search(&x)" }
    ]
  }"#;

  fn fenced(body: &str) -> String {
    format!("```json\n{body}\n```")
  }

  #[test]
  fn cleaning_tolerates_fenced_and_unfenced_payloads() {
    let bare = "{\"a\": 1}";
    let json_fence = format!("```json\n{bare}\n```");
    let anon_fence = format!("```\n{bare}\n```");
    assert_eq!(clean_response(bare), bare);
    assert_eq!(clean_response(&json_fence), bare);
    assert_eq!(clean_response(&anon_fence), bare);
  }

  #[test]
  fn cleaning_is_idempotent() {
    let fenced = "```json\n{\"a\": 1}\n```";
    let once = clean_response(fenced);
    assert_eq!(clean_response(once), once);
  }

  #[test]
  fn plain_prose_is_malformed_not_schema_invalid() {
    let err = parse_course("I'm sorry, I cannot produce a course right now.").unwrap_err();
    assert_eq!(err.kind(), "malformed_response");
  }

  #[test]
  fn missing_course_metadata_is_a_schema_error() {
    let mut v: Value = serde_json::from_str(MOCK_COURSE).unwrap();
    v.as_object_mut().unwrap().remove("course_metadata");
    let err = parse_course(&v.to_string()).unwrap_err();
    assert_eq!(err.kind(), "schema_validation");
    assert!(err.to_string().contains("course_metadata"));
  }

  #[test]
  fn all_missing_required_keys_are_listed_together() {
    let err = parse_course("{}").unwrap_err();
    let msg = err.to_string();
    for key in ["course_metadata", "sections", "quiz", "flashcards", "examples"] {
      assert!(msg.contains(key), "missing {key} in: {msg}");
    }
  }

  #[test]
  fn top_level_array_is_a_schema_error() {
    let err = parse_course("[1, 2, 3]").unwrap_err();
    assert_eq!(err.kind(), "schema_validation");
  }

  #[test]
  fn answer_outside_options_never_becomes_a_course() {
    let mut v: Value = serde_json::from_str(MOCK_COURSE).unwrap();
    v["quiz"][0]["answer"] = Value::String("Unsorted".into());
    let err = parse_course(&v.to_string()).unwrap_err();
    assert_eq!(err.kind(), "schema_validation");
    assert!(err.to_string().contains("quiz[0]"));
  }

  #[test]
  fn comprehensive_quiz_answers_are_checked_too() {
    let mut v: Value = serde_json::from_str(MOCK_COURSE).unwrap();
    v["comprehensive_quiz"] = serde_json::json!([
      { "question": "Q?", "options": ["A", "B"], "answer": "C" }
    ]);
    let err = parse_course(&v.to_string()).unwrap_err();
    assert!(err.to_string().contains("comprehensive_quiz[0]"));
  }

  #[test]
  fn single_option_question_is_rejected() {
    let mut v: Value = serde_json::from_str(MOCK_COURSE).unwrap();
    v["quiz"][1]["options"] = serde_json::json!(["O(log n)"]);
    let err = parse_course(&v.to_string()).unwrap_err();
    assert!(err.to_string().contains("fewer than 2 options"));
  }

  #[test]
  fn mock_five_minute_course_parses_with_expected_counts() {
    let course = parse_course(&fenced(MOCK_COURSE)).expect("valid course");
    assert_eq!(course.sections.len(), 1);
    assert_eq!(course.quiz.len(), 3);
    assert_eq!(course.flashcards.len(), 5);
    assert_eq!(course.examples.len(), 1);
    assert_eq!(course.course_metadata.topic, "Binary Search");

    let quotas = ContentQuotas::for_duration(5);
    assert!(quota_mismatches(&course, &quotas).is_empty());
  }

  #[test]
  fn quota_mismatch_warns_but_does_not_reject() {
    let course = parse_course(MOCK_COURSE).expect("valid course");
    // A 15-minute request wants 2/5/8/2; this reply delivers 1/3/5/1.
    let quotas = ContentQuotas::for_duration(15);
    let notes = quota_mismatches(&course, &quotas);
    assert_eq!(notes.len(), 4);
    assert!(notes[0].contains("requested 2"));
    assert!(notes[0].contains("delivered 1"));
  }
}
