//! Domain models: course request parameters, duration/quota tables, and the
//! validated course structure produced by one generation call.
//!
//! A `Course` is immutable once returned; the rendering layer derives views
//! from it but never mutates it. The next generation replaces it wholesale.

use serde::{Deserialize, Serialize};

/// Fixed set of duration labels offered by the UI, mapped to minutes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DurationLabel {
  #[serde(rename = "5 minutes")]
  FiveMinutes,
  #[serde(rename = "15 minutes")]
  FifteenMinutes,
  #[serde(rename = "30 minutes")]
  ThirtyMinutes,
  #[serde(rename = "1 hour")]
  OneHour,
  #[serde(rename = "2 hours")]
  TwoHours,
  #[serde(rename = "4 hours")]
  FourHours,
}

impl DurationLabel {
  /// Lookup table from UI label to the enum. Unknown labels are a caller error.
  pub fn from_label(label: &str) -> Option<Self> {
    match label {
      "5 minutes" => Some(Self::FiveMinutes),
      "15 minutes" => Some(Self::FifteenMinutes),
      "30 minutes" => Some(Self::ThirtyMinutes),
      "1 hour" => Some(Self::OneHour),
      "2 hours" => Some(Self::TwoHours),
      "4 hours" => Some(Self::FourHours),
      _ => None,
    }
  }

  pub fn minutes(self) -> u32 {
    match self {
      Self::FiveMinutes => 5,
      Self::FifteenMinutes => 15,
      Self::ThirtyMinutes => 30,
      Self::OneHour => 60,
      Self::TwoHours => 120,
      Self::FourHours => 240,
    }
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
  Beginner,
  Intermediate,
  Advanced,
}

impl Difficulty {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Beginner => "Beginner",
      Self::Intermediate => "Intermediate",
      Self::Advanced => "Advanced",
    }
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LearningStyle {
  Visual,
  Auditory,
  #[serde(rename = "Reading/Writing")]
  ReadingWriting,
  Kinesthetic,
}

impl LearningStyle {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Visual => "Visual",
      Self::Auditory => "Auditory",
      Self::ReadingWriting => "Reading/Writing",
      Self::Kinesthetic => "Kinesthetic",
    }
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentFormat {
  Comprehensive,
  Concise,
  #[serde(rename = "Example-Driven")]
  ExampleDriven,
}

impl ContentFormat {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Comprehensive => "Comprehensive",
      Self::Concise => "Concise",
      Self::ExampleDriven => "Example-Driven",
    }
  }
}

/// Immutable input to one generation call.
#[derive(Clone, Debug, PartialEq)]
pub struct CourseRequest {
  pub topic: String,
  pub duration_minutes: u32,
  pub difficulty: Difficulty,
  pub learning_style: LearningStyle,
  pub content_format: ContentFormat,
  pub prerequisites: Option<String>,
  pub learning_objectives: Vec<String>,
}

/// Target counts of structural elements, derived from duration alone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContentQuotas {
  pub num_sections: u32,
  pub num_quizzes: u32,
  pub num_flashcards: u32,
  pub num_examples: u32,
}

impl ContentQuotas {
  /// Tier table on duration minutes (inclusive upper bounds). Above one hour
  /// the counts grow with duration under fixed caps, using integer division.
  pub fn for_duration(minutes: u32) -> Self {
    let (num_sections, num_quizzes, num_flashcards, num_examples) = match minutes {
      0..=5 => (1, 3, 5, 1),
      6..=15 => (2, 5, 8, 2),
      16..=30 => (3, 8, 12, 3),
      31..=60 => (4, 12, 15, 4),
      m => ((m / 30).min(8), (m / 5).min(20), (m / 2).min(30), (m / 15).min(10)),
    };
    Self { num_sections, num_quizzes, num_flashcards, num_examples }
  }
}

// --- Validated course structure (the wire contract with the model) ---

/// One generated course. Field names here mirror the JSON shape the prompt
/// demands from the model; renaming any of them is a wire-contract change.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Course {
  pub course_metadata: CourseMetadata,
  pub sections: Vec<Section>,
  pub quiz: Vec<QuizQuestion>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub comprehensive_quiz: Option<Vec<QuizQuestion>>,
  pub flashcards: Vec<Flashcard>,
  pub examples: Vec<Example>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub assignments: Option<Vec<Assignment>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub resources: Option<Vec<Resource>>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub rubric: Option<AssessmentRubric>,
}

/// Metadata echoed and enriched by the model. Inner fields are tolerant
/// (defaulted) so a sparse but structurally sound reply still validates.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CourseMetadata {
  #[serde(default)]
  pub topic: String,
  #[serde(default)]
  pub duration_minutes: u32,
  #[serde(default)]
  pub difficulty: String,
  #[serde(default)]
  pub learning_style: String,
  #[serde(default)]
  pub content_format: String,
  #[serde(default)]
  pub learning_objectives: Vec<String>,
  #[serde(default)]
  pub skills_gained: Vec<String>,
  #[serde(default)]
  pub target_audience: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Section {
  pub title: String,
  pub content: String,
  #[serde(default)]
  pub key_takeaways: Vec<String>,
}

/// Invariant: `answer` must be an exact member of `options` (enforced by
/// schema validation, since a dangling answer breaks scoring downstream).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QuizQuestion {
  pub question: String,
  pub options: Vec<String>,
  pub answer: String,
  #[serde(default)]
  pub explanation: Option<String>,
  #[serde(default)]
  pub difficulty: Option<String>,
  #[serde(default)]
  pub concept: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Flashcard {
  pub term: String,
  pub definition: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Example {
  pub title: String,
  #[serde(default = "default_example_language")]
  pub language: String,
  pub code: String,
}

fn default_example_language() -> String {
  "text".into()
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Assignment {
  pub title: String,
  pub description: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Resource {
  pub title: String,
  #[serde(default)]
  pub url: Option<String>,
  #[serde(default)]
  pub resource_type: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AssessmentRubric {
  pub criteria: Vec<RubricCriterion>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RubricCriterion {
  pub name: String,
  #[serde(default)]
  pub description: Option<String>,
  #[serde(default)]
  pub weight: Option<f32>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn duration_label_lookup_covers_the_fixed_set() {
    let labels = ["5 minutes", "15 minutes", "30 minutes", "1 hour", "2 hours", "4 hours"];
    let minutes = [5, 15, 30, 60, 120, 240];
    for (label, mins) in labels.iter().zip(minutes) {
      let d = DurationLabel::from_label(label).expect("known label");
      assert_eq!(d.minutes(), mins, "{label}");
    }
    assert_eq!(DurationLabel::from_label("45 minutes"), None);
    assert_eq!(DurationLabel::from_label(""), None);
  }

  #[test]
  fn quota_tiers_match_the_table_at_boundaries() {
    let cases: &[(u32, (u32, u32, u32, u32))] = &[
      (5, (1, 3, 5, 1)),
      (6, (2, 5, 8, 2)),
      (15, (2, 5, 8, 2)),
      (16, (3, 8, 12, 3)),
      (30, (3, 8, 12, 3)),
      (31, (4, 12, 15, 4)),
      (60, (4, 12, 15, 4)),
      (61, (2, 12, 30, 4)),
      (480, (8, 20, 30, 10)),
    ];
    for (minutes, (s, q, f, e)) in cases {
      let quotas = ContentQuotas::for_duration(*minutes);
      assert_eq!(
        (quotas.num_sections, quotas.num_quizzes, quotas.num_flashcards, quotas.num_examples),
        (*s, *q, *f, *e),
        "minutes={minutes}"
      );
    }
  }

  #[test]
  fn quotas_are_monotonic_within_each_tier() {
    for tier in [(1u32, 5u32), (6, 15), (16, 30), (31, 60), (61, 480)] {
      let mut prev = ContentQuotas::for_duration(tier.0);
      for m in tier.0..=tier.1 {
        let q = ContentQuotas::for_duration(m);
        assert!(q.num_sections >= prev.num_sections, "sections at {m}");
        assert!(q.num_quizzes >= prev.num_quizzes, "quizzes at {m}");
        assert!(q.num_flashcards >= prev.num_flashcards, "flashcards at {m}");
        assert!(q.num_examples >= prev.num_examples, "examples at {m}");
        prev = q;
      }
    }
  }

  #[test]
  fn large_duration_caps_hold() {
    let q = ContentQuotas::for_duration(100_000);
    assert_eq!((q.num_sections, q.num_quizzes, q.num_flashcards, q.num_examples), (8, 20, 30, 10));
  }
}
