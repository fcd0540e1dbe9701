//! Deterministic prompt construction for course generation.
//!
//! `build` is pure and total: the same `CourseRequest` always yields
//! byte-identical prompt text. The JSON shape spelled out in the template is
//! the wire contract with the model; renaming a field there changes what the
//! model returns and must be treated as a contract version bump.

use crate::domain::{ContentQuotas, CourseRequest};
use crate::util::fill_template;

/// Bumped whenever the required JSON shape in the template changes.
pub const PROMPT_CONTRACT_VERSION: &str = "course-json-v1";

const COURSE_PROMPT_TEMPLATE: &str = r#"You are an expert instructional designer. Create a nano-course on the topic: "{topic}".

Course parameters:
- Total duration: {duration_minutes} minutes
- Difficulty: {difficulty}
- Learning style: {learning_style}
- Content format: {content_format}
- Prerequisites: {prerequisites}
- Learning objectives:
{objectives}

Structural requirements (follow these counts exactly):
- exactly {num_sections} sections
- exactly {num_quizzes} quiz questions
- exactly {num_flashcards} flashcards
- exactly {num_examples} examples

Respond with a single valid JSON object and nothing else. The object must have exactly this structure:

{
  "course_metadata": {
    "topic": "{topic}",
    "duration_minutes": {duration_minutes},
    "difficulty": "{difficulty}",
    "learning_style": "{learning_style}",
    "content_format": "{content_format}",
    "learning_objectives": ["..."],
    "skills_gained": ["..."],
    "target_audience": "who this course is for"
  },
  "sections": [
    {
      "title": "Section title",
      "content": "Markdown lesson content for this section",
      "key_takeaways": ["..."]
    }
  ],
  "quiz": [
    {
      "question": "Question text?",
      "options": ["Option A", "Option B", "Option C", "Option D"],
      "answer": "The correct option text, copied verbatim from options",
      "explanation": "Why this answer is correct",
      "difficulty": "easy|medium|hard",
      "concept": "Concept this question tests"
    }
  ],
  "comprehensive_quiz": [],
  "flashcards": [
    { "term": "Key term", "definition": "Definition of the term" }
  ],
  "examples": [
    {
      "title": "Example title",
      "language": "Language for syntax highlighting, or 'text'",
      "code": "The example code or text snippet"
    }
  ],
  "assignments": [
    { "title": "Assignment title", "description": "What the learner should do" }
  ],
  "resources": [
    { "title": "Resource title", "url": "https://...", "resource_type": "article|video|book" }
  ],
  "rubric": {
    "criteria": [
      { "name": "Criterion name", "description": "What is assessed", "weight": 25 }
    ]
  }
}

Rules:
- Every quiz "answer" MUST be copied character-for-character from that question's "options".
- Output ONLY the JSON object. No prose, no explanations, no Markdown code fences.
"#;

/// Build the full generation prompt for one request. Pure; never fails.
pub fn build(request: &CourseRequest) -> String {
  let quotas = ContentQuotas::for_duration(request.duration_minutes);
  let prerequisites = match request.prerequisites.as_deref() {
    Some(p) if !p.trim().is_empty() => p.trim().to_string(),
    _ => "None".to_string(),
  };
  let objectives = if request.learning_objectives.is_empty() {
    "- (none provided; derive sensible objectives from the topic)".to_string()
  } else {
    request
      .learning_objectives
      .iter()
      .map(|o| format!("- {}", o.trim()))
      .collect::<Vec<_>>()
      .join("\n")
  };

  fill_template(
    COURSE_PROMPT_TEMPLATE,
    &[
      ("topic", &request.topic),
      ("duration_minutes", &request.duration_minutes.to_string()),
      ("difficulty", request.difficulty.as_str()),
      ("learning_style", request.learning_style.as_str()),
      ("content_format", request.content_format.as_str()),
      ("prerequisites", &prerequisites),
      ("objectives", &objectives),
      ("num_sections", &quotas.num_sections.to_string()),
      ("num_quizzes", &quotas.num_quizzes.to_string()),
      ("num_flashcards", &quotas.num_flashcards.to_string()),
      ("num_examples", &quotas.num_examples.to_string()),
    ],
  )
}
