//! Application state: the optional Gemini client, the single most-recent
//! course, and the in-flight request guard.
//!
//! The generation core itself is stateless; everything session-like lives
//! here, owned by the service layer. The last course is overwritten wholesale
//! on each successful generation (last writer wins, no merge semantics).

use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
};

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{info, instrument};

use crate::config::load_app_config_from_env;
use crate::domain::{Course, CourseRequest};
use crate::gemini::Gemini;

/// One successful generation, as stored and served back by the API.
#[derive(Clone, Debug, Serialize)]
pub struct GeneratedCourse {
    #[serde(rename = "generationId")]
    pub generation_id: String,
    pub course: Course,
}

#[derive(Clone)]
pub struct AppState {
    pub gemini: Option<Gemini>,
    pub last_course: Arc<RwLock<Option<GeneratedCourse>>>,
    // std Mutex, not tokio: the guard must be releasable from Drop, which
    // runs synchronously when a cancelled handler future is torn down.
    pub in_flight: Arc<Mutex<HashSet<String>>>,
}

/// Claim on an in-flight fingerprint. Releasing happens in `Drop`, so the
/// slot is freed on every exit path, including the handler future being
/// dropped when the HTTP client disconnects mid-call.
pub struct InFlightGuard {
    set: Arc<Mutex<HashSet<String>>>,
    fingerprint: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut set = self.set.lock().unwrap_or_else(|e| e.into_inner());
        set.remove(&self.fingerprint);
    }
}

impl AppState {
    /// Build state from env: load config and init the Gemini client if a
    /// credential resolves.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let cfg = load_app_config_from_env();
        let gemini = Gemini::from_config(cfg.as_ref());
        if let Some(g) = &gemini {
            info!(target: "nanocourse_backend", base_url = %g.base_url, model = %g.model, "Gemini enabled.");
        } else {
            info!(target: "nanocourse_backend", "Gemini disabled (no credential resolved). Generation requests will fail with an auth error.");
        }

        Self {
            gemini,
            last_course: Arc::new(RwLock::new(None)),
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Claim a generation slot for this fingerprint. Returns None when an
    /// identical request is already in flight (the second submission must be
    /// rejected, not raced). The slot is held until the guard is dropped.
    pub fn begin_generation(&self, fingerprint: &str) -> Option<InFlightGuard> {
        let mut set = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
        if !set.insert(fingerprint.to_string()) {
            return None;
        }
        Some(InFlightGuard { set: Arc::clone(&self.in_flight), fingerprint: fingerprint.to_string() })
    }

    /// Overwrite the most-recent course.
    pub async fn store_course(&self, generated: GeneratedCourse) {
        *self.last_course.write().await = Some(generated);
    }

    /// The most-recent course, if any generation has succeeded yet.
    pub async fn get_last_course(&self) -> Option<GeneratedCourse> {
        self.last_course.read().await.clone()
    }
}

/// Stable identity of a request, used only for duplicate-submission guarding.
/// Two requests with the same parameters map to the same fingerprint.
pub fn request_fingerprint(request: &CourseRequest) -> String {
    format!(
        "{}\u{1f}{}\u{1f}{}\u{1f}{}\u{1f}{}\u{1f}{}\u{1f}{}",
        request.topic,
        request.duration_minutes,
        request.difficulty.as_str(),
        request.learning_style.as_str(),
        request.content_format.as_str(),
        request.prerequisites.as_deref().unwrap_or(""),
        request.learning_objectives.join("\u{1e}"),
    )
}
