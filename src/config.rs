//! Loading service configuration (Gemini credentials + model selection) from TOML.
//!
//! Credential resolution order is part of the external contract: the config
//! file (secrets store) wins, then the GEMINI_API_KEY environment variable,
//! then GOOGLE_API_KEY as a last fallback.

use serde::Deserialize;
use tracing::{error, info};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
  #[serde(default)]
  pub gemini: GeminiConfig,
}

/// Gemini connection settings accepted in TOML configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct GeminiConfig {
  #[serde(default)]
  pub api_key: Option<String>,
  #[serde(default = "default_model")]
  pub model: String,
  #[serde(default = "default_base_url")]
  pub base_url: String,
}

impl Default for GeminiConfig {
  fn default() -> Self {
    Self { api_key: None, model: default_model(), base_url: default_base_url() }
  }
}

fn default_model() -> String {
  "gemini-pro".into()
}

fn default_base_url() -> String {
  "https://generativelanguage.googleapis.com/v1beta".into()
}

/// Attempt to load `AppConfig` from NANOCOURSE_CONFIG_PATH. On any parsing/IO
/// error, returns None and the service falls back to defaults + env.
pub fn load_app_config_from_env() -> Option<AppConfig> {
  let path = std::env::var("NANOCOURSE_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<AppConfig>(&s) {
      Ok(cfg) => {
        info!(target: "nanocourse_backend", %path, "Loaded app config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "nanocourse_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "nanocourse_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

/// Resolve the API credential: config file first, then env fallbacks.
pub fn resolve_api_key(cfg: Option<&AppConfig>) -> Option<String> {
  if let Some(key) = cfg.and_then(|c| c.gemini.api_key.clone()) {
    if !key.trim().is_empty() {
      return Some(key);
    }
  }
  std::env::var("GEMINI_API_KEY")
    .or_else(|_| std::env::var("GOOGLE_API_KEY"))
    .ok()
    .filter(|k| !k.trim().is_empty())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn config_file_key_wins_over_everything() {
    let cfg = AppConfig {
      gemini: GeminiConfig { api_key: Some("from-config".into()), ..Default::default() },
    };
    assert_eq!(resolve_api_key(Some(&cfg)).as_deref(), Some("from-config"));
  }

  #[test]
  fn blank_config_key_is_ignored() {
    let cfg = AppConfig {
      gemini: GeminiConfig { api_key: Some("   ".into()), ..Default::default() },
    };
    // Falls through to env, which may or may not be set in the test runner;
    // the point is that whitespace never resolves as a credential.
    assert_ne!(resolve_api_key(Some(&cfg)).as_deref(), Some("   "));
  }

  #[test]
  fn defaults_point_at_the_public_endpoint() {
    let cfg = GeminiConfig::default();
    assert_eq!(cfg.model, "gemini-pro");
    assert!(cfg.base_url.starts_with("https://generativelanguage.googleapis.com"));
  }
}
