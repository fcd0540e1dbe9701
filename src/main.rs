//! Nano-Course Generator Backend
//!
//! - Axum HTTP API: one call in (course parameters), one validated course out
//! - Gemini integration (via config file or environment variables)
//!
//! Important env variables:
//!   PORT                   : u16 (default 3000)
//!   GEMINI_API_KEY         : enables generation if present (GOOGLE_API_KEY also accepted)
//!   NANOCOURSE_CONFIG_PATH : path to TOML config (API key, model, base URL)
//!   LOG_LEVEL              : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT             : "pretty" (default) or "json"

mod telemetry;
mod util;
mod domain;
mod error;
mod config;
mod prompt;
mod validate;
mod gemini;
mod state;
mod protocol;
mod logic;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::routes::build_router;
use crate::state::AppState;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Build shared application state (Gemini client, last-course slot).
  let state = Arc::new(AppState::new());

  // Build the HTTP router with routes, CORS and tracing layers.
  let app = build_router(state.clone());

  // Read port from env or default to 3000.
  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "nanocourse_backend", %addr, "HTTP server listening");
  axum::serve(listener, app).await?;
  Ok(())
}
