//! HTTP endpoint handlers. These are thin wrappers that forward to core logic
//! and map rejections to status codes plus a typed error body.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use tracing::{info, instrument};

use crate::error::GenerationError;
use crate::logic::{self, Rejection};
use crate::protocol::*;
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse {
  Json(HealthOut { ok: true })
}

#[instrument(level = "info", skip(state, body), fields(topic = %body.topic, duration = %body.duration))]
pub async fn http_post_course(
  State(state): State<Arc<AppState>>,
  Json(body): Json<GenerateIn>,
) -> impl IntoResponse {
  match logic::generate_course(&state, &body).await {
    Ok(generated) => {
      info!(target: "course", generation_id = %generated.generation_id, "HTTP course served");
      (StatusCode::OK, Json(generated)).into_response()
    }
    Err(rejection) => rejection_response(rejection),
  }
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_last_course(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  match state.get_last_course().await {
    Some(generated) => (StatusCode::OK, Json(generated)).into_response(),
    None => (
      StatusCode::NOT_FOUND,
      Json(ErrorOut::not_found("no course has been generated yet")),
    )
      .into_response(),
  }
}

fn rejection_response(rejection: Rejection) -> axum::response::Response {
  match rejection {
    Rejection::BadRequest(message) => {
      (StatusCode::BAD_REQUEST, Json(ErrorOut::bad_request(message))).into_response()
    }
    Rejection::DuplicateInFlight => {
      (StatusCode::CONFLICT, Json(ErrorOut::duplicate_in_flight())).into_response()
    }
    Rejection::Generation(e) => {
      let status = match &e {
        GenerationError::Auth(_) => StatusCode::UNAUTHORIZED,
        GenerationError::Transport(_)
        | GenerationError::MalformedResponse(_)
        | GenerationError::SchemaValidation { .. } => StatusCode::BAD_GATEWAY,
      };
      (status, Json(ErrorOut::from_generation_error(&e))).into_response()
    }
  }
}
