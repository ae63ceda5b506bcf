//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! The two idempotent drill kinds can be checked statelessly here; the drag
//! lifecycle needs the per-view session and lives on the WebSocket.

use std::sync::Arc;
use axum::{extract::{State, Query}, http::StatusCode, Json, response::IntoResponse};
use tracing::{error, info, instrument};

use crate::domain::Learner;
use crate::protocol::*;
use crate::registry::DrillSession;
use crate::state::AppState;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state), fields(unit = q.unit))]
pub async fn http_get_lesson(
  State(state): State<Arc<AppState>>,
  Query(q): Query<LessonQuery>,
) -> impl IntoResponse {
  let (lesson, origin) = state.choose_lesson(q.unit).await;
  info!(target: "drill", unit = lesson.unit, id = %lesson.id, %origin, "HTTP lesson served");
  Json(crate::protocol::to_out(&lesson))
}

#[instrument(level = "info", skip(state, body), fields(%body.lesson_id, %body.drill_id))]
pub async fn http_check_blanks(
  State(state): State<Arc<AppState>>,
  Json(body): Json<BlanksCheckIn>,
) -> impl IntoResponse {
  let Some(lesson) = state.get_lesson(&body.lesson_id).await else {
    return not_found("Unknown lesson");
  };
  let session = DrillSession::new(&lesson);
  match session.check_blanks(&body.drill_id, &body.inputs, &state.messages) {
    Some(result) => {
      info!(target: "drill", id = %body.drill_id, correct = result.correct_count, total = result.total, "HTTP blanks checked");
      Json(result).into_response()
    }
    None => not_found("Unknown drill"),
  }
}

#[instrument(level = "info", skip(state, body), fields(%body.lesson_id, %body.drill_id))]
pub async fn http_check_choice(
  State(state): State<Arc<AppState>>,
  Json(body): Json<ChoiceCheckIn>,
) -> impl IntoResponse {
  let Some(lesson) = state.get_lesson(&body.lesson_id).await else {
    return not_found("Unknown lesson");
  };
  let session = DrillSession::new(&lesson);
  match session.check_choice(&body.drill_id, body.selected.as_deref(), &state.messages) {
    Some(result) => Json(result).into_response(),
    None => not_found("Unknown drill"),
  }
}

#[instrument(level = "info", skip(state, body), fields(email_len = body.email.len()))]
pub async fn http_register(
  State(state): State<Arc<AppState>>,
  Json(body): Json<AuthIn>,
) -> impl IntoResponse {
  let Some(auth) = &state.auth else { return not_configured("Auth service") };
  match auth.register(&body.email, &body.password).await {
    Ok(learner) => {
      seed_progress_for(&state, &learner).await;
      Json(AuthOut { uid: learner.uid, email: learner.email, id_token: learner.id_token })
        .into_response()
    }
    Err(e) => upstream_error(e),
  }
}

#[instrument(level = "info", skip(state, body), fields(email_len = body.email.len()))]
pub async fn http_login(
  State(state): State<Arc<AppState>>,
  Json(body): Json<AuthIn>,
) -> impl IntoResponse {
  let Some(auth) = &state.auth else { return not_configured("Auth service") };
  match auth.sign_in(&body.email, &body.password).await {
    Ok(learner) =>
      Json(AuthOut { uid: learner.uid, email: learner.email, id_token: learner.id_token })
        .into_response(),
    Err(e) => upstream_error(e),
  }
}

#[instrument(level = "info", skip(state), fields(%q.uid))]
pub async fn http_get_progress(
  State(state): State<Arc<AppState>>,
  Query(q): Query<ProgressQuery>,
) -> impl IntoResponse {
  let Some(store) = &state.progress else { return not_configured("Progress store") };
  match store.load(&q.uid).await {
    Ok(progress) => Json(serde_json::json!({ "progress": progress })).into_response(),
    Err(e) => upstream_error(e),
  }
}

#[instrument(level = "info", skip(state, body), fields(%body.uid, body.unit, body.exercise))]
pub async fn http_save_progress(
  State(state): State<Arc<AppState>>,
  Json(body): Json<ProgressSaveIn>,
) -> impl IntoResponse {
  let Some(store) = &state.progress else { return not_configured("Progress store") };
  let learner = Learner { uid: body.uid, email: String::new(), id_token: body.id_token };
  match store.save(&learner, body.unit, body.exercise).await {
    Ok(()) => Json(serde_json::json!({ "ok": true })).into_response(),
    Err(e) => upstream_error(e),
  }
}

async fn seed_progress_for(state: &AppState, learner: &Learner) {
  if let Some(store) = &state.progress {
    if let Err(e) = store.create_initial(learner).await {
      error!(target: "aprendo_backend", uid = %learner.uid, error = %e, "Initial progress document creation failed; continuing without it.");
    }
  }
}

fn not_found(what: &str) -> axum::response::Response {
  (StatusCode::NOT_FOUND, Json(serde_json::json!({ "error": what }))).into_response()
}

fn not_configured(what: &str) -> axum::response::Response {
  (
    StatusCode::SERVICE_UNAVAILABLE,
    Json(serde_json::json!({ "error": format!("{} not configured", what) })),
  )
    .into_response()
}

fn upstream_error(e: String) -> axum::response::Response {
  error!(target: "aprendo_backend", error = %e, "Upstream call failed");
  (StatusCode::BAD_GATEWAY, Json(serde_json::json!({ "error": e }))).into_response()
}
