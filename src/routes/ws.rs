//! WebSocket upgrade + message loop. Each client message is parsed as JSON
//! and forwarded to the per-connection lesson view. We reply with a single
//! JSON message per request; the only server-pushed messages are the
//! mismatch-flag clears, sent when a flag's deadline passes.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{debug, error, info, instrument};

use crate::domain::Learner;
use crate::feedback::{Feedback, FeedbackTone};
use crate::protocol::{to_drop_out, to_out, ClientWsMessage, ServerWsMessage};
use crate::registry::DrillSession;
use crate::state::AppState;

/// Everything one connected page view owns: its graders and, once signed in,
/// the learner identity the progress-save path gets handed explicitly.
struct LessonView {
  session: Option<DrillSession>,
  learner: Option<Learner>,
}

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "aprendo_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "aprendo_backend", "WebSocket connected");
  let mut view = LessonView { session: None, learner: None };

  loop {
    let deadline = view.session.as_ref().and_then(|s| s.next_deadline());
    // select! evaluates the sleep even when the branch is disabled, so give
    // it a far-future instant when no flag is pending.
    let wake = deadline
      .map(tokio::time::Instant::from_std)
      .unwrap_or_else(|| tokio::time::Instant::now() + Duration::from_secs(86_400));

    tokio::select! {
      incoming = socket.recv() => {
        let Some(Ok(msg)) = incoming else { break };
        match msg {
          Message::Text(txt) => {
            let reply_msg = match serde_json::from_str::<ClientWsMessage>(&txt) {
              Ok(incoming) => {
                // Credentials must never reach the logs.
                match &incoming {
                  ClientWsMessage::Login { .. } | ClientWsMessage::Register { .. } =>
                    debug!(target: "aprendo_backend", "WS received: auth message"),
                  other => debug!(target: "aprendo_backend", "WS received: {:?}", other),
                }
                handle_client_ws(incoming, &state, &mut view).await
              }
              Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
            };

            let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
              serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
            });

            if let Err(e) = socket.send(Message::Text(out)).await {
              error!(target: "aprendo_backend", error = %e, "WS send error");
              break;
            }
          }
          Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
          Message::Close(_) => break,
          _ => {}
        }
      }
      _ = tokio::time::sleep_until(wake), if deadline.is_some() => {
        let cleared = match view.session.as_mut() {
          Some(s) => s.sweep_expired(Instant::now()),
          None => Vec::new(),
        };
        for (drill_id, target) in cleared {
          debug!(target: "drill", %drill_id, drop_target = %target, "Mismatch flag cleared");
          let msg = ServerWsMessage::MatchFlagCleared { drill_id, target };
          let out = serde_json::to_string(&msg).unwrap_or_default();
          if socket.send(Message::Text(out)).await.is_err() {
            return;
          }
        }
      }
    }
  }
  info!(target: "aprendo_backend", "WebSocket disconnected");
}

#[instrument(level = "info", skip_all)]
async fn handle_client_ws(
  msg: ClientWsMessage,
  state: &AppState,
  view: &mut LessonView,
) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::OpenLesson { unit } => {
      let (lesson, origin) = state.choose_lesson(unit).await;
      view.session = Some(DrillSession::new(&lesson));
      info!(target: "drill", unit = lesson.unit, id = %lesson.id, %origin, "WS lesson opened");
      ServerWsMessage::Lesson { lesson: to_out(&lesson) }
    }

    ClientWsMessage::CheckBlanks { drill_id, inputs } => {
      let Some(session) = view.session.as_ref() else { return no_lesson() };
      match session.check_blanks(&drill_id, &inputs, &state.messages) {
        Some(result) => {
          info!(target: "drill", id = %drill_id, correct = result.correct_count, total = result.total, "WS blanks checked");
          ServerWsMessage::BlankResult { drill_id, result }
        }
        None => unknown_drill(&drill_id),
      }
    }

    ClientWsMessage::CheckChoice { drill_id, selected } => {
      let Some(session) = view.session.as_ref() else { return no_lesson() };
      match session.check_choice(&drill_id, selected.as_deref(), &state.messages) {
        Some(result) => ServerWsMessage::ChoiceResult { drill_id, result },
        None => unknown_drill(&drill_id),
      }
    }

    ClientWsMessage::DragStart { drill_id, word } => {
      let Some(session) = view.session.as_mut() else { return no_lesson() };
      match session.drag_start(&drill_id, &word) {
        Some(available) => ServerWsMessage::DragStarted { drill_id, word, available },
        None => unknown_drill(&drill_id),
      }
    }

    ClientWsMessage::DragEnd { drill_id } => {
      if let Some(session) = view.session.as_mut() {
        session.drag_end(&drill_id);
      }
      ServerWsMessage::DragEnded { drill_id }
    }

    ClientWsMessage::DragOver { drill_id, target } => {
      let Some(session) = view.session.as_mut() else { return no_lesson() };
      match session.drag_over(&drill_id, &target) {
        Some(droppable) => ServerWsMessage::DragOverResult { drill_id, target, droppable },
        None => unknown_drill(&drill_id),
      }
    }

    ClientWsMessage::DragLeave { drill_id, target } => {
      if let Some(session) = view.session.as_mut() {
        session.drag_leave(&drill_id, &target);
      }
      ServerWsMessage::DragLeft { drill_id, target }
    }

    ClientWsMessage::Drop { drill_id, target, word } => {
      let Some(session) = view.session.as_mut() else { return no_lesson() };
      match session.handle_drop(&drill_id, &target, word.as_deref(), Instant::now(), &state.messages) {
        Some(outcome) => {
          info!(target: "drill", id = %drill_id, drop_target = %target, outcome = ?outcome, "WS drop handled");
          ServerWsMessage::DropResult {
            drill_id,
            target,
            outcome: to_drop_out(outcome, &state.messages),
          }
        }
        None => unknown_drill(&drill_id),
      }
    }

    ClientWsMessage::Register { email, password } => {
      let Some(auth) = &state.auth else {
        return ServerWsMessage::Error { message: "Auth service not configured.".into() };
      };
      match auth.register(&email, &password).await {
        Ok(learner) => {
          if let Some(store) = &state.progress {
            if let Err(e) = store.create_initial(&learner).await {
              error!(target: "aprendo_backend", uid = %learner.uid, error = %e, "Initial progress document creation failed; continuing without it.");
            }
          }
          let reply = ServerWsMessage::SignedIn { uid: learner.uid.clone(), email: learner.email.clone() };
          view.learner = Some(learner);
          reply
        }
        Err(e) => ServerWsMessage::Error { message: e },
      }
    }

    ClientWsMessage::Login { email, password } => {
      let Some(auth) = &state.auth else {
        return ServerWsMessage::Error { message: "Auth service not configured.".into() };
      };
      match auth.sign_in(&email, &password).await {
        Ok(learner) => {
          let reply = ServerWsMessage::SignedIn { uid: learner.uid.clone(), email: learner.email.clone() };
          view.learner = Some(learner);
          reply
        }
        Err(e) => ServerWsMessage::Error { message: e },
      }
    }

    ClientWsMessage::Logout => {
      view.learner = None;
      ServerWsMessage::SignedOut
    }

    ClientWsMessage::LoadProgress => {
      let Some(learner) = view.learner.as_ref() else {
        return sign_in_first(state);
      };
      let Some(store) = &state.progress else {
        return ServerWsMessage::Error { message: "Progress store not configured.".into() };
      };
      match store.load(&learner.uid).await {
        Ok(progress) => ServerWsMessage::Progress { progress },
        Err(e) => ServerWsMessage::Error { message: e },
      }
    }

    ClientWsMessage::SaveProgress { unit, exercise } => {
      let Some(learner) = view.learner.as_ref() else {
        return sign_in_first(state);
      };
      let Some(store) = &state.progress else {
        return ServerWsMessage::Error { message: "Progress store not configured.".into() };
      };
      match store.save(learner, unit, exercise).await {
        Ok(()) => ServerWsMessage::ProgressSaved { unit, exercise },
        Err(e) => ServerWsMessage::Error { message: e },
      }
    }
  }
}

fn no_lesson() -> ServerWsMessage {
  ServerWsMessage::Error { message: "Open a lesson first.".into() }
}

fn unknown_drill(drill_id: &str) -> ServerWsMessage {
  ServerWsMessage::Error { message: format!("Unknown drill: {}", drill_id) }
}

fn sign_in_first(state: &AppState) -> ServerWsMessage {
  ServerWsMessage::Notice {
    feedback: Feedback {
      tone: FeedbackTone::Warning,
      text: state.messages.progress_sign_in_first.clone(),
    },
  }
}
