//! Aprendo · Interactive Drill Backend
//!
//! - Axum HTTP + WebSocket API driving the drill engine
//! - Optional remote auth + progress-store integration (via env variables)
//! - Static SPA fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT          : u16 (default 3000)
//!   AUTH_API_KEY    : enables the auth service if present
//!   AUTH_BASE_URL    : default "https://identitytoolkit.googleapis.com/v1"
//!   PROGRESS_BASE_URL  : enables the progress document store if present
//!   LESSON_CONFIG_PATH  : path to TOML config (messages + optional lesson bank)
//!   LOG_LEVEL    : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT      : "pretty" (default) or "json"

mod telemetry;
mod util;
mod domain;
mod config;
mod seeds;
mod state;
mod protocol;
mod feedback;
mod blanks;
mod choice;
mod matching;
mod registry;
mod auth;
mod progress;
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

  // Build shared application state (in-memory lesson stores, remote clients, messages).
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
  info!(target: "aprendo_backend", %addr, "HTTP server listening");
  axum::serve(listener, app).await?;
  Ok(())
}
