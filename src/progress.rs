//! Keyed document store for learner progress.
//!
//! The interface is deliberately tiny: read a learner's document ("not
//! found" is a value, not an error), partially update the unit/exercise
//! fields, and create the initial document for fresh registrations. The
//! store stamps `last_update` on write; we never send a timestamp. The
//! learner identity is passed explicitly into the calls that need it.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::StatusCode;
use serde::Serialize;
use tracing::{info, instrument};

use crate::domain::{Learner, Progress};

#[derive(Clone)]
pub struct ProgressStore {
  pub client: reqwest::Client,
  pub base_url: String,
}

/// Partial-update payload: only the fields a save touches.
#[derive(Serialize)]
struct ProgressPatch {
  last_unit: u32,
  last_exercise: u32,
}

impl ProgressStore {
  /// Construct the client if we find PROGRESS_BASE_URL; otherwise None.
  pub fn from_env() -> Option<Self> {
    let base_url = std::env::var("PROGRESS_BASE_URL").ok()?;

    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(15))
      .build()
      .ok()?;

    Some(Self { client, base_url })
  }

  /// Read a learner's stored progress. A missing document is `None`.
  #[instrument(level = "info", skip(self), fields(%uid))]
  pub async fn load(&self, uid: &str) -> Result<Option<Progress>, String> {
    let url = format!("{}/progress/{}", self.base_url, uid);
    let res = self
      .client
      .get(&url)
      .header(USER_AGENT, "aprendo-backend/0.1")
      .send()
      .await
      .map_err(|e| e.to_string())?;

    if res.status() == StatusCode::NOT_FOUND {
      return Ok(None);
    }
    if !res.status().is_success() {
      return Err(format!("Progress store HTTP {}", res.status()));
    }
    let progress: Progress = res.json().await.map_err(|e| e.to_string())?;
    Ok(Some(progress))
  }

  /// Partial update: touches only the unit/exercise fields (and the store's
  /// own timestamp), leaving the rest of the document alone.
  #[instrument(level = "info", skip(self, learner), fields(uid = %learner.uid, unit, exercise))]
  pub async fn save(&self, learner: &Learner, unit: u32, exercise: u32) -> Result<(), String> {
    let url = format!("{}/progress/{}", self.base_url, learner.uid);
    let res = self
      .client
      .patch(&url)
      .header(USER_AGENT, "aprendo-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", learner.id_token))
      .json(&ProgressPatch { last_unit: unit, last_exercise: exercise })
      .send()
      .await
      .map_err(|e| e.to_string())?;

    if !res.status().is_success() {
      return Err(format!("Progress store HTTP {}", res.status()));
    }
    info!(target: "aprendo_backend", uid = %learner.uid, unit, exercise, "Progress saved");
    Ok(())
  }

  /// Seed the document for a brand-new account.
  #[instrument(level = "info", skip(self, learner), fields(uid = %learner.uid))]
  pub async fn create_initial(&self, learner: &Learner) -> Result<(), String> {
    let url = format!("{}/progress/{}", self.base_url, learner.uid);
    let res = self
      .client
      .put(&url)
      .header(USER_AGENT, "aprendo-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", learner.id_token))
      .json(&Progress { last_unit: 1, last_exercise: 0, score_total: 0, last_update: None })
      .send()
      .await
      .map_err(|e| e.to_string())?;

    if !res.status().is_success() {
      return Err(format!("Progress store HTTP {}", res.status()));
    }
    Ok(())
  }
}
