//! Minimal client for the remote auth service.
//!
//! Only two calls exist: create an account and exchange credentials for a
//! learner identity. Signing out is a client-side act (the identity value is
//! dropped); the service keeps no session. Calls are instrumented and log
//! outcomes, never credentials or tokens.

use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::domain::Learner;

#[derive(Clone)]
pub struct AuthClient {
  pub client: reqwest::Client,
  pub api_key: String,
  pub base_url: String,
}

#[derive(Serialize)]
struct CredentialsReq<'a> {
  email: &'a str,
  password: &'a str,
  #[serde(rename = "returnSecureToken")]
  return_secure_token: bool,
}

#[derive(Deserialize)]
struct AuthResponse {
  #[serde(rename = "localId")]
  local_id: String,
  email: String,
  #[serde(rename = "idToken")]
  id_token: String,
}

impl AuthClient {
  /// Construct the client if we find AUTH_API_KEY; otherwise return None.
  pub fn from_env() -> Option<Self> {
    let api_key = std::env::var("AUTH_API_KEY").ok()?;
    let base_url = std::env::var("AUTH_BASE_URL")
      .unwrap_or_else(|_| "https://identitytoolkit.googleapis.com/v1".into());

    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(15))
      .build()
      .ok()?;

    Some(Self { client, api_key, base_url })
  }

  /// Create a new account and sign it in.
  #[instrument(level = "info", skip(self, password), fields(email_len = email.len()))]
  pub async fn register(&self, email: &str, password: &str) -> Result<Learner, String> {
    self.call("signUp", email, password).await
  }

  /// Exchange credentials for a learner identity.
  #[instrument(level = "info", skip(self, password), fields(email_len = email.len()))]
  pub async fn sign_in(&self, email: &str, password: &str) -> Result<Learner, String> {
    self.call("signInWithPassword", email, password).await
  }

  async fn call(&self, action: &str, email: &str, password: &str) -> Result<Learner, String> {
    let url = format!("{}/accounts:{}?key={}", self.base_url, action, self.api_key);
    let req = CredentialsReq { email, password, return_secure_token: true };

    let res = self
      .client
      .post(&url)
      .header(USER_AGENT, "aprendo-backend/0.1")
      .header(CONTENT_TYPE, "application/json")
      .json(&req)
      .send()
      .await
      .map_err(|e| e.to_string())?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      let msg = extract_auth_error(&body).unwrap_or(body);
      return Err(format!("Auth HTTP {}: {}", status, msg));
    }

    let body: AuthResponse = res.json().await.map_err(|e| e.to_string())?;
    info!(target: "aprendo_backend", uid = %body.local_id, "Auth call succeeded");
    Ok(Learner { uid: body.local_id, email: body.email, id_token: body.id_token })
  }
}

/// Pull the service's error message out of its JSON error envelope.
fn extract_auth_error(body: &str) -> Option<String> {
  let v: serde_json::Value = serde_json::from_str(body).ok()?;
  v.get("error")?.get("message")?.as_str().map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
  use super::*;
  use wiremock::matchers::{method, path, query_param};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  fn client_for(server: &MockServer) -> AuthClient {
    AuthClient {
      client: reqwest::Client::new(),
      api_key: "k1".into(),
      base_url: server.uri(),
    }
  }

  #[tokio::test]
  async fn sign_in_maps_the_service_response() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/accounts:signInWithPassword"))
      .and(query_param("key", "k1"))
      .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "localId": "u1",
        "email": "ana@example.com",
        "idToken": "tok-1",
      })))
      .mount(&server)
      .await;

    let client = client_for(&server);
    let learner = client.sign_in("ana@example.com", "secret").await.expect("sign in");
    assert_eq!(learner.uid, "u1");
    assert_eq!(learner.email, "ana@example.com");
    assert_eq!(learner.id_token, "tok-1");
  }

  #[tokio::test]
  async fn errors_surface_the_service_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/accounts:signUp"))
      .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
        "error": { "message": "EMAIL_EXISTS" }
      })))
      .mount(&server)
      .await;

    let client = client_for(&server);
    let err = client.register("ana@example.com", "secret").await.expect_err("should fail");
    assert!(err.contains("EMAIL_EXISTS"), "unexpected error: {err}");
  }
}
