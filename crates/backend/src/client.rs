//! Jamespot API client.
//!
//! Every operation is a `POST {base}/api/api.php` whose JSON body names the
//! object and function (`{"o": "group", "f": "list", ...params}`). The
//! answer is always an [`Envelope`].

use async_trait::async_trait;
use jamespot_core::backend::{BackendClient, Envelope, UserProfile};
use jamespot_core::error::BackendError;
use reqwest::header::{COOKIE, REFERER};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::cookie::SessionCookie;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Authenticated client for one Jamespot platform.
pub struct JamespotClient {
    base_url: String,
    referer: String,
    token: Option<String>,
    cookie: SessionCookie,
    client: reqwest::Client,
}

impl JamespotClient {
    /// Create a client for `base_url`. No request is made until [`login`](BackendClient::login).
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Result<Self, BackendError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(BackendError::InvalidRequest(format!(
                "backend URL must start with http:// or https://, got '{base_url}'"
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| BackendError::Transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            referer: format!("{base_url}/ng/wall"),
            base_url,
            token,
            cookie: SessionCookie::new(),
            client,
        })
    }

    fn api_url(&self) -> String {
        format!("{}/api/api.php", self.base_url)
    }

    /// Attach session headers, send, and remember any new cookie.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, BackendError> {
        let mut request = request.header(REFERER, &self.referer);
        match self.cookie.get() {
            Some(cookie) => request = request.header(COOKIE, cookie),
            None => debug!("No session cookie yet"),
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                BackendError::Transport(format!("request timed out after {}s", REQUEST_TIMEOUT.as_secs()))
            } else {
                BackendError::Transport(e.to_string())
            }
        })?;

        if self.cookie.update_from(response.headers()) {
            debug!("Session cookie updated");
        }

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), url = %response.url(), "Backend returned HTTP error");
            return Err(BackendError::Transport(format!("HTTP {} from backend", status.as_u16())));
        }
        Ok(response)
    }
}

/// Split `object.function` into its two halves.
fn split_operation(operation: &str) -> Result<(&str, &str), BackendError> {
    match operation.split_once('.') {
        Some((object, function)) if !object.is_empty() && !function.is_empty() => Ok((object, function)),
        _ => Err(BackendError::InvalidRequest(format!(
            "operation must look like 'object.function', got '{operation}'"
        ))),
    }
}

#[async_trait]
impl BackendClient for JamespotClient {
    fn backend_url(&self) -> &str {
        &self.base_url
    }

    async fn login(&self, email: &str, password: &str) -> Result<UserProfile, BackendError> {
        let mut params = serde_json::json!({ "login": email, "password": password });
        if let Some(token) = &self.token {
            params["token"] = Value::String(token.clone());
        }

        let envelope = self.call("user.signIn", params).await?;
        let raw = envelope.into_result("Login failed")?;
        let profile = UserProfile::from_value(raw)?;

        info!(user_id = profile.id, name = %profile.display_name(), "Logged in to Jamespot");
        Ok(profile)
    }

    async fn call(&self, operation: &str, params: Value) -> Result<Envelope, BackendError> {
        let (object, function) = split_operation(operation)?;

        let mut body = match params {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                return Err(BackendError::InvalidRequest(format!(
                    "parameters for {operation} must be a JSON object, got {other}"
                )));
            }
        };
        body.insert("o".into(), Value::String(object.into()));
        body.insert("f".into(), Value::String(function.into()));

        debug!(operation, "Backend call");
        let started = std::time::Instant::now();

        let response = self.send(self.client.post(self.api_url()).json(&body)).await?;
        let envelope: Envelope = response
            .json()
            .await
            .map_err(|e| BackendError::Decode(format!("{operation}: {e}")))?;

        debug!(
            operation,
            error = envelope.error,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Backend response"
        );
        Ok(envelope)
    }

    async fn fetch_page(&self, query: &[(&str, &str)], form: Option<&[(&str, &str)]>) -> Result<String, BackendError> {
        let url = format!("{}/", self.base_url);
        debug!(%url, ?query, post = form.is_some(), "Backend page fetch");

        let request = match form {
            Some(fields) => self.client.post(&url).query(query).form(fields),
            None => self.client.get(&url).query(query),
        };
        let response = self.send(request).await?;
        response
            .text()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))
    }
}
