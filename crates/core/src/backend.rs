//! Backend session contract.
//!
//! Every call to the collaboration platform answers with the same envelope:
//! `{ "error": 0, "result": ... }` on success, or
//! `{ "error": <code>, "errorMsg": "..." }` on failure. `error == 0` is the
//! only success signal. Transport problems travel separately as
//! [`BackendError`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::error::BackendError;

/// The uniform result envelope of a backend operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub error: i64,

    #[serde(default)]
    pub result: Value,

    #[serde(default, rename = "errorMsg", skip_serializing_if = "Option::is_none")]
    pub error_msg: Option<String>,
}

impl Envelope {
    pub fn success(result: Value) -> Self {
        Self { error: 0, result, error_msg: None }
    }

    pub fn failure(code: i64, message: impl Into<String>) -> Self {
        Self { error: code, result: Value::Null, error_msg: Some(message.into()) }
    }

    pub fn is_ok(&self) -> bool {
        self.error == 0
    }

    /// Unwrap the payload, or report the backend's message.
    ///
    /// `fallback` is used when the backend fails without an `errorMsg`.
    pub fn into_result(self, fallback: &str) -> Result<Value, BackendError> {
        if self.is_ok() {
            return Ok(self.result);
        }
        let message = self
            .error_msg
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| fallback.to_string());
        Err(BackendError::Api { code: self.error, message })
    }
}

/// The logged-in user, as returned by the sign-in call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub firstname: String,
    pub lastname: String,
    pub uri: String,

    /// The full profile object, for tools that return it verbatim.
    pub raw: Value,
}

impl UserProfile {
    /// Read a profile out of a sign-in payload.
    ///
    /// The id may arrive as a number or a numeric string.
    pub fn from_value(raw: Value) -> Result<Self, BackendError> {
        let id = match &raw["id"] {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
        .ok_or_else(|| BackendError::Decode("user profile has no numeric id".into()))?;

        let text = |key: &str| raw[key].as_str().unwrap_or_default().to_string();
        let firstname = text("firstname");
        let lastname = text("lastname");
        let uri = match raw["uri"].as_str() {
            Some(uri) => uri.to_string(),
            None => format!("user/{id}"),
        };

        Ok(Self { id, firstname, lastname, uri, raw })
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.firstname, self.lastname).trim().to_string()
    }
}

/// Authenticated access to the platform.
///
/// Implementations own the session cookie; callers never see it.
#[async_trait]
pub trait BackendClient: Send + Sync {
    /// Base URL of the platform, without trailing slash.
    fn backend_url(&self) -> &str;

    /// Sign in once; the session is kept for the life of the client.
    async fn login(&self, email: &str, password: &str) -> Result<UserProfile, BackendError>;

    /// Run an `object.function` operation with JSON parameters.
    async fn call(&self, operation: &str, params: Value) -> Result<Envelope, BackendError>;

    /// Fetch a legacy page at the base URL, with `query` encoded into the
    /// query string.
    ///
    /// With `form`, the page is POSTed as `application/x-www-form-urlencoded`.
    async fn fetch_page(&self, query: &[(&str, &str)], form: Option<&[(&str, &str)]>) -> Result<String, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_success_yields_result() {
        let env: Envelope = serde_json::from_value(json!({"error": 0, "result": [1, 2]})).unwrap();
        assert!(env.is_ok());
        assert_eq!(env.into_result("unused").unwrap(), json!([1, 2]));
    }

    #[test]
    fn envelope_failure_prefers_backend_message() {
        let env: Envelope = serde_json::from_value(json!({"error": 1, "errorMsg": "not found"})).unwrap();
        let err = env.into_result("Failed to get group").unwrap_err();
        assert_eq!(err.to_string(), "not found");
        assert!(matches!(err, BackendError::Api { code: 1, .. }));
    }

    #[test]
    fn envelope_failure_without_message_uses_fallback() {
        let env = Envelope { error: 2, result: Value::Null, error_msg: None };
        assert_eq!(env.into_result("Failed to list groups").unwrap_err().to_string(), "Failed to list groups");
    }

    #[test]
    fn profile_from_sign_in_payload() {
        let profile = UserProfile::from_value(json!({
            "id": 123, "firstname": "Test", "lastname": "User", "uri": "user/123"
        }))
        .unwrap();
        assert_eq!(profile.id, 123);
        assert_eq!(profile.display_name(), "Test User");
        assert_eq!(profile.uri, "user/123");
    }

    #[test]
    fn profile_accepts_string_id_and_derives_uri() {
        let profile = UserProfile::from_value(json!({"id": "42", "firstname": "Ada"})).unwrap();
        assert_eq!(profile.id, 42);
        assert_eq!(profile.uri, "user/42");
        assert_eq!(profile.display_name(), "Ada");
    }

    #[test]
    fn profile_without_id_is_rejected() {
        assert!(UserProfile::from_value(json!({"firstname": "Ghost"})).is_err());
    }
}
