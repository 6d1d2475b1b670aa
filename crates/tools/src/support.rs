//! Shared plumbing for every tool: the injected backend handle, argument
//! readers, result rendering and debug logging.

use jamespot_core::backend::{BackendClient, UserProfile};
use jamespot_core::error::BackendError;
use jamespot_core::tool::ToolResult;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

const LOG_PREVIEW_CHARS: usize = 500;

/// What every backend tool captures at construction time.
pub struct ToolContext {
    pub client: Arc<dyn BackendClient>,
    pub user: UserProfile,
    pub debug: bool,
}

impl ToolContext {
    pub fn new(client: Arc<dyn BackendClient>, user: UserProfile, debug: bool) -> Arc<Self> {
        Arc::new(Self { client, user, debug })
    }

    pub fn backend_url(&self) -> &str {
        self.client.backend_url().trim_end_matches('/')
    }

    /// Run one backend operation and unwrap its envelope.
    ///
    /// `fallback` is the message used when the backend fails without one.
    pub async fn call(&self, operation: &str, params: Value, fallback: &str) -> Result<Value, BackendError> {
        if self.debug {
            debug!(operation, params = %params, "Backend call");
        }
        let started = Instant::now();
        let envelope = self.client.call(operation, params).await?;
        if self.debug {
            debug!(
                operation,
                error = envelope.error,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Backend response"
            );
        }
        envelope.into_result(fallback)
    }

    /// Full object URL for a path such as `/article/12`.
    pub fn full_url(&self, url_path: &str) -> String {
        format!("{}{}", self.backend_url(), url_path)
    }
}

/// Pretty JSON, the format every successful tool answers with.
pub fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

pub fn log_input(debug: bool, tool: &str, arguments: &Value) {
    if debug {
        debug!(tool, arguments = %arguments, "Tool called");
    }
}

pub fn log_output(debug: bool, tool: &str, result: &ToolResult) {
    if debug {
        debug!(tool, success = result.success, output = %preview(&result.output), "Tool finished");
    }
}

/// Turn a tool body's outcome into the string handed to the LLM.
pub fn finish(debug: bool, tool: &str, outcome: Result<String, String>) -> ToolResult {
    let result = match outcome {
        Ok(output) => ToolResult::ok(output),
        Err(message) => ToolResult::error(message),
    };
    log_output(debug, tool, &result);
    result
}

fn preview(text: &str) -> String {
    match text.char_indices().nth(LOG_PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}... (truncated)", &text[..cut]),
        None => text.to_string(),
    }
}

/// Normalize an id or uri to `<prefix>/<id>`.
pub fn to_uri(prefix: &str, id: &str) -> String {
    let id = id.trim();
    if id.starts_with(&format!("{prefix}/")) {
        id.to_string()
    } else {
        format!("{prefix}/{id}")
    }
}

/// Typed readers over the LLM's argument object.
///
/// Errors are plain messages; tools report them as `Error: <message>`.
pub mod args {
    use super::*;

    fn missing(key: &str) -> String {
        format!("Missing required argument '{key}'")
    }

    pub fn string<'a>(arguments: &'a Value, key: &str) -> Result<&'a str, String> {
        opt_string(arguments, key).ok_or_else(|| missing(key))
    }

    pub fn opt_string<'a>(arguments: &'a Value, key: &str) -> Option<&'a str> {
        arguments.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
    }

    /// An id the model may send as a number or as a string.
    pub fn id_text(arguments: &Value, key: &str) -> Result<String, String> {
        match arguments.get(key) {
            Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
            Some(Value::Number(n)) => Ok(n.to_string()),
            _ => Err(missing(key)),
        }
    }

    /// A numeric argument; numeric strings are accepted.
    pub fn number(arguments: &Value, key: &str) -> Result<i64, String> {
        match arguments.get(key) {
            None | Some(Value::Null) => Err(missing(key)),
            Some(value) => as_i64(value).ok_or_else(|| format!("Argument '{key}' must be a number")),
        }
    }

    pub fn opt_number(arguments: &Value, key: &str) -> Option<i64> {
        arguments.get(key).and_then(as_i64)
    }

    pub fn number_or(arguments: &Value, key: &str, default: i64) -> i64 {
        opt_number(arguments, key).unwrap_or(default)
    }

    pub fn opt_bool(arguments: &Value, key: &str) -> Option<bool> {
        arguments.get(key).and_then(Value::as_bool)
    }

    fn as_i64(value: &Value) -> Option<i64> {
        match value {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Copy the listed keys that are present and non-null.
    pub fn pick(arguments: &Value, keys: &[&str]) -> Map<String, Value> {
        keys.iter()
            .filter_map(|key| match arguments.get(*key) {
                None | Some(Value::Null) => None,
                Some(value) => Some((key.to_string(), value.clone())),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn uri_normalization() {
        assert_eq!(to_uri("user", "123"), "user/123");
        assert_eq!(to_uri("user", "user/123"), "user/123");
        assert_eq!(to_uri("article", " 9 "), "article/9");
    }

    #[test]
    fn preview_truncates_long_output() {
        let long = "x".repeat(600);
        let shown = preview(&long);
        assert!(shown.ends_with("... (truncated)"));
        assert_eq!(shown.len(), 500 + "... (truncated)".len());
        assert_eq!(preview("short"), "short");
    }

    #[test]
    fn finish_prefixes_errors() {
        let result = finish(false, "t", Err("not found".into()));
        assert!(!result.success);
        assert_eq!(result.output, "Error: not found");
        assert_eq!(finish(false, "t", Ok("{}".into())).output, "{}");
    }

    #[test]
    fn argument_readers() {
        let a = json!({"id": "42", "n": 7, "s": "", "flag": true, "f": 2.0});
        assert_eq!(args::number(&a, "id").unwrap(), 42);
        assert_eq!(args::number(&a, "f").unwrap(), 2);
        assert_eq!(args::id_text(&a, "n").unwrap(), "7");
        assert!(args::string(&a, "s").is_err());
        assert_eq!(args::opt_bool(&a, "flag"), Some(true));
        assert_eq!(args::number_or(&a, "missing", 50), 50);
        assert_eq!(
            args::number(&a, "missing").unwrap_err(),
            "Missing required argument 'missing'"
        );
    }

    #[test]
    fn pick_skips_absent_and_null() {
        let a = json!({"title": "T", "place": null, "allDay": false});
        let picked = args::pick(&a, &["title", "place", "allDay", "token"]);
        assert_eq!(Value::Object(picked), json!({"title": "T", "allDay": false}));
    }
}
