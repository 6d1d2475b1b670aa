//! Scripted backend for tool tests.

use crate::support::ToolContext;
use async_trait::async_trait;
use jamespot_core::backend::{BackendClient, Envelope, UserProfile};
use jamespot_core::error::BackendError;
use jamespot_core::tool::Tool;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct State {
    responses: HashMap<String, Envelope>,
    calls: Vec<(String, Value)>,
    pages: Vec<(Vec<(String, String)>, bool)>,
}

/// Answers each operation with a fixed envelope; unknown operations fail at
/// the transport level.
#[derive(Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<State>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, operation: &str, envelope: Envelope) -> Self {
        self.state.lock().unwrap().responses.insert(operation.to_string(), envelope);
        self
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Params of the first call to `operation`.
    pub fn params_of(&self, operation: &str) -> Option<Value> {
        self.calls().into_iter().find(|(op, _)| op == operation).map(|(_, p)| p)
    }

    /// Query pairs of every page fetched, and whether a form was posted.
    pub fn pages(&self) -> Vec<(Vec<(String, String)>, bool)> {
        self.state.lock().unwrap().pages.clone()
    }
}

#[async_trait]
impl BackendClient for MockBackend {
    fn backend_url(&self) -> &str {
        "https://test.jamespot.pro"
    }

    async fn login(&self, _email: &str, _password: &str) -> Result<UserProfile, BackendError> {
        Ok(test_user())
    }

    async fn call(&self, operation: &str, params: Value) -> Result<Envelope, BackendError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push((operation.to_string(), params));
        state
            .responses
            .get(operation)
            .cloned()
            .ok_or_else(|| BackendError::Transport(format!("connection refused ({operation})")))
    }

    async fn fetch_page(&self, query: &[(&str, &str)], form: Option<&[(&str, &str)]>) -> Result<String, BackendError> {
        let query = query.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        self.state.lock().unwrap().pages.push((query, form.is_some()));
        Ok("<html></html>".into())
    }
}

pub fn test_user() -> UserProfile {
    UserProfile::from_value(json!({
        "id": 123,
        "firstname": "Test",
        "lastname": "User",
        "uri": "user/123",
        "mail": "test@example.com"
    }))
    .unwrap()
}

pub fn ctx(backend: &MockBackend) -> Arc<ToolContext> {
    ToolContext::new(Arc::new(backend.clone()), test_user(), false)
}

pub fn find<'a>(tools: &'a [Box<dyn Tool>], name: &str) -> &'a dyn Tool {
    tools
        .iter()
        .find(|t| t.name() == name)
        .unwrap_or_else(|| panic!("no tool named {name}"))
        .as_ref()
}
