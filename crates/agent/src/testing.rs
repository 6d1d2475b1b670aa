//! Scripted providers and stub tools for loop tests.

use async_trait::async_trait;
use jamespot_core::error::{ProviderError, ToolError};
use jamespot_core::message::{Message, MessageToolCall};
use jamespot_core::provider::*;
use jamespot_core::tool::{Tool, ToolResult};
use serde_json::Value;
use std::sync::{Arc, Mutex};

/// One scripted provider answer.
#[derive(Clone)]
pub enum Step {
    Reply(ProviderResponse),
    /// Streamed as the given chunks; `complete` concatenates them.
    Chunks(Vec<StreamChunk>),
    /// Streams the chunks, then breaks.
    Broken(Vec<StreamChunk>),
    Fail(ProviderError),
}

/// Plays its script in order, then repeats the last step forever.
pub struct ScriptedProvider {
    steps: Vec<Step>,
    mode: ChunkMode,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps,
            mode: ChunkMode::Delta,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_mode(mut self, mode: ChunkMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next(&self, request: ProviderRequest) -> Step {
        let mut requests = self.requests.lock().unwrap();
        let index = requests.len().min(self.steps.len() - 1);
        requests.push(request);
        self.steps[index].clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn chunk_mode(&self) -> ChunkMode {
        self.mode
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        match self.next(request) {
            Step::Reply(response) => Ok(response),
            Step::Chunks(chunks) => {
                let content: String = chunks.iter().filter_map(|c| c.content.clone()).collect();
                let calls = chunks.into_iter().flat_map(|c| c.tool_calls).collect();
                Ok(ProviderResponse {
                    message: Message::assistant_with_calls(content, calls),
                    usage: None,
                    model: "mock-model".into(),
                })
            }
            Step::Broken(_) => Err(ProviderError::StreamInterrupted("broken".into())),
            Step::Fail(e) => Err(e),
        }
    }

    async fn stream(&self, request: ProviderRequest) -> Result<ChunkReceiver, ProviderError> {
        let (chunks, broken) = match self.next(request) {
            Step::Reply(response) => (
                vec![StreamChunk {
                    content: Some(response.message.content),
                    tool_calls: response.message.tool_calls,
                    done: true,
                    usage: response.usage,
                }],
                false,
            ),
            Step::Chunks(chunks) => (chunks, false),
            Step::Broken(chunks) => (chunks, true),
            Step::Fail(e) => return Err(e),
        };

        let (tx, rx) = tokio::sync::mpsc::channel(chunks.len() + 1);
        for chunk in chunks {
            let _ = tx.send(Ok(chunk)).await;
        }
        if broken {
            let _ = tx
                .send(Err(ProviderError::StreamInterrupted("connection reset".into())))
                .await;
        }
        Ok(rx)
    }
}

pub fn text_reply(text: &str) -> Step {
    Step::Reply(ProviderResponse {
        message: Message::assistant(text),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    })
}

pub fn tool_reply(calls: Vec<MessageToolCall>) -> Step {
    Step::Reply(ProviderResponse {
        message: Message::assistant_with_calls("", calls),
        usage: None,
        model: "mock-model".into(),
    })
}

pub fn call(id: &str, name: &str, arguments: &str) -> MessageToolCall {
    MessageToolCall {
        id: id.into(),
        name: name.into(),
        arguments: arguments.into(),
    }
}

pub fn text_chunk(text: &str) -> StreamChunk {
    StreamChunk {
        content: Some(text.into()),
        ..Default::default()
    }
}

/// Returns a fixed output and records every argument object it receives.
pub struct StubTool {
    name: String,
    output: Result<String, String>,
    seen: Arc<Mutex<Vec<Value>>>,
}

impl StubTool {
    pub fn ok(name: &str, output: &str) -> Self {
        Self {
            name: name.into(),
            output: Ok(output.into()),
            seen: Arc::default(),
        }
    }

    pub fn failing(name: &str, message: &str) -> Self {
        Self {
            name: name.into(),
            output: Err(message.into()),
            seen: Arc::default(),
        }
    }

    pub fn seen(&self) -> Arc<Mutex<Vec<Value>>> {
        Arc::clone(&self.seen)
    }
}

#[async_trait]
impl Tool for StubTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "stub"
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({"type": "object", "properties": {}})
    }

    async fn execute(&self, arguments: Value) -> Result<ToolResult, ToolError> {
        self.seen.lock().unwrap().push(arguments);
        Ok(match &self.output {
            Ok(output) => ToolResult::ok(output.clone()),
            Err(message) => ToolResult::error(message),
        })
    }
}
