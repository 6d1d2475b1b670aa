//! The agent reasoning loop implementation.

use crate::stream_event::{AgentStreamEvent, StreamMerger};
use jamespot_core::error::{AgentError, ProviderError, ToolError};
use jamespot_core::message::{Conversation, Message, MessageToolCall};
use jamespot_core::provider::{Provider, ProviderRequest, Usage};
use jamespot_core::tool::{ToolCall, ToolRegistry, ToolResult};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// LLM roundtrips allowed per user turn unless configured otherwise.
pub const DEFAULT_MAX_ROUNDTRIPS: u32 = 25;

/// Summary of a turn that reached a final answer.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnOutcome {
    /// The final assistant text (also appended to the transcript)
    pub text: String,

    /// LLM calls made during the turn
    pub roundtrips: u32,

    /// Tool calls executed during the turn
    pub tool_calls: usize,

    /// Token usage summed over the roundtrips that reported it
    pub usage: Usage,
}

/// The core agent loop that orchestrates LLM calls and tool execution.
pub struct AgentLoop {
    /// The LLM provider to use
    provider: Arc<dyn Provider>,

    /// The model to use
    model: String,

    /// Temperature setting
    temperature: f32,

    /// Default max tokens per response
    max_tokens: Option<u32>,

    /// Tool registry
    tools: Arc<ToolRegistry>,

    /// Ceiling on LLM calls per turn
    max_roundtrips: u32,
}

/// Optional receiver for streaming events.
struct EventSink<'a> {
    callback: Option<&'a mut (dyn FnMut(AgentStreamEvent) + Send)>,
}

impl EventSink<'_> {
    fn is_streaming(&self) -> bool {
        self.callback.is_some()
    }

    fn emit(&mut self, event: AgentStreamEvent) {
        if let Some(callback) = self.callback.as_deref_mut() {
            callback(event);
        }
    }
}

/// What one LLM roundtrip produced.
struct Reply {
    content: String,
    tool_calls: Vec<MessageToolCall>,
    usage: Option<Usage>,
}

impl AgentLoop {
    /// Create a new agent loop.
    pub fn new(
        provider: Arc<dyn Provider>,
        model: impl Into<String>,
        temperature: f32,
        tools: Arc<ToolRegistry>,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature,
            max_tokens: None,
            tools,
            max_roundtrips: DEFAULT_MAX_ROUNDTRIPS,
        }
    }

    /// Set the maximum number of LLM roundtrips per turn.
    pub fn with_max_roundtrips(mut self, max: u32) -> Self {
        self.max_roundtrips = max;
        self
    }

    /// Set the default max tokens per LLM response.
    pub fn with_max_tokens(mut self, max: Option<u32>) -> Self {
        self.max_tokens = max;
        self
    }

    pub fn max_roundtrips(&self) -> u32 {
        self.max_roundtrips
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Run one user turn to completion.
    ///
    /// The caller has already appended the user message. Every assistant
    /// and tool message produced along the way is appended to
    /// `conversation`, including when the turn is aborted.
    pub async fn process(&self, conversation: &mut Conversation) -> Result<TurnOutcome, AgentError> {
        self.run_turn(conversation, EventSink { callback: None }).await
    }

    /// Streaming variant of [`process`](Self::process).
    ///
    /// `on_event` sees new text as it arrives, each tool call and result,
    /// and a closing `Done` or `Error`.
    pub async fn process_stream<F>(
        &self,
        conversation: &mut Conversation,
        mut on_event: F,
    ) -> Result<TurnOutcome, AgentError>
    where
        F: FnMut(AgentStreamEvent) + Send,
    {
        self.run_turn(
            conversation,
            EventSink {
                callback: Some(&mut on_event),
            },
        )
        .await
    }

    async fn run_turn(
        &self,
        conversation: &mut Conversation,
        mut events: EventSink<'_>,
    ) -> Result<TurnOutcome, AgentError> {
        info!(
            conversation_id = %conversation.id,
            messages = conversation.len(),
            streaming = events.is_streaming(),
            "Processing turn"
        );

        let tool_definitions = self.tools.definitions();
        let mut usage = Usage::default();
        let mut tool_calls_made = 0usize;

        for roundtrip in 1..=self.max_roundtrips {
            let request = ProviderRequest {
                model: self.model.clone(),
                messages: conversation.messages.clone(),
                temperature: self.temperature,
                max_tokens: self.max_tokens,
                tools: tool_definitions.clone(),
                stream: events.is_streaming(),
            };

            let started = Instant::now();
            let reply = match self.request(request, &mut events).await {
                Ok(reply) => reply,
                Err(e) => {
                    warn!(roundtrip, error = %e, "LLM call failed, aborting turn");
                    events.emit(AgentStreamEvent::Error { message: e.to_string() });
                    return Err(e.into());
                }
            };

            if let Some(u) = &reply.usage {
                usage.prompt_tokens += u.prompt_tokens;
                usage.completion_tokens += u.completion_tokens;
                usage.total_tokens += u.total_tokens;
            }
            debug!(
                roundtrip,
                tool_calls = reply.tool_calls.len(),
                duration_ms = started.elapsed().as_millis() as u64,
                "LLM roundtrip complete"
            );

            if reply.tool_calls.is_empty() {
                conversation.push(Message::assistant(reply.content.as_str()));
                info!(roundtrips = roundtrip, tool_calls = tool_calls_made, "Turn complete");
                events.emit(AgentStreamEvent::Done {
                    roundtrips: roundtrip,
                    tool_calls_made,
                    usage: Some(usage.clone()),
                });
                return Ok(TurnOutcome {
                    text: reply.content,
                    roundtrips: roundtrip,
                    tool_calls: tool_calls_made,
                    usage,
                });
            }

            conversation.push(Message::assistant_with_calls(reply.content, reply.tool_calls.clone()));

            for call in &reply.tool_calls {
                events.emit(AgentStreamEvent::ToolCall {
                    id: call.id.clone(),
                    name: call.name.clone(),
                    input: serde_json::from_str(&call.arguments)
                        .unwrap_or_else(|_| Value::String(call.arguments.clone())),
                });

                let result = self.run_tool(call).await;
                tool_calls_made += 1;

                events.emit(AgentStreamEvent::ToolResult {
                    id: call.id.clone(),
                    name: call.name.clone(),
                    output: result.output.clone(),
                    success: result.success,
                });
                conversation.push(Message::tool_result(call.id.as_str(), result.output));
            }
        }

        warn!(
            conversation_id = %conversation.id,
            limit = self.max_roundtrips,
            "Roundtrip ceiling reached, aborting turn"
        );
        let err = AgentError::RoundtripLimit { limit: self.max_roundtrips };
        events.emit(AgentStreamEvent::Error { message: err.to_string() });
        Err(err)
    }

    /// One LLM call, streamed when the sink wants events.
    async fn request(&self, request: ProviderRequest, events: &mut EventSink<'_>) -> Result<Reply, ProviderError> {
        if !events.is_streaming() {
            let response = self.provider.complete(request).await?;
            return Ok(Reply {
                content: response.message.content,
                tool_calls: response.message.tool_calls,
                usage: response.usage,
            });
        }

        let mut chunks = self.provider.stream(request).await?;
        let mut merger = StreamMerger::new(self.provider.chunk_mode());
        let mut tool_calls = Vec::new();
        let mut usage = None;

        while let Some(chunk) = chunks.recv().await {
            let chunk = chunk?;
            if let Some(text) = chunk.content.as_deref()
                && let Some(fresh) = merger.push(text)
            {
                events.emit(AgentStreamEvent::Chunk { content: fresh });
            }
            tool_calls.extend(chunk.tool_calls);
            if chunk.usage.is_some() {
                usage = chunk.usage;
            }
            if chunk.done {
                break;
            }
        }

        Ok(Reply {
            content: merger.into_text(),
            tool_calls,
            usage,
        })
    }

    /// Execute one requested call. Never fails: every problem becomes the
    /// `Error: ...` text the LLM reads back.
    async fn run_tool(&self, call: &MessageToolCall) -> ToolResult {
        let started = Instant::now();
        let result = match parse_arguments(&call.arguments) {
            Ok(arguments) => {
                self.tools
                    .invoke(&ToolCall {
                        id: call.id.clone(),
                        name: call.name.clone(),
                        arguments,
                    })
                    .await
            }
            Err(e) => ToolResult {
                call_id: call.id.clone(),
                ..ToolResult::error(ToolError::InvalidArguments(format!("{}: {e}", call.name)))
            },
        };

        info!(
            tool = %call.name,
            success = result.success,
            duration_ms = started.elapsed().as_millis() as u64,
            "Tool executed"
        );
        result
    }
}

/// Some models send an empty string for tools without parameters.
fn parse_arguments(raw: &str) -> Result<Value, serde_json::Error> {
    if raw.trim().is_empty() {
        return Ok(Value::Object(serde_json::Map::new()));
    }
    serde_json::from_str(raw)
}
