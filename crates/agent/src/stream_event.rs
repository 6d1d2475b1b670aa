//! Agent-level streaming events.
//!
//! `AgentStreamEvent` wraps provider-level stream chunks into higher-level
//! events that the terminal driver renders while a turn is in flight.

use jamespot_core::provider::{ChunkMode, Usage};
use serde::{Deserialize, Serialize};

/// Events emitted by the agent during streaming execution.
///
/// - `chunk`       new text from the LLM
/// - `tool_call`   the agent is invoking a tool
/// - `tool_result` tool execution completed
/// - `done`        the turn produced a final answer
/// - `error`       the turn was aborted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentStreamEvent {
    /// Text not shown yet.
    Chunk { content: String },

    /// The agent is calling a tool.
    ToolCall {
        id: String,
        name: String,
        input: serde_json::Value,
    },

    /// Tool execution completed.
    ToolResult {
        id: String,
        name: String,
        output: String,
        success: bool,
    },

    /// The turn is complete.
    Done {
        roundtrips: u32,
        tool_calls_made: usize,
        usage: Option<Usage>,
    },

    /// The turn was aborted.
    Error { message: String },
}

impl AgentStreamEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Chunk { .. } => "chunk",
            Self::ToolCall { .. } => "tool_call",
            Self::ToolResult { .. } => "tool_result",
            Self::Done { .. } => "done",
            Self::Error { .. } => "error",
        }
    }
}

/// Turns raw chunk contents into the text still to display.
///
/// In snapshot mode a chunk that strictly extends the accumulated text only
/// yields its new suffix. A snapshot that is not an extension replaces the
/// accumulated text and is yielded whole.
#[derive(Debug, Default)]
pub struct StreamMerger {
    mode: ChunkMode,
    text: String,
}

impl StreamMerger {
    pub fn new(mode: ChunkMode) -> Self {
        Self {
            mode,
            text: String::new(),
        }
    }

    /// Feed one chunk; returns what has not been displayed yet, if anything.
    pub fn push(&mut self, chunk: &str) -> Option<String> {
        if chunk.is_empty() {
            return None;
        }

        match self.mode {
            ChunkMode::Delta => {
                self.text.push_str(chunk);
                Some(chunk.to_string())
            }
            ChunkMode::Snapshot => {
                let fresh = match chunk.strip_prefix(self.text.as_str()) {
                    Some("") => return None,
                    Some(suffix) => suffix.to_string(),
                    None => chunk.to_string(),
                };
                self.text = chunk.to_string();
                Some(fresh)
            }
        }
    }

    /// Everything accumulated so far.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(mode: ChunkMode, chunks: &[&str]) -> (Vec<String>, String) {
        let mut merger = StreamMerger::new(mode);
        let shown = chunks.iter().filter_map(|c| merger.push(c)).collect();
        (shown, merger.into_text())
    }

    #[test]
    fn deltas_are_appended() {
        let (shown, text) = feed(ChunkMode::Delta, &["Hel", "lo", "", " world"]);
        assert_eq!(shown, vec!["Hel", "lo", " world"]);
        assert_eq!(text, "Hello world");
    }

    #[test]
    fn extending_snapshots_only_show_the_suffix() {
        let (shown, text) = feed(ChunkMode::Snapshot, &["Hel", "Hello", "Hello", "Hello world"]);
        assert_eq!(shown, vec!["Hel", "lo", " world"]);
        assert_eq!(shown.concat(), text);
    }

    #[test]
    fn corrected_snapshot_is_flushed_whole() {
        let (shown, text) = feed(ChunkMode::Snapshot, &["The group", "The groups are", "Two groups"]);
        assert_eq!(shown, vec!["The group", "s are", "Two groups"]);
        assert_eq!(text, "Two groups");
    }

    #[test]
    fn event_serialization_uses_type_tag() {
        let event = AgentStreamEvent::ToolCall {
            id: "call_1".into(),
            name: "jamespot_list_groups".into(),
            input: serde_json::json!({"limit": 5}),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"tool_call""#));
        assert!(json.contains(r#""name":"jamespot_list_groups""#));

        let back: AgentStreamEvent = serde_json::from_str(r#"{"type":"chunk","content":"hi"}"#).unwrap();
        assert_eq!(back, AgentStreamEvent::Chunk { content: "hi".into() });
    }

    #[test]
    fn event_type_names() {
        let done = AgentStreamEvent::Done {
            roundtrips: 2,
            tool_calls_made: 1,
            usage: None,
        };
        assert_eq!(done.event_type(), "done");
        assert_eq!(AgentStreamEvent::Error { message: "x".into() }.event_type(), "error");
        assert_eq!(
            AgentStreamEvent::ToolResult {
                id: "a".into(),
                name: "b".into(),
                output: "c".into(),
                success: true,
            }
            .event_type(),
            "tool_result"
        );
    }
}
