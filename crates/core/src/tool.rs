//! Tool trait — the abstraction over backend capabilities.
//!
//! Each tool wraps one backend operation (list groups, create an article,
//! search files...) behind a JSON-schema typed interface the LLM can call.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use crate::error::ToolError;
use crate::provider::ToolDefinition;

/// A request to execute a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique call ID (matches the LLM's tool_call.id)
    pub id: String,

    /// Name of the tool to execute
    pub name: String,

    /// Arguments as a JSON value
    pub arguments: serde_json::Value,
}

/// The result of a tool execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// The call ID this result is for
    pub call_id: String,

    /// Whether the tool executed successfully
    pub success: bool,

    /// The text handed back to the LLM
    pub output: String,
}

impl ToolResult {
    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            call_id: String::new(),
            success: true,
            output: output.into(),
        }
    }

    /// A failed execution, rendered as `Error: <message>`.
    pub fn error(message: impl std::fmt::Display) -> Self {
        Self {
            call_id: String::new(),
            success: false,
            output: format!("Error: {message}"),
        }
    }
}

/// The core Tool trait.
///
/// Implementations are expected to be fail-soft: backend failures come back
/// as an unsuccessful [`ToolResult`], not as `Err`. `Err` is reserved for
/// problems the registry itself can report, and [`ToolRegistry::invoke`]
/// turns those into strings too.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "jamespot_list_groups").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the LLM).
    fn description(&self) -> &str;

    /// JSON Schema describing this tool's parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute the tool with the given arguments.
    async fn execute(&self, arguments: serde_json::Value) -> std::result::Result<ToolResult, ToolError>;

    /// Convert this tool into a ToolDefinition for sending to the LLM.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// An ordered catalog of tools with unique names.
///
/// The agent loop uses this to:
/// 1. Get tool definitions to send to the LLM, in registration order
/// 2. Look up and execute tools when the LLM requests them
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Register a tool. A second tool with an existing name is rejected.
    pub fn register(&mut self, tool: Box<dyn Tool>) -> std::result::Result<(), ToolError> {
        let name = tool.name().to_string();
        if self.index.contains_key(&name) {
            return Err(ToolError::DuplicateName(name));
        }
        self.index.insert(name, self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    /// Register every tool of a group, stopping at the first duplicate.
    pub fn extend(&mut self, tools: impl IntoIterator<Item = Box<dyn Tool>>) -> std::result::Result<(), ToolError> {
        for tool in tools {
            self.register(tool)?;
        }
        Ok(())
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.index.get(name).map(|&i| self.tools[i].as_ref())
    }

    /// Get all tool definitions (for sending to the LLM).
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.to_definition()).collect()
    }

    /// Execute a tool call.
    pub async fn execute(&self, call: &ToolCall) -> std::result::Result<ToolResult, ToolError> {
        let tool = self.get(&call.name).ok_or_else(|| ToolError::NotFound(call.name.clone()))?;
        let mut result = tool.execute(call.arguments.clone()).await?;
        result.call_id = call.id.clone();
        Ok(result)
    }

    /// Execute a tool call, folding every failure into the result text.
    pub async fn invoke(&self, call: &ToolCall) -> ToolResult {
        match self.execute(call).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(tool = %call.name, error = %e, "Tool call failed");
                ToolResult {
                    call_id: call.id.clone(),
                    ..ToolResult::error(e)
                }
            }
        }
    }

    /// List all registered tool names, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A simple test tool for unit tests.
    struct EchoTool(&'static str);

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str { self.0 }
        fn description(&self) -> &str { "Echoes back the input" }
        fn parameters_schema(&self) -> serde_json::Value {
            serde_json::json!({
                "type": "object",
                "properties": {
                    "text": { "type": "string" }
                },
                "required": ["text"]
            })
        }
        async fn execute(&self, arguments: serde_json::Value) -> std::result::Result<ToolResult, ToolError> {
            let text = arguments["text"]
                .as_str()
                .ok_or_else(|| ToolError::InvalidArguments("missing 'text'".into()))?;
            Ok(ToolResult::ok(text))
        }
    }

    fn call(name: &str, arguments: serde_json::Value) -> ToolCall {
        ToolCall { id: "call_1".into(), name: name.into(), arguments }
    }

    #[test]
    fn registry_register_and_lookup() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool("echo"))).unwrap();
        assert!(registry.get("echo").is_some());
        assert!(registry.get("nonexistent").is_none());
    }

    #[test]
    fn registry_rejects_duplicate_names() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool("echo"))).unwrap();
        let err = registry.register(Box::new(EchoTool("echo"))).unwrap_err();
        assert!(matches!(err, ToolError::DuplicateName(ref n) if n == "echo"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn registry_keeps_registration_order() {
        let mut registry = ToolRegistry::new();
        registry
            .extend([
                Box::new(EchoTool("zeta")) as Box<dyn Tool>,
                Box::new(EchoTool("alpha")),
                Box::new(EchoTool("mid")),
            ])
            .unwrap();
        assert_eq!(registry.names(), vec!["zeta", "alpha", "mid"]);
        let defs = registry.definitions();
        assert_eq!(defs[1].name, "alpha");
    }

    #[tokio::test]
    async fn registry_execute_tool() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool("echo"))).unwrap();

        let result = registry.execute(&call("echo", serde_json::json!({"text": "hello world"}))).await.unwrap();
        assert!(result.success);
        assert_eq!(result.output, "hello world");
        assert_eq!(result.call_id, "call_1");
    }

    #[tokio::test]
    async fn invoke_turns_unknown_tool_into_error_text() {
        let registry = ToolRegistry::new();
        let result = registry.invoke(&call("jamespot_frobnicate", serde_json::json!({}))).await;
        assert!(!result.success);
        assert_eq!(result.call_id, "call_1");
        assert_eq!(result.output, "Error: Tool not found: jamespot_frobnicate");
    }

    #[tokio::test]
    async fn invoke_turns_argument_errors_into_error_text() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool("echo"))).unwrap();
        let result = registry.invoke(&call("echo", serde_json::json!({}))).await;
        assert!(!result.success);
        assert!(result.output.starts_with("Error: "));
        assert!(result.output.contains("text"));
    }
}
