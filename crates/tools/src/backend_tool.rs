//! A declarative tool over a single backend operation.
//!
//! Most tools follow the same recipe: read arguments, call one operation,
//! pretty-print the result. [`BackendTool`] captures that recipe as data so
//! each group module only states what differs.

use crate::support::{self, ToolContext};
use async_trait::async_trait;
use jamespot_core::error::ToolError;
use jamespot_core::tool::{Tool, ToolResult};
use serde_json::{json, Value};
use std::sync::Arc;

/// Build the operation params from the LLM's arguments.
pub type ParamsFn = fn(&Value, &ToolContext) -> Result<Value, String>;

/// Shape the envelope result into the tool's answer.
pub type RenderFn = fn(Value, &Value, &ToolContext) -> Value;

pub struct BackendTool {
    ctx: Arc<ToolContext>,
    name: &'static str,
    description: &'static str,
    schema: Value,
    operation: &'static str,
    fallback: &'static str,
    params: ParamsFn,
    render: RenderFn,
}

fn no_params(_: &Value, _: &ToolContext) -> Result<Value, String> {
    Ok(json!({}))
}

fn as_is(result: Value, _: &Value, _: &ToolContext) -> Value {
    result
}

impl BackendTool {
    pub fn new(ctx: &Arc<ToolContext>, name: &'static str, operation: &'static str) -> Self {
        Self {
            ctx: Arc::clone(ctx),
            name,
            description: "",
            schema: json!({"type": "object", "properties": {}}),
            operation,
            fallback: "Operation failed",
            params: no_params,
            render: as_is,
        }
    }

    pub fn with_description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    pub fn with_schema(mut self, schema: Value) -> Self {
        self.schema = schema;
        self
    }

    /// Message used when the backend fails without an `errorMsg`.
    pub fn with_fallback(mut self, fallback: &'static str) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_params(mut self, params: ParamsFn) -> Self {
        self.params = params;
        self
    }

    pub fn with_render(mut self, render: RenderFn) -> Self {
        self.render = render;
        self
    }

    pub fn boxed(self) -> Box<dyn Tool> {
        Box::new(self)
    }

    async fn run(&self, arguments: &Value) -> Result<String, String> {
        let params = (self.params)(arguments, &self.ctx)?;
        let result = self
            .ctx
            .call(self.operation, params, self.fallback)
            .await
            .map_err(|e| e.to_string())?;
        Ok(support::pretty(&(self.render)(result, arguments, &self.ctx)))
    }
}

#[async_trait]
impl Tool for BackendTool {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        self.description
    }

    fn parameters_schema(&self) -> Value {
        self.schema.clone()
    }

    async fn execute(&self, arguments: Value) -> Result<ToolResult, ToolError> {
        support::log_input(self.ctx.debug, self.name, &arguments);
        let outcome = self.run(&arguments).await;
        Ok(support::finish(self.ctx.debug, self.name, outcome))
    }
}
