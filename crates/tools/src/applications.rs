//! Application (module) tools.
//!
//! Install and uninstall still go through the legacy admin pages, so they
//! need a CSRF token and authenticated page fetches on top of API calls.

use crate::backend_tool::BackendTool;
use crate::support::{self, args, ToolContext};
use async_trait::async_trait;
use jamespot_core::error::ToolError;
use jamespot_core::tool::{Tool, ToolResult};
use serde_json::{json, Value};
use std::sync::Arc;

/// Hook names end up in a query string; keep them to a safe alphabet.
fn hook_name(arguments: &Value) -> Result<&str, String> {
    let hook = args::string(arguments, "hook")?;
    if hook.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        Ok(hook)
    } else {
        Err(format!("Invalid hook name '{hook}'"))
    }
}

fn hook_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "hook": { "type": "string", "description": "Hook Name." }
        },
        "required": ["hook"]
    })
}

async fn csrf_token(ctx: &ToolContext) -> Result<String, String> {
    let token = ctx
        .call("network.tokenCSRF", json!({}), "Failed to get CSRF token")
        .await
        .map_err(|e| e.to_string())?;
    match token {
        Value::String(s) => Ok(s),
        other => Ok(other.to_string()),
    }
}

/// Installs or uninstalls an application.
pub struct ManageApplicationTool {
    ctx: Arc<ToolContext>,
    install: bool,
}

impl ManageApplicationTool {
    async fn run(&self, arguments: &Value) -> Result<String, String> {
        let hook = hook_name(arguments)?;
        let token = csrf_token(&self.ctx).await?;
        let flag = if self.install { "1" } else { "0" };

        self.ctx
            .client
            .fetch_page(
                &[
                    ("action", "manageApps_install"),
                    ("name", hook),
                    ("install", flag),
                    ("tokenCSRF", token.as_str()),
                ],
                None,
            )
            .await
            .map_err(|e| e.to_string())?;

        if self.install {
            self.ctx
                .client
                .fetch_page(
                    &[("action", "manageApps_configure"), ("name", hook)],
                    Some(&[("page", "update-config"), ("use", "1")]),
                )
                .await
                .map_err(|e| e.to_string())?;
            self.ctx
                .call(
                    "module.setConfiguration",
                    json!({"moduleName": hook, "active": true, "accessRight": 0}),
                    "Failed to install applications",
                )
                .await
                .map_err(|e| e.to_string())?;
        }

        let verb = if self.install { "installed" } else { "uninstalled" };
        Ok(support::pretty(&json!({
            "success": true,
            "message": format!("Application {hook} {verb} successfully"),
        })))
    }
}

#[async_trait]
impl Tool for ManageApplicationTool {
    fn name(&self) -> &str {
        if self.install {
            "jamespot_install_application"
        } else {
            "jamespot_uninstall_application"
        }
    }

    fn description(&self) -> &str {
        if self.install {
            "Install application. Application ID must be provided as a \"hook\" name."
        } else {
            "Uninstall application. Application ID must be provided as a \"hook\" name."
        }
    }

    fn parameters_schema(&self) -> Value {
        hook_schema()
    }

    async fn execute(&self, arguments: Value) -> Result<ToolResult, ToolError> {
        support::log_input(self.ctx.debug, self.name(), &arguments);
        let outcome = self.run(&arguments).await;
        Ok(support::finish(self.ctx.debug, self.name(), outcome))
    }
}

pub fn tools(ctx: &Arc<ToolContext>) -> Vec<Box<dyn Tool>> {
    vec![
        BackendTool::new(ctx, "jamespot_list_applications", "application.list")
            .with_description(
                "List all available applications in Jamespot. Returns application details including name, icon, URL, description, and available actions.",
            )
            .with_fallback("Failed to list applications")
            .boxed(),
        Box::new(ManageApplicationTool { ctx: Arc::clone(ctx), install: true }),
        Box::new(ManageApplicationTool { ctx: Arc::clone(ctx), install: false }),
        BackendTool::new(ctx, "jamespot_application_configuration", "module.getConfiguration")
            .with_description("Get Application configuration. Application ID must be provided as a \"hook\" name.")
            .with_schema(hook_schema())
            .with_fallback("Failed to get applications configuration")
            .with_params(|a, _| Ok(json!({"moduleName": hook_name(a)?})))
            .boxed(),
    ]
}
