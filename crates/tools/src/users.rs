//! User tools.

use crate::backend_tool::BackendTool;
use crate::support::{self, args, ToolContext};
use async_trait::async_trait;
use jamespot_core::error::ToolError;
use jamespot_core::tool::{Tool, ToolResult};
use serde_json::{json, Value};
use std::sync::Arc;

/// Answers from the profile captured at sign-in; no backend call.
pub struct CurrentUserTool {
    ctx: Arc<ToolContext>,
}

#[async_trait]
impl Tool for CurrentUserTool {
    fn name(&self) -> &str {
        "jamespot_get_current_user"
    }

    fn description(&self) -> &str {
        "Get information about the currently authenticated user in Jamespot. Returns user profile \
         including name, email, avatar, and other details."
    }

    fn parameters_schema(&self) -> Value {
        json!({"type": "object", "properties": {}})
    }

    async fn execute(&self, arguments: Value) -> Result<ToolResult, ToolError> {
        support::log_input(self.ctx.debug, self.name(), &arguments);
        let output = support::pretty(&self.ctx.user.raw);
        Ok(support::finish(self.ctx.debug, self.name(), Ok(output)))
    }
}

pub fn tools(ctx: &Arc<ToolContext>) -> Vec<Box<dyn Tool>> {
    vec![
        Box::new(CurrentUserTool { ctx: Arc::clone(ctx) }),
        BackendTool::new(ctx, "jamespot_get_user", "user.get")
            .with_description("Get information about a specific user in Jamespot by their user ID or URI (e.g., \"user/123\").")
            .with_schema(json!({
                "type": "object",
                "properties": {
                    "userId": { "type": "string", "description": "User ID or URI (e.g., \"user/123\" or \"123\")" }
                },
                "required": ["userId"]
            }))
            .with_fallback("Failed to get user")
            .with_params(|a, _| Ok(json!({"uri": support::to_uri("user", &args::id_text(a, "userId")?)})))
            .boxed(),
        BackendTool::new(ctx, "jamespot_search_users", "user.autocomplete")
            .with_description("Search for users in Jamespot by name, email, or other criteria. Returns a list of matching users.")
            .with_schema(json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "Search query (name, email, etc.)" },
                    "limit": { "type": "number", "description": "Maximum number of results (default: 10)" }
                },
                "required": ["query"]
            }))
            .with_fallback("Failed to search users")
            .with_params(|a, _| {
                Ok(json!({
                    "query": args::string(a, "query")?,
                    "limit": args::number_or(a, "limit", 10),
                }))
            })
            .boxed(),
        BackendTool::new(ctx, "jamespot_update_user_profile", "user.userUpdateProfile")
            .with_description("Update the current user profile information in Jamespot (e.g., name, bio, phone).")
            .with_schema(json!({
                "type": "object",
                "properties": {
                    "firstName": { "type": "string", "description": "User first name" },
                    "lastName": { "type": "string", "description": "User last name" },
                    "bio": { "type": "string", "description": "User biography" },
                    "phone": { "type": "string", "description": "User phone number" }
                }
            }))
            .with_fallback("Failed to update profile")
            .with_params(|a, ctx| {
                let mut fields = args::pick(a, &["firstName", "lastName", "bio", "phone"]);
                if fields.is_empty() {
                    return Err("Nothing to update".into());
                }
                fields.insert("idUser".into(), json!(ctx.user.id));
                Ok(Value::Object(fields))
            })
            .with_render(|_, _, _| json!({"success": true, "message": "Successfully updated user profile"}))
            .boxed(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ctx, find, MockBackend};
    use jamespot_core::backend::Envelope;

    #[tokio::test]
    async fn current_user_comes_from_the_cached_profile() {
        let backend = MockBackend::new();
        let tools = tools(&ctx(&backend));
        let result = find(&tools, "jamespot_get_current_user").execute(json!({})).await.unwrap();
        let value: Value = serde_json::from_str(&result.output).unwrap();
        assert_eq!(value["id"], 123);
        assert_eq!(value["mail"], "test@example.com");
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn get_user_normalizes_the_uri() {
        let backend = MockBackend::new().respond("user.get", Envelope::success(json!({"id": 7})));
        let tools = tools(&ctx(&backend));
        let tool = find(&tools, "jamespot_get_user");

        tool.execute(json!({"userId": "7"})).await.unwrap();
        tool.execute(json!({"userId": "user/8"})).await.unwrap();
        tool.execute(json!({"userId": 9})).await.unwrap();

        let uris: Vec<Value> = backend.calls().into_iter().map(|(_, p)| p["uri"].clone()).collect();
        assert_eq!(uris, vec![json!("user/7"), json!("user/8"), json!("user/9")]);
    }

    #[tokio::test]
    async fn search_users_defaults_limit() {
        let backend = MockBackend::new().respond("user.autocomplete", Envelope::success(json!([])));
        let tools = tools(&ctx(&backend));
        find(&tools, "jamespot_search_users").execute(json!({"query": "ali"})).await.unwrap();
        assert_eq!(backend.params_of("user.autocomplete").unwrap(), json!({"query": "ali", "limit": 10}));
    }

    #[tokio::test]
    async fn update_profile_reports_success_message() {
        let backend = MockBackend::new().respond("user.userUpdateProfile", Envelope::success(json!(true)));
        let tools = tools(&ctx(&backend));
        let result = find(&tools, "jamespot_update_user_profile")
            .execute(json!({"bio": "Hello"}))
            .await
            .unwrap();
        assert!(result.output.contains("Successfully updated user profile"));
        assert_eq!(
            backend.params_of("user.userUpdateProfile").unwrap(),
            json!({"bio": "Hello", "idUser": 123})
        );
    }
}
