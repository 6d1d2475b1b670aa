//! Messenger tools.

use crate::backend_tool::BackendTool;
use crate::support::{args, ToolContext};
use jamespot_core::tool::Tool;
use serde_json::{json, Value};
use std::sync::Arc;

fn uri_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "uri": { "type": "string", "description": "Group/Spot URI" }
        },
        "required": ["uri"]
    })
}

fn uri_param(a: &Value, _: &ToolContext) -> Result<Value, String> {
    Ok(json!({"uri": args::string(a, "uri")?}))
}

pub fn tools(ctx: &Arc<ToolContext>) -> Vec<Box<dyn Tool>> {
    vec![
        BackendTool::new(ctx, "jamespot_send_message", "messenger.sendMessage")
            .with_description("Send a message in an existing messenger discussion.")
            .with_schema(json!({
                "type": "object",
                "properties": {
                    "message": { "type": "string", "description": "Message content to send" },
                    "idDiscussion": { "type": "string", "description": "Discussion ID" }
                },
                "required": ["message", "idDiscussion"]
            }))
            .with_fallback("Failed to send message")
            .with_params(|a, _| {
                Ok(json!({
                    "message": args::string(a, "message")?,
                    "idDiscussion": args::id_text(a, "idDiscussion")?,
                }))
            })
            .with_render(|_, _, _| json!({"success": true, "message": "Message sent successfully"}))
            .boxed(),
        BackendTool::new(ctx, "jamespot_get_or_create_discussion", "messenger.getOrCreateDiscussion")
            .with_description(
                "Get an existing discussion or create a new one between two users. Returns the discussion details.",
            )
            .with_schema(json!({
                "type": "object",
                "properties": {
                    "idSender": { "type": "number", "description": "Sender user ID" },
                    "idUserTo": { "type": "number", "description": "Recipient user ID" }
                },
                "required": ["idUserTo"]
            }))
            .with_fallback("Failed to get or create discussion")
            .with_params(|a, ctx| {
                Ok(json!({
                    "idSender": args::opt_number(a, "idSender").unwrap_or(ctx.user.id),
                    "idUserTo": args::number(a, "idUserTo")?,
                }))
            })
            .boxed(),
        BackendTool::new(ctx, "jamespot_get_spot_discussion", "messenger.getSpotDiscussion")
            .with_description("Get the messenger discussion for a specific group/spot.")
            .with_schema(uri_schema())
            .with_fallback("Failed to get spot discussion")
            .with_params(uri_param)
            .boxed(),
        BackendTool::new(ctx, "jamespot_create_spot_discussion", "messenger.createSpotDiscussion")
            .with_description("Create a new messenger discussion for a group/spot.")
            .with_schema(uri_schema())
            .with_fallback("Failed to create spot discussion")
            .with_params(uri_param)
            .boxed(),
        BackendTool::new(ctx, "jamespot_get_message_reads", "messenger.getMessageReads")
            .with_description("Get the list of messages that were not already read by this current user.")
            .with_schema(json!({
                "type": "object",
                "properties": {
                    "uriMessage": { "type": "string", "description": "Message URI" },
                    "limit": { "type": "number", "description": "Maximum number of results (optional)" },
                    "page": { "type": "number", "description": "Page number for pagination (optional)" }
                },
                "required": ["uriMessage"]
            }))
            .with_fallback("Failed to get message reads")
            .with_params(|a, _| {
                args::string(a, "uriMessage")?;
                Ok(Value::Object(args::pick(a, &["uriMessage", "limit", "page"])))
            })
            .boxed(),
        BackendTool::new(ctx, "jamespot_list_recent_discussions", "messenger.listRecentDiscussions")
            .with_description("Retrieve last recent discussions.")
            .with_fallback("Cant retrieve discussions")
            .boxed(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ctx, find, MockBackend};
    use jamespot_core::backend::Envelope;

    #[tokio::test]
    async fn discussion_sender_defaults_to_current_user() {
        let backend = MockBackend::new().respond("messenger.getOrCreateDiscussion", Envelope::success(json!({"id": 4})));
        let tools = tools(&ctx(&backend));
        find(&tools, "jamespot_get_or_create_discussion")
            .execute(json!({"idUserTo": 77}))
            .await
            .unwrap();
        assert_eq!(
            backend.params_of("messenger.getOrCreateDiscussion").unwrap(),
            json!({"idSender": 123, "idUserTo": 77})
        );
    }

    #[tokio::test]
    async fn send_message_confirms() {
        let backend = MockBackend::new().respond("messenger.sendMessage", Envelope::success(json!({"id": 1})));
        let tools = tools(&ctx(&backend));
        let result = find(&tools, "jamespot_send_message")
            .execute(json!({"message": "hi", "idDiscussion": 12}))
            .await
            .unwrap();
        assert!(result.output.contains("Message sent successfully"));
        assert_eq!(backend.params_of("messenger.sendMessage").unwrap()["idDiscussion"], "12");
    }

    #[tokio::test]
    async fn recent_discussions_fallback() {
        let backend = MockBackend::new().respond(
            "messenger.listRecentDiscussions",
            Envelope { error: 1, result: Value::Null, error_msg: Some(String::new()) },
        );
        let tools = tools(&ctx(&backend));
        let result = find(&tools, "jamespot_list_recent_discussions").execute(json!({})).await.unwrap();
        assert_eq!(result.output, "Error: Cant retrieve discussions");
    }
}
