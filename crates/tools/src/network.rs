//! Upload token tool.

use crate::backend_tool::BackendTool;
use crate::support::ToolContext;
use jamespot_core::tool::Tool;
use serde_json::json;
use std::sync::Arc;

pub fn tools(ctx: &Arc<ToolContext>) -> Vec<Box<dyn Tool>> {
    vec![
        BackendTool::new(ctx, "jamespot_get_upload_token", "network.token")
            .with_description(
                "Get an upload token from the Jamespot network API. This token is required for file upload operations \
                 and for attaching files to articles. The same token should be used when uploading files and creating \
                 articles to automatically attach the uploaded files to the article.",
            )
            .with_fallback("Failed to get upload token")
            .with_render(|token, _, _| {
                json!({
                    "success": true,
                    "token": token,
                    "message": "Upload token retrieved successfully. Use this token for file uploads and article creation.",
                })
            })
            .boxed(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ctx, MockBackend};
    use jamespot_core::backend::Envelope;
    use serde_json::Value;

    #[tokio::test]
    async fn token_is_wrapped() {
        let backend = MockBackend::new().respond("network.token", Envelope::success(json!("abc123")));
        let tools = tools(&ctx(&backend));
        let result = tools[0].execute(json!({})).await.unwrap();
        let value: Value = serde_json::from_str(&result.output).unwrap();
        assert_eq!(value["token"], "abc123");
        assert_eq!(value["success"], true);
    }
}
