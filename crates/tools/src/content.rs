//! Article tools.

use crate::backend_tool::BackendTool;
use crate::support::{self, args, ToolContext};
use async_trait::async_trait;
use jamespot_core::error::ToolError;
use jamespot_core::tool::{Tool, ToolResult};
use serde_json::{json, Value};
use std::sync::Arc;

/// The first object of a create response, which the backend wraps in a list.
pub(crate) fn first_created(result: &Value) -> &Value {
    match result {
        Value::Array(items) => items.first().unwrap_or(&Value::Null),
        other => other,
    }
}

/// `{id, uri, title, urlPath, fullUrl}` for a freshly created article-like object.
pub(crate) fn created_link(created: &Value, title: &Value, ctx: &ToolContext) -> Value {
    let id = &created["id"];
    let id_text = match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let url_path = format!("/article/{id_text}");
    let uri = match &created["uri"] {
        Value::Null => json!(support::to_uri("article", &id_text)),
        uri => uri.clone(),
    };
    json!({
        "id": id,
        "uri": uri,
        "title": if created["title"].is_null() { title.clone() } else { created["title"].clone() },
        "urlPath": url_path,
        "fullUrl": ctx.full_url(&url_path),
    })
}

/// Adds a comment, fetching a fresh token first.
pub struct CommentArticleTool {
    ctx: Arc<ToolContext>,
}

impl CommentArticleTool {
    async fn run(&self, arguments: &Value) -> Result<String, String> {
        let id_article = args::number(arguments, "idArticle")?;
        let comment = args::string(arguments, "comment")?;

        let token = self
            .ctx
            .call("network.token", json!({}), "Failed to get token")
            .await
            .map_err(|e| e.to_string())?;
        self.ctx
            .call(
                "article.addComment",
                json!({
                    "idArticle": id_article,
                    "token": token,
                    "content": comment,
                    "sendAlert": true,
                    "alertAuthor": false,
                }),
                "Failed to add comment",
            )
            .await
            .map_err(|e| e.to_string())?;
        Ok("Successfully added comment to article".into())
    }
}

#[async_trait]
impl Tool for CommentArticleTool {
    fn name(&self) -> &str {
        "jamespot_comment_article"
    }

    fn description(&self) -> &str {
        "Add a comment to an existing article or post in Jamespot."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "idArticle": { "type": "number", "description": "Article ID to comment on" },
                "comment": { "type": "string", "description": "Comment text (HTML supported)" }
            },
            "required": ["idArticle", "comment"]
        })
    }

    async fn execute(&self, arguments: Value) -> Result<ToolResult, ToolError> {
        support::log_input(self.ctx.debug, self.name(), &arguments);
        let outcome = self.run(&arguments).await;
        Ok(support::finish(self.ctx.debug, self.name(), outcome))
    }
}

fn search_query(a: &Value) -> Value {
    let mut filters = vec![json!({"field": "mainType", "value": "article"})];
    if let Some(group) = args::opt_number(a, "groupFilter") {
        filters.push(json!({"field": "__sec__", "value": format!("s{group}")}));
    }
    if let Some(author) = args::opt_number(a, "authorFilter") {
        filters.push(json!({"field": "idUser", "value": author}));
    }

    let mut query = json!({
        "limit": args::number_or(a, "limit", 20),
        "filters": filters,
    });
    if let Some(keywords) = args::opt_string(a, "query").filter(|q| *q != "*") {
        query["keywords"] = json!(keywords);
    }
    query
}

pub fn tools(ctx: &Arc<ToolContext>) -> Vec<Box<dyn Tool>> {
    vec![
        BackendTool::new(ctx, "jamespot_create_article", "article.create")
            .with_description(
                "Create a new article or post in Jamespot. An article must have an audience (people who can read the article) \
                 in the publishTo parameter. If an article is to be published in a group but you dont know the group Id, first \
                 try to get the group by its name, and use its uri. Returns article details including a urlPath and the fullUrl \
                 (backend URL + urlPath). IMPORTANT: To attach files to an article, use the same token that was used to upload \
                 the files. Get a token using jamespot_get_upload_token, upload files with jamespot_upload_file using that token, \
                 then create the article with the same token. In this case, don't reference the same image in the HTML description text.",
            )
            .with_schema(json!({
                "type": "object",
                "properties": {
                    "title": { "type": "string", "description": "Article title" },
                    "description": { "type": "string", "description": "Article content (HTML supported)" },
                    "publishTo": {
                        "type": "string",
                        "description": "This audience parameter contains uris for users or groups, separated by commas. Uris have the form \"type\"/\"ID of object (must be a number)\". eg : user/123, spot/123"
                    },
                    "token": {
                        "type": "string",
                        "description": "Upload token from jamespot_get_upload_token. Required if you want to attach files that were uploaded with this token."
                    }
                },
                "required": ["title", "description", "publishTo"]
            }))
            .with_fallback("Failed to create article")
            .with_params(|a, _| {
                args::string(a, "title")?;
                args::string(a, "publishTo")?;
                Ok(Value::Object(args::pick(a, &["title", "description", "publishTo", "token"])))
            })
            .with_render(|result, a, ctx| {
                json!({
                    "success": true,
                    "message": "Article created successfully",
                    "article": created_link(first_created(&result), &a["title"], ctx),
                })
            })
            .boxed(),
        BackendTool::new(ctx, "jamespot_get_article", "article.get")
            .with_description("Get details of a specific article/post in Jamespot by its ID.")
            .with_schema(json!({
                "type": "object",
                "properties": {
                    "articleId": { "type": "string", "description": "Article ID or URI (e.g., \"article/789\")" }
                },
                "required": ["articleId"]
            }))
            .with_fallback("Failed to get article")
            .with_params(|a, _| {
                let id = args::id_text(a, "articleId")?;
                Ok(match id.parse::<i64>() {
                    Ok(numeric) => json!({"idArticle": numeric}),
                    Err(_) => json!({"uri": id}),
                })
            })
            .boxed(),
        BackendTool::new(ctx, "jamespot_search_articles", "search.searchQuery")
            .with_description("Search for articles/posts in Jamespot by keywords.")
            .with_schema(json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "Fulltext search query for article title or content." },
                    "groupFilter": {
                        "type": "number",
                        "description": "Optional, but must be provided to narrow search to articles published in this group. Value must be a spot ID"
                    },
                    "authorFilter": {
                        "type": "number",
                        "description": "Optional, but must be provided to narrow search to articles published by this author. Value must be a user ID"
                    },
                    "limit": { "type": "number", "description": "Maximum number of results (default: 20)" }
                }
            }))
            .with_fallback("Failed to search articles")
            .with_params(|a, _| Ok(search_query(a)))
            .boxed(),
        Box::new(CommentArticleTool { ctx: Arc::clone(ctx) }),
    ]
}
