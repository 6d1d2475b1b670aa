//! File and file bank tools.

use crate::backend_tool::BackendTool;
use crate::support::{args, ToolContext};
use jamespot_core::tool::Tool;
use serde_json::{json, Value};
use std::sync::Arc;

/// Reshape a `{cnt, page, limit, data}` page under a friendlier list key.
fn paged(result: &Value, list_key: &str) -> Value {
    let mut page = json!({
        "total": result["cnt"],
        "page": result["page"],
        "limit": result["limit"],
    });
    page[list_key] = result["data"].clone();
    page
}

fn file_id_schema(key: &str, description: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            key: { "type": "number", "description": description }
        },
        "required": [key]
    })
}

fn paging_properties() -> Value {
    json!({
        "limit": { "type": "number", "description": "Maximum number of results (default: 20)" },
        "page": { "type": "number", "description": "Page number for pagination (default: 1)" }
    })
}

pub fn tools(ctx: &Arc<ToolContext>) -> Vec<Box<dyn Tool>> {
    vec![
        BackendTool::new(ctx, "jamespot_get_file", "file.get")
            .with_description(
                "Get detailed information about a specific file by its ID. Returns file metadata including title, size, type, upload date, and download URL.",
            )
            .with_schema(file_id_schema("idFile", "File ID to retrieve"))
            .with_fallback("Failed to get file")
            .with_params(|a, _| Ok(json!({"idFile": args::number(a, "idFile")?})))
            .boxed(),
        BackendTool::new(ctx, "jamespot_upload_file", "file.upload")
            .with_description(
                "Upload a file to Jamespot from a URL. Use this to add external files or images to the platform. \
                 Returns upload result with file information. Requires a token which can be obtained from the network API.",
            )
            .with_schema(json!({
                "type": "object",
                "properties": {
                    "url": { "type": "string", "description": "URL of the file to upload (must be publicly accessible)" },
                    "attrName": { "type": "string", "description": "Attribute name for the file (e.g., \"file\", \"image\", \"document\")" },
                    "token": {
                        "type": "string",
                        "description": "Upload token obtained from the network API. The token value must be obtained from the network tool, and kept to be use after, during the article creation."
                    }
                },
                "required": ["url", "attrName", "token"]
            }))
            .with_fallback("Failed to upload file")
            .with_params(|a, _| {
                let url = args::string(a, "url")?;
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    return Err("URL must start with http:// or https://".into());
                }
                Ok(json!({
                    "url": url,
                    "attrName": args::string(a, "attrName")?,
                    "token": args::string(a, "token")?,
                }))
            })
            .with_render(|result, _, _| {
                json!({"success": true, "message": "File uploaded successfully", "result": result})
            })
            .boxed(),
        BackendTool::new(ctx, "jamespot_duplicate_file", "file.duplicate")
            .with_description(
                "Duplicate an existing file and create a new article with it. Returns the new file ID and article information.",
            )
            .with_schema(json!({
                "type": "object",
                "properties": {
                    "idFile": { "type": "number", "description": "File ID to duplicate" },
                    "title": { "type": "string", "description": "Title for the new file/article" },
                    "publishTo": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Array of URIs to publish to (e.g., [\"spot/123\", \"user/456\"])"
                    }
                },
                "required": ["idFile", "title"]
            }))
            .with_fallback("Failed to duplicate file")
            .with_params(|a, _| {
                let mut params = json!({
                    "idFile": args::number(a, "idFile")?,
                    "title": args::string(a, "title")?,
                });
                if let Some(targets) = a.get("publishTo").filter(|v| v.is_array()) {
                    params["publishTo"] = targets.clone();
                }
                Ok(params)
            })
            .with_render(|result, _, _| {
                json!({
                    "success": true,
                    "message": "File duplicated successfully",
                    "newFileId": result["idFile"],
                    "article": result["article"],
                })
            })
            .boxed(),
        BackendTool::new(ctx, "jamespot_update_file", "file.updateFile")
            .with_description("Update the title of an existing file.")
            .with_schema(json!({
                "type": "object",
                "properties": {
                    "idFile": { "type": "number", "description": "File ID to update" },
                    "title": { "type": "string", "description": "New title for the file" }
                },
                "required": ["idFile", "title"]
            }))
            .with_fallback("Failed to update file")
            .with_params(|a, _| {
                Ok(json!({
                    "idFile": args::number(a, "idFile")?,
                    "title": args::string(a, "title")?,
                }))
            })
            .with_render(|_, _, _| json!({"success": true, "message": "File title updated successfully"}))
            .boxed(),
        BackendTool::new(ctx, "jamespot_get_file_downloads", "file.getDownload")
            .with_description(
                "Get download statistics for a file, including list of users who downloaded it and download count.",
            )
            .with_schema(file_id_schema("fileId", "File ID to get download statistics for"))
            .with_fallback("Failed to get download statistics")
            .with_params(|a, _| Ok(json!({"idFile": args::number(a, "fileId")?})))
            .with_render(|result, _, _| json!({"download_count": result["count"], "downloads": result["list"]}))
            .boxed(),
        BackendTool::new(ctx, "jamespot_copy_file", "file.copy")
            .with_description(
                "Copy a file from one location to another. Useful for organizing files across different folders or groups.",
            )
            .with_schema(json!({
                "type": "object",
                "properties": {
                    "idFile": { "type": "number", "description": "File ID to copy" },
                    "attrName": { "type": "string", "description": "Attribute name for the copy operation" },
                    "token": { "type": "string", "description": "Security token for the operation" }
                },
                "required": ["idFile", "attrName", "token"]
            }))
            .with_fallback("Failed to copy file")
            .with_params(|a, _| {
                Ok(json!({
                    "id": args::number(a, "idFile")?,
                    "attrName": args::string(a, "attrName")?,
                    "token": args::string(a, "token")?,
                }))
            })
            .with_render(|result, _, _| json!({"success": true, "message": "File copied successfully", "file": result}))
            .boxed(),
        BackendTool::new(ctx, "jamespot_list_filebanks", "filebank.getBanks")
            .with_description(
                "List all available file banks (file repositories). Returns information about each file bank including recent files and root folder.",
            )
            .with_fallback("Failed to list file banks")
            .boxed(),
        BackendTool::new(ctx, "jamespot_get_folders", "filebank.getFolders")
            .with_description(
                "Get folders within a specific parent folder or file bank. Returns list of subfolders with their metadata.",
            )
            .with_schema(json!({
                "type": "object",
                "properties": {
                    "parentURI": { "type": "string", "description": "Parent folder URI (e.g., \"folder/123\")" }
                },
                "required": ["parentURI"]
            }))
            .with_fallback("Failed to get folders")
            .with_params(|a, _| Ok(json!({"parentURI": args::string(a, "parentURI")?})))
            .boxed(),
        BackendTool::new(ctx, "jamespot_get_folder_documents", "filebank.getDocuments")
            .with_description(
                "Get all documents within a specific folder. Returns paginated list of files and their metadata.",
            )
            .with_schema(json!({
                "type": "object",
                "properties": {
                    "folderURI": { "type": "string", "description": "Folder URI to list documents from (e.g., \"folder/123\")" }
                },
                "required": ["folderURI"]
            }))
            .with_fallback("Failed to get documents")
            .with_params(|a, _| Ok(json!({"folderURI": args::string(a, "folderURI")?})))
            .with_render(|result, _, _| paged(&result, "documents"))
            .boxed(),
        BackendTool::new(ctx, "jamespot_get_folder_path", "filebank.getPath")
            .with_description(
                "Get the hierarchical path (breadcrumb) for a folder. Returns all parent folders from root to the specified folder.",
            )
            .with_schema(json!({
                "type": "object",
                "properties": {
                    "uri": { "type": "string", "description": "Folder URI to get path for (e.g., \"folder/123\")" },
                    "mode": {
                        "type": "string",
                        "enum": ["full", "browse"],
                        "description": "Mode: \"full\" for complete details or \"browse\" for basic info (default: browse)"
                    }
                },
                "required": ["uri"]
            }))
            .with_fallback("Failed to get folder path")
            .with_params(|a, _| {
                let mode = args::opt_string(a, "mode").unwrap_or("browse");
                if !matches!(mode, "full" | "browse") {
                    return Err(format!("Invalid mode '{mode}'. Must be \"full\" or \"browse\""));
                }
                Ok(json!({"uri": args::string(a, "uri")?, "mode": mode}))
            })
            .boxed(),
        BackendTool::new(ctx, "jamespot_search_files", "filebank.searchContent")
            .with_description(
                "Search for files and folders within a file bank by query string. Returns paginated search results.",
            )
            .with_schema({
                let mut schema = json!({
                    "type": "object",
                    "properties": {
                        "uri": { "type": "string", "description": "File bank URI to search within (e.g., \"filebank/123\")" },
                        "query": { "type": "string", "description": "Search query text" }
                    },
                    "required": ["uri", "query"]
                });
                if let (Some(props), Value::Object(paging)) = (schema["properties"].as_object_mut(), paging_properties()) {
                    props.extend(paging);
                }
                schema
            })
            .with_fallback("Failed to search files")
            .with_params(|a, _| {
                args::string(a, "uri")?;
                args::string(a, "query")?;
                Ok(Value::Object(args::pick(a, &["uri", "query", "limit", "page"])))
            })
            .with_render(|result, _, _| paged(&result, "results"))
            .boxed(),
        BackendTool::new(ctx, "jamespot_get_file_parents", "filebank.getParents")
            .with_description(
                "Get all parent folders of a specific file or folder. Useful for understanding file location in the hierarchy.",
            )
            .with_schema(file_id_schema("id", "File or folder ID"))
            .with_fallback("Failed to get parent folders")
            .with_params(|a, _| Ok(json!({"id": args::number(a, "id")?})))
            .boxed(),
        BackendTool::new(ctx, "jamespot_list_root_folders", "filebank.getRootFolders")
            .with_description("List all root-level folders in file banks. Optionally search root folders by query.")
            .with_schema({
                let mut properties = paging_properties();
                properties["query"] = json!({ "type": "string", "description": "Optional search query to filter root folders" });
                json!({ "type": "object", "properties": properties })
            })
            .with_fallback("Failed to list root folders")
            .with_params(|a, _| Ok(Value::Object(args::pick(a, &["query", "limit", "page"]))))
            .with_render(|result, _, _| paged(&result, "folders"))
            .boxed(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ctx, find, MockBackend};
    use jamespot_core::backend::Envelope;

    #[test]
    fn pages_are_reshaped() {
        let page = paged(&json!({"cnt": 2, "page": 1, "limit": 20, "data": [{"id": 1}, {"id": 2}]}), "documents");
        assert_eq!(page, json!({"total": 2, "page": 1, "limit": 20, "documents": [{"id": 1}, {"id": 2}]}));
    }

    #[tokio::test]
    async fn folder_path_rejects_unknown_mode() {
        let backend = MockBackend::new();
        let tools = tools(&ctx(&backend));
        let result = find(&tools, "jamespot_get_folder_path")
            .execute(json!({"uri": "folder/1", "mode": "tree"}))
            .await
            .unwrap();
        assert!(result.output.starts_with("Error: Invalid mode 'tree'"));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn download_stats_are_renamed() {
        let backend = MockBackend::new().respond(
            "file.getDownload",
            Envelope::success(json!({"count": 3, "list": [{"idUser": 1}]})),
        );
        let tools = tools(&ctx(&backend));
        let result = find(&tools, "jamespot_get_file_downloads").execute(json!({"fileId": 8})).await.unwrap();
        let value: Value = serde_json::from_str(&result.output).unwrap();
        assert_eq!(value["download_count"], 3);
        assert_eq!(backend.params_of("file.getDownload").unwrap(), json!({"idFile": 8}));
    }

    #[tokio::test]
    async fn upload_checks_the_envelope() {
        let backend = MockBackend::new().respond("file.upload", Envelope::failure(4, "invalid token"));
        let tools = tools(&ctx(&backend));
        let result = find(&tools, "jamespot_upload_file")
            .execute(json!({"url": "https://img.example/a.png", "attrName": "image", "token": "t"}))
            .await
            .unwrap();
        assert_eq!(result.output, "Error: invalid token");
    }

    #[test]
    fn search_schema_includes_paging() {
        let tools = tools(&ctx(&MockBackend::new()));
        let schema = find(&tools, "jamespot_search_files").parameters_schema();
        assert!(schema["properties"]["page"].is_object());
        assert!(schema["properties"]["query"].is_object());
    }
}
