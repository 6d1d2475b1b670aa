//! Unsplash image search.
//!
//! These tools talk to Unsplash directly, not to the backend. Without an
//! access key they are still registered and answer with an error string.

use crate::support::{self, args};
use async_trait::async_trait;
use jamespot_core::error::ToolError;
use jamespot_core::tool::{Tool, ToolResult};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

pub const UNSPLASH_API_URL: &str = "https://api.unsplash.com";

const MISSING_KEY: &str =
    "UNSPLASH_ACCESS_KEY environment variable is not set. Please configure your Unsplash API access key.";

pub struct UnsplashClient {
    client: reqwest::Client,
    base_url: String,
    access_key: String,
}

impl UnsplashClient {
    pub fn new(access_key: impl Into<String>) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| format!("Failed to build HTTP client: {e}"))?;
        Ok(Self {
            client,
            base_url: UNSPLASH_API_URL.to_string(),
            access_key: access_key.into(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn get(&self, path: &str, query: &[(&str, String)], fallback: &str) -> Result<Value, String> {
        let response = self
            .client
            .get(format!("{}{path}", self.base_url))
            .header("Authorization", format!("Client-ID {}", self.access_key))
            .header("Accept-Version", "v1")
            .query(query)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);
        if status.is_success() {
            return Ok(body);
        }

        let errors: Vec<&str> = body["errors"]
            .as_array()
            .map(|list| list.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();
        if errors.is_empty() {
            Err(fallback.to_string())
        } else {
            Err(errors.join(", "))
        }
    }
}

fn description_of(photo: &Value) -> Value {
    [&photo["description"], &photo["alt_description"]]
        .into_iter()
        .find(|v| v.as_str().is_some_and(|s| !s.is_empty()))
        .cloned()
        .unwrap_or_else(|| json!("No description"))
}

fn photo_summary(photo: &Value) -> Value {
    let urls = &photo["urls"];
    json!({
        "id": photo["id"],
        "description": description_of(photo),
        "urls": {
            "thumb": urls["thumb"],
            "small": urls["small"],
            "regular": urls["regular"],
            "full": urls["full"],
            "raw": urls["raw"],
        },
        "dimensions": { "width": photo["width"], "height": photo["height"] },
        "color": photo["color"],
        "photographer": {
            "name": photo["user"]["name"],
            "username": photo["user"]["username"],
            "profile_url": photo["user"]["links"]["html"],
            "portfolio_url": photo["user"]["portfolio_url"],
        },
        "links": { "html": photo["links"]["html"], "download": photo["links"]["download"] },
        "likes": photo["likes"],
    })
}

fn photo_details(photo: &Value) -> Value {
    let user = &photo["user"];
    json!({
        "id": photo["id"],
        "description": description_of(photo),
        "created_at": photo["created_at"],
        "updated_at": photo["updated_at"],
        "dimensions": { "width": photo["width"], "height": photo["height"] },
        "color": photo["color"],
        "blur_hash": photo["blur_hash"],
        "urls": photo["urls"],
        "links": photo["links"],
        "likes": photo["likes"],
        "photographer": {
            "name": user["name"],
            "username": user["username"],
            "bio": user["bio"],
            "location": user["location"],
            "portfolio_url": user["portfolio_url"],
            "profile_url": user["links"]["html"],
        },
        "exif": photo["exif"],
        "location": photo["location"],
        "related_collections": photo["related_collections"],
    })
}

#[derive(Clone, Copy)]
enum Query {
    Search,
    Details,
    Random,
}

pub struct UnsplashTool {
    client: Option<Arc<UnsplashClient>>,
    query: Query,
    debug: bool,
}

/// Copy an optional enum argument, rejecting values outside `allowed`.
fn push_choice(
    query: &mut Vec<(&'static str, String)>,
    a: &Value,
    key: &str,
    param: &'static str,
    allowed: &[&str],
) -> Result<(), String> {
    if let Some(value) = args::opt_string(a, key) {
        if !allowed.contains(&value) {
            return Err(format!("Invalid {key} '{value}'. Must be one of: {}", allowed.join(", ")));
        }
        query.push((param, value.to_string()));
    }
    Ok(())
}

const ORIENTATIONS: &[&str] = &["landscape", "portrait", "squarish"];
const CONTENT_FILTERS: &[&str] = &["low", "high"];

impl UnsplashTool {
    async fn run(&self, a: &Value) -> Result<Value, String> {
        let client = self.client.as_ref().ok_or_else(|| MISSING_KEY.to_string())?;
        match self.query {
            Query::Search => {
                let page = args::number_or(a, "page", 1).max(1);
                let per_page = args::number_or(a, "perPage", 10).clamp(1, 30);
                let mut query = vec![
                    ("query", args::string(a, "query")?.to_string()),
                    ("page", page.to_string()),
                    ("per_page", per_page.to_string()),
                ];
                push_choice(&mut query, a, "orderBy", "order_by", &["relevant", "latest"])?;
                push_choice(&mut query, a, "orientation", "orientation", ORIENTATIONS)?;
                push_choice(
                    &mut query,
                    a,
                    "color",
                    "color",
                    &[
                        "black_and_white", "black", "white", "yellow", "orange", "red", "purple", "magenta", "green",
                        "teal", "blue",
                    ],
                )?;
                push_choice(&mut query, a, "contentFilter", "content_filter", CONTENT_FILTERS)?;

                let data = client.get("/search/photos", &query, "Failed to search images").await?;
                let images: Vec<Value> = data["results"]
                    .as_array()
                    .map(|photos| photos.iter().map(photo_summary).collect())
                    .unwrap_or_default();
                Ok(json!({
                    "total": data["total"],
                    "total_pages": data["total_pages"],
                    "current_page": page,
                    "per_page": per_page,
                    "images": images,
                }))
            }
            Query::Details => {
                let id = args::string(a, "id")?;
                if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
                    return Err(format!("Invalid image id '{id}'"));
                }
                let photo = client
                    .get(&format!("/photos/{id}"), &[], "Failed to get image details")
                    .await?;
                Ok(photo_details(&photo))
            }
            Query::Random => {
                let count = args::number_or(a, "count", 1).clamp(1, 30);
                let mut query = vec![("count", count.to_string())];
                for (key, param) in [("query", "query"), ("username", "username"), ("collections", "collections"), ("topics", "topics")] {
                    if let Some(value) = args::opt_string(a, key) {
                        query.push((param, value.to_string()));
                    }
                }
                push_choice(&mut query, a, "orientation", "orientation", ORIENTATIONS)?;
                push_choice(&mut query, a, "contentFilter", "content_filter", CONTENT_FILTERS)?;

                let data = client.get("/photos/random", &query, "Failed to get random images").await?;
                let photos = match data {
                    Value::Array(photos) => photos,
                    single => vec![single],
                };
                let mut images = Vec::with_capacity(photos.len());
                for photo in &photos {
                    let mut summary = photo_summary(photo);
                    if let Some(photographer) = summary["photographer"].as_object_mut() {
                        photographer.remove("portfolio_url");
                    }
                    images.push(summary);
                }
                Ok(json!({"count": images.len(), "images": images}))
            }
        }
    }
}

#[async_trait]
impl Tool for UnsplashTool {
    fn name(&self) -> &str {
        match self.query {
            Query::Search => "search_unsplash_images",
            Query::Details => "get_unsplash_image_details",
            Query::Random => "get_random_unsplash_image",
        }
    }

    fn description(&self) -> &str {
        match self.query {
            Query::Search => {
                "Search for high-quality, free-to-use images from Unsplash. Returns image URLs at multiple resolutions \
                 (thumb, small, regular, full, raw), photographer information, and image metadata. For article images, \
                 use the regular resolution, in landscape orientation, and take randomly in the first result page. \
                 IMPORTANT: Requires UNSPLASH_ACCESS_KEY environment variable to be set."
            }
            Query::Details => {
                "Get detailed information about a specific Unsplash image by its ID. Returns comprehensive metadata \
                 including EXIF data, location, tags, statistics, and high-resolution download URLs."
            }
            Query::Random => {
                "Get one or more random images from Unsplash. Optionally filter by collections, topics, username, query, \
                 or orientation. Useful for getting inspiration or placeholder images."
            }
        }
    }

    fn parameters_schema(&self) -> Value {
        let orientation = json!({"type": "string", "enum": ORIENTATIONS, "description": "Filter by image orientation"});
        let content_filter =
            json!({"type": "string", "enum": CONTENT_FILTERS, "description": "Content safety filter level (default: low)"});
        match self.query {
            Query::Search => json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "Search query for images (e.g., \"mountains\", \"coffee\", \"workspace\")" },
                    "page": { "type": "number", "minimum": 1, "description": "Page number for pagination (default: 1)" },
                    "perPage": { "type": "number", "minimum": 1, "maximum": 30, "description": "Number of results per page (default: 10, max: 30)" },
                    "orderBy": { "type": "string", "enum": ["relevant", "latest"], "description": "Sort order: relevant or latest (default: relevant)" },
                    "orientation": orientation,
                    "color": {
                        "type": "string",
                        "enum": ["black_and_white", "black", "white", "yellow", "orange", "red", "purple", "magenta", "green", "teal", "blue"],
                        "description": "Filter by color"
                    },
                    "contentFilter": content_filter
                },
                "required": ["query"]
            }),
            Query::Details => json!({
                "type": "object",
                "properties": {
                    "id": { "type": "string", "description": "Unsplash image ID" }
                },
                "required": ["id"]
            }),
            Query::Random => json!({
                "type": "object",
                "properties": {
                    "count": { "type": "number", "minimum": 1, "maximum": 30, "description": "Number of random images to retrieve (default: 1, max: 30)" },
                    "query": { "type": "string", "description": "Limit selection to photos matching a search term" },
                    "username": { "type": "string", "description": "Limit selection to a specific user's photos" },
                    "orientation": orientation,
                    "contentFilter": content_filter,
                    "collections": { "type": "string", "description": "Public collection ID(s) to filter by (comma-separated)" },
                    "topics": { "type": "string", "description": "Public topic ID(s) to filter by (comma-separated)" }
                }
            }),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<ToolResult, ToolError> {
        support::log_input(self.debug, self.name(), &arguments);
        let outcome = self.run(&arguments).await.map(|value| support::pretty(&value));
        Ok(support::finish(self.debug, self.name(), outcome))
    }
}

pub fn tools(client: Option<Arc<UnsplashClient>>, debug: bool) -> Vec<Box<dyn Tool>> {
    [Query::Search, Query::Details, Query::Random]
        .into_iter()
        .map(|query| {
            Box::new(UnsplashTool {
                client: client.clone(),
                query,
                debug,
            }) as Box<dyn Tool>
        })
        .collect()
}
