//! Social events and meetings.
//!
//! Both are article-typed calendar objects with the same lifecycle; they
//! differ only in type name, wording and a few content fields. One
//! [`CalendarKind`] describes each and [`tools`] builds the six operations.

use crate::content::{created_link, first_created};
use crate::support::{self, args, ToolContext};
use async_trait::async_trait;
use jamespot_core::error::ToolError;
use jamespot_core::tool::{Tool, ToolResult};
use serde_json::{json, Map, Value};
use std::sync::Arc;

pub struct CalendarKind {
    /// Backend object type, also the article `type` field
    pub object: &'static str,
    /// Tool name infix: `jamespot_<verb>_<singular>`
    pub singular: &'static str,
    pub plural: &'static str,
    /// Human wording: "Social event", "Meeting"
    pub label: &'static str,
    /// Key of the created object in the create response
    pub response_key: &'static str,
    /// Fields beyond the common ones
    pub extra_fields: &'static [(&'static str, &'static str, &'static str)],
    pub create_notes: &'static str,
}

const COMMON_FIELDS: &[(&str, &str, &str)] = &[
    ("place", "string", "Location/place name"),
    ("address", "string", "Address"),
    ("allDay", "boolean", "Whether this lasts all day (default: false)"),
    ("textColor", "string", "Text color in the calendar"),
    ("bgColor", "string", "Background color in the calendar"),
    ("noGestion", "boolean", "Disable management features"),
    ("urlGestion", "string", "Management URL"),
    ("token", "string", "Upload token from jamespot_get_upload_token. Required to attach files uploaded with this token."),
];

pub const SOCIAL_EVENT: CalendarKind = CalendarKind {
    object: "socialEvent",
    singular: "social_event",
    plural: "social_events",
    label: "Social event",
    response_key: "event",
    extra_fields: &[
        ("description", "string", "Event description (HTML supported)"),
        ("socialEventUseCeiling", "boolean", "Whether to use a participant ceiling/limit"),
        ("socialEventCeiling", "number", "Maximum number of participants allowed"),
        ("hideFromCalendar", "boolean", "Hide event from calendar view"),
        ("useQrcode", "boolean", "Enable QR code for the event"),
    ],
    create_notes: "Create a new social event in Jamespot.",
};

pub const MEETING: CalendarKind = CalendarKind {
    object: "meeting",
    singular: "meeting",
    plural: "meetings",
    label: "Meeting",
    response_key: "meeting",
    extra_fields: &[
        ("agenda", "string", "Meeting agenda (HTML supported)"),
        ("report", "string", "Meeting report/minutes (HTML supported)"),
    ],
    create_notes: "Create a new meeting in Jamespot.",
};

const DATE_HINT: &str = "format: YYYY-MM-DD or YYYY-MM-DD HH:MM:SS";

#[derive(Clone, Copy, PartialEq, Eq)]
enum Action {
    Create,
    Update,
    Get,
    Search,
    List,
    Delete,
}

impl Action {
    const ALL: [Action; 6] = [Self::Create, Self::Update, Self::Get, Self::Search, Self::List, Self::Delete];

    fn verb(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Get => "get",
            Self::Search => "search",
            Self::List => "list",
            Self::Delete => "delete",
        }
    }
}

pub struct CalendarTool {
    ctx: Arc<ToolContext>,
    kind: &'static CalendarKind,
    action: Action,
    name: String,
    description: String,
}

impl CalendarTool {
    fn new(ctx: &Arc<ToolContext>, kind: &'static CalendarKind, action: Action) -> Self {
        let noun = match action {
            Action::Search | Action::List => kind.plural,
            _ => kind.singular,
        };
        let lower = kind.label.to_lowercase();
        let description = match action {
            Action::Create => format!(
                "{} A {lower} must have a title, start date, end date, and an audience (people who can read it) in the \
                 publishTo parameter. Date format should be YYYY-MM-DD or YYYY-MM-DD HH:MM:SS. Returns details including a \
                 urlPath and the fullUrl (backend URL + urlPath). IMPORTANT: To attach files, get a token using \
                 jamespot_get_upload_token, upload files with jamespot_upload_file using that token, then create the {lower} \
                 with the same token.",
                kind.create_notes
            ),
            Action::Update => format!(
                "Update an existing {lower} in Jamespot. Requires the URI and any fields to update. Date format should be \
                 YYYY-MM-DD or YYYY-MM-DD HH:MM:SS."
            ),
            Action::Get => format!("Get details of a specific {lower} in Jamespot by its ID or URI."),
            Action::Search => format!(
                "Search for {} in Jamespot by keywords. Returns a list matching the search criteria.",
                kind.plural.replace('_', " ")
            ),
            Action::List => format!(
                "List {} in Jamespot with optional filters. Can filter by group.",
                kind.plural.replace('_', " ")
            ),
            Action::Delete => format!("Delete a {lower} from Jamespot by its ID. This action cannot be undone."),
        };
        Self {
            ctx: Arc::clone(ctx),
            kind,
            action,
            name: format!("jamespot_{}_{noun}", action.verb()),
            description,
        }
    }

    fn field_properties(&self, for_update: bool) -> Map<String, Value> {
        let mut properties = Map::new();
        let prefix = if for_update { "Updated " } else { "" };
        properties.insert("title".into(), json!({"type": "string", "description": format!("{prefix}Title")}));
        properties.insert(
            "dateStart".into(),
            json!({"type": "string", "description": format!("{prefix}Start date ({DATE_HINT})")}),
        );
        properties.insert(
            "dateEnd".into(),
            json!({"type": "string", "description": format!("{prefix}End date ({DATE_HINT})")}),
        );
        properties.insert(
            "publishTo".into(),
            json!({
                "type": "string",
                "description": "Audience uris for users or groups, separated by commas. Uris have the form \"type\"/\"ID\". eg: user/123, spot/123"
            }),
        );
        for (key, kind, description) in COMMON_FIELDS.iter().chain(self.kind.extra_fields) {
            properties.insert(key.to_string(), json!({"type": kind, "description": description}));
        }
        properties
    }

    fn field_names(&self) -> Vec<&'static str> {
        let mut names = vec!["title", "dateStart", "dateEnd", "publishTo"];
        names.extend(COMMON_FIELDS.iter().chain(self.kind.extra_fields).map(|(key, _, _)| *key));
        names
    }

    fn id_key(&self) -> String {
        format!("{}Id", snake_to_camel(self.kind.singular))
    }

    fn operation(&self, verb: &str) -> String {
        format!("{}.{verb}", self.kind.object)
    }

    fn fallback(&self) -> String {
        format!("Failed to {} {}", self.action.verb(), match self.action {
            Action::Search | Action::List => self.kind.plural.replace('_', " "),
            _ => self.kind.label.to_lowercase(),
        })
    }

    async fn call(&self, operation: &str, params: Value) -> Result<Value, String> {
        self.ctx.call(operation, params, &self.fallback()).await.map_err(|e| e.to_string())
    }

    async fn run(&self, a: &Value) -> Result<Value, String> {
        let kind = self.kind;
        match self.action {
            Action::Create => {
                for key in ["title", "dateStart", "dateEnd", "publishTo"] {
                    args::string(a, key)?;
                }
                let params = Value::Object(args::pick(a, &self.field_names()));
                let result = self.call(&self.operation("create"), params).await?;
                let created = first_created(&result);

                let mut summary = created_link(created, &a["title"], &self.ctx);
                for key in ["dateStart", "dateEnd", "place"] {
                    summary[key] = if created[key].is_null() { a[key].clone() } else { created[key].clone() };
                }
                Ok(json!({
                    "success": true,
                    "message": format!("{} created successfully", kind.label),
                    kind.response_key: summary,
                }))
            }
            Action::Update => {
                let uri = support::to_uri("article", &args::id_text(a, "uri")?);
                let mut params = args::pick(a, &self.field_names());
                params.insert("uri".into(), json!(uri));
                let result = self.call(&self.operation("update"), Value::Object(params)).await?;
                Ok(json!({
                    "success": true,
                    "message": format!("{} updated successfully", kind.label),
                    kind.response_key: result,
                }))
            }
            Action::Get => {
                let id = args::id_text(a, &self.id_key())?;
                let result = self.call("article.get", json!({"uri": support::to_uri("article", &id)})).await?;
                let actual = &result["type"];
                if actual != kind.object {
                    let shown = actual.as_str().map(str::to_string).unwrap_or_else(|| actual.to_string());
                    return Err(format!(
                        "The article with ID {id} is not a {} (type: {shown})",
                        kind.label.to_lowercase()
                    ));
                }
                Ok(result)
            }
            Action::Search => {
                let params = json!({
                    "query": args::string(a, "query")?,
                    "type": kind.object,
                    "limit": args::number_or(a, "limit", 20),
                });
                self.call("article.search", params).await
            }
            Action::List => {
                let mut params = json!({
                    "type": kind.object,
                    "limit": args::number_or(a, "limit", 20),
                    "offset": args::number_or(a, "offset", 0),
                });
                if let Some(group) = args::opt_string(a, "groupUri") {
                    params["uiObjectLink"] = json!(group);
                }
                self.call("article.list", params).await
            }
            Action::Delete => {
                let id = args::number(a, &self.id_key())?;
                self.call("article.delete", json!({"idArticle": id})).await?;
                Ok(json!({
                    "success": true,
                    "message": format!("{} {id} deleted successfully", kind.label),
                }))
            }
        }
    }
}

fn snake_to_camel(snake: &str) -> String {
    let mut out = String::with_capacity(snake.len());
    let mut upper = false;
    for c in snake.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[async_trait]
impl Tool for CalendarTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters_schema(&self) -> Value {
        let label = self.kind.label;
        let (properties, required) = match self.action {
            Action::Create => (self.field_properties(false), vec!["title", "dateStart", "dateEnd", "publishTo"]),
            Action::Update => {
                let mut properties = self.field_properties(true);
                properties.insert(
                    "uri".into(),
                    json!({"type": "string", "description": format!("{label} URI (e.g., \"article/123\" or just \"123\")")}),
                );
                (properties, vec!["uri"])
            }
            Action::Get => {
                let mut properties = Map::new();
                properties.insert(
                    self.id_key(),
                    json!({"type": "string", "description": format!("{label} ID or URI (e.g., \"article/789\" or \"789\")")}),
                );
                return json!({"type": "object", "properties": properties, "required": [self.id_key()]});
            }
            Action::Search => {
                let mut properties = Map::new();
                properties.insert("query".into(), json!({"type": "string", "description": "Search query for title or content"}));
                properties.insert("limit".into(), json!({"type": "number", "description": "Maximum number of results (default: 20)"}));
                (properties, vec!["query"])
            }
            Action::List => {
                let mut properties = Map::new();
                properties.insert("groupUri".into(), json!({"type": "string", "description": "Filter by group URI (e.g., \"spot/123\")"}));
                properties.insert("limit".into(), json!({"type": "number", "description": "Maximum number of results (default: 20)"}));
                properties.insert(
                    "offset".into(),
                    json!({"type": "number", "description": "Number of results to skip for pagination (default: 0)"}),
                );
                (properties, vec![])
            }
            Action::Delete => {
                let mut properties = Map::new();
                properties.insert(self.id_key(), json!({"type": "number", "description": format!("{label} ID to delete")}));
                return json!({"type": "object", "properties": properties, "required": [self.id_key()]});
            }
        };
        json!({"type": "object", "properties": properties, "required": required})
    }

    async fn execute(&self, arguments: Value) -> Result<ToolResult, ToolError> {
        support::log_input(self.ctx.debug, &self.name, &arguments);
        let outcome = self.run(&arguments).await.map(|value| support::pretty(&value));
        Ok(support::finish(self.ctx.debug, &self.name, outcome))
    }
}

pub fn tools(ctx: &Arc<ToolContext>, kind: &'static CalendarKind) -> Vec<Box<dyn Tool>> {
    Action::ALL
        .iter()
        .map(|&action| Box::new(CalendarTool::new(ctx, kind, action)) as Box<dyn Tool>)
        .collect()
}

pub fn social_event_tools(ctx: &Arc<ToolContext>) -> Vec<Box<dyn Tool>> {
    tools(ctx, &SOCIAL_EVENT)
}

pub fn meeting_tools(ctx: &Arc<ToolContext>) -> Vec<Box<dyn Tool>> {
    tools(ctx, &MEETING)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ctx, find, MockBackend};
    use jamespot_core::backend::Envelope;

    #[test]
    fn names_follow_the_catalog() {
        let tools = meeting_tools(&ctx(&MockBackend::new()));
        let names: Vec<&str> = tools.iter().map(|t| t.name()).collect();
        assert_eq!(
            names,
            vec![
                "jamespot_create_meeting",
                "jamespot_update_meeting",
                "jamespot_get_meeting",
                "jamespot_search_meetings",
                "jamespot_list_meetings",
                "jamespot_delete_meeting",
            ]
        );

        let tools = social_event_tools(&ctx(&MockBackend::new()));
        assert_eq!(tools[0].name(), "jamespot_create_social_event");
        assert_eq!(tools[3].name(), "jamespot_search_social_events");
    }

    #[test]
    fn id_keys_are_camel_case() {
        let backend = MockBackend::new();
        let tools = social_event_tools(&ctx(&backend));
        let schema = find(&tools, "jamespot_get_social_event").parameters_schema();
        assert_eq!(schema["required"], json!(["socialEventId"]));

        let tools = meeting_tools(&ctx(&backend));
        let schema = find(&tools, "jamespot_delete_meeting").parameters_schema();
        assert_eq!(schema["required"], json!(["meetingId"]));
    }

    #[tokio::test]
    async fn create_meeting_returns_links_and_dates() {
        let backend = MockBackend::new().respond(
            "meeting.create",
            Envelope::success(json!([{"id": 31, "uri": "article/31", "title": "Sync"}])),
        );
        let tools = meeting_tools(&ctx(&backend));
        let result = find(&tools, "jamespot_create_meeting")
            .execute(json!({
                "title": "Sync",
                "dateStart": "2025-10-22 10:00:00",
                "dateEnd": "2025-10-22 11:00:00",
                "publishTo": "spot/4",
                "agenda": "<p>Plan</p>",
                "unknown": "dropped"
            }))
            .await
            .unwrap();

        let value: Value = serde_json::from_str(&result.output).unwrap();
        assert_eq!(value["message"], "Meeting created successfully");
        assert_eq!(value["meeting"]["fullUrl"], "https://test.jamespot.pro/article/31");
        assert_eq!(value["meeting"]["dateStart"], "2025-10-22 10:00:00");

        let params = backend.params_of("meeting.create").unwrap();
        assert_eq!(params["agenda"], "<p>Plan</p>");
        assert!(params.get("unknown").is_none());
    }

    #[tokio::test]
    async fn get_meeting_rejects_other_types() {
        let backend = MockBackend::new().respond("article.get", Envelope::success(json!({"id": 5, "type": "article"})));
        let tools = meeting_tools(&ctx(&backend));
        let result = find(&tools, "jamespot_get_meeting").execute(json!({"meetingId": "5"})).await.unwrap();
        assert_eq!(result.output, "Error: The article with ID 5 is not a meeting (type: article)");
        assert_eq!(backend.params_of("article.get").unwrap(), json!({"uri": "article/5"}));
    }

    #[tokio::test]
    async fn update_normalizes_uri() {
        let backend = MockBackend::new().respond("socialEvent.update", Envelope::success(json!({"id": 8})));
        let tools = social_event_tools(&ctx(&backend));
        let result = find(&tools, "jamespot_update_social_event")
            .execute(json!({"uri": "8", "place": "Lyon"}))
            .await
            .unwrap();
        assert!(result.output.contains("Social event updated successfully"));
        assert_eq!(
            backend.params_of("socialEvent.update").unwrap(),
            json!({"uri": "article/8", "place": "Lyon"})
        );
    }

    #[tokio::test]
    async fn list_filters_by_group_and_type() {
        let backend = MockBackend::new().respond("article.list", Envelope::success(json!([])));
        let tools = social_event_tools(&ctx(&backend));
        find(&tools, "jamespot_list_social_events")
            .execute(json!({"groupUri": "spot/2"}))
            .await
            .unwrap();
        assert_eq!(
            backend.params_of("article.list").unwrap(),
            json!({"type": "socialEvent", "limit": 20, "offset": 0, "uiObjectLink": "spot/2"})
        );
    }

    #[tokio::test]
    async fn delete_failure_uses_fallback() {
        let backend = MockBackend::new().respond("article.delete", Envelope { error: 1, result: Value::Null, error_msg: None });
        let tools = meeting_tools(&ctx(&backend));
        let result = find(&tools, "jamespot_delete_meeting").execute(json!({"meetingId": 3})).await.unwrap();
        assert_eq!(result.output, "Error: Failed to delete meeting");
    }
}
