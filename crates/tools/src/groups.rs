//! Group (spot) tools.

use crate::backend_tool::BackendTool;
use crate::support::{args, ToolContext};
use jamespot_core::tool::Tool;
use serde_json::{json, Value};
use std::sync::Arc;

fn group_id_schema(description: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "groupId": { "type": "string", "description": description }
        },
        "required": ["groupId"]
    })
}

fn group_id(arguments: &Value) -> Result<Value, String> {
    Ok(json!({"idSpot": args::id_text(arguments, "groupId")?}))
}

pub fn tools(ctx: &Arc<ToolContext>) -> Vec<Box<dyn Tool>> {
    vec![
        BackendTool::new(ctx, "jamespot_list_groups", "group.list")
            .with_description("List all groups (communities, teams) that the current user is a member of in Jamespot.")
            .with_schema(json!({
                "type": "object",
                "properties": {
                    "limit": { "type": "number", "description": "Maximum number of groups to return (default: 50)" },
                    "visibility": { "type": "boolean", "description": "Visibility of the group : public or private" }
                }
            }))
            .with_fallback("Failed to list groups")
            .with_params(|a, _| {
                Ok(json!({
                    "type": "spot",
                    "public": args::opt_bool(a, "visibility").unwrap_or(true),
                    "limit": args::number_or(a, "limit", 50),
                }))
            })
            .boxed(),
        BackendTool::new(ctx, "jamespot_get_group", "group.getSpot")
            .with_description("Get detailed information about a specific group/community in Jamespot by its ID.")
            .with_schema(group_id_schema("Group ID (numeric)"))
            .with_fallback("Failed to get group")
            .with_params(|a, _| group_id(a))
            .boxed(),
        BackendTool::new(ctx, "jamespot_get_group_members", "group.getObjectListJamespotSpotMembers")
            .with_description("Get the list of members of a specific group/community in Jamespot.")
            .with_schema(json!({
                "type": "object",
                "properties": {
                    "groupId": { "type": "string", "description": "Group ID (numeric)" },
                    "limit": { "type": "number", "description": "Maximum number of members to return (default: 100)" }
                },
                "required": ["groupId"]
            }))
            .with_fallback("Failed to get group members")
            .with_params(|a, _| {
                Ok(json!({
                    "idSpot": args::id_text(a, "groupId")?,
                    "limit": args::number_or(a, "limit", 100),
                }))
            })
            .boxed(),
        BackendTool::new(ctx, "jamespot_search_groups", "group.list")
            .with_description("Search for groups/communities in Jamespot by name or description.")
            .with_schema(json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "Search query for group name or description" }
                },
                "required": ["query"]
            }))
            .with_fallback("Failed to search groups")
            .with_params(|a, _| {
                Ok(json!({
                    "type": "spot",
                    "public": true,
                    "limit": 50,
                    "query": args::string(a, "query")?,
                }))
            })
            .boxed(),
        BackendTool::new(ctx, "jamespot_create_group", "group.create")
            .with_description("Create a new group/community in Jamespot. This will create a new collaborative space.")
            .with_schema(json!({
                "type": "object",
                "properties": {
                    "type": { "type": "string", "description": "Group type (e.g., \"spot\", \"projet\"). Default value : \"spot\"" },
                    "title": { "type": "string", "description": "Group title/name" },
                    "description": { "type": "string", "description": "Group description" },
                    "privacy": {
                        "type": ["string", "number"],
                        "description": "Privacy level: \"public\" (0), \"private\" (1), or \"secret\" (2)"
                    },
                    "edito": { "type": ["string", "null"], "description": "Editorial content for the group (optional)" },
                    "language": { "type": "string", "description": "Language code (e.g., \"fr\", \"en\")" },
                    "category": { "type": "string", "description": "Category identifier for the group" },
                    "idCommunity": { "type": "string", "description": "Parent community ID if this is a subgroup (optional)" }
                },
                "required": ["type", "title", "description", "privacy", "language", "category"]
            }))
            .with_fallback("Failed to create group")
            .with_params(|a, _| {
                args::string(a, "title")?;
                let mut fields = args::pick(
                    a,
                    &["type", "title", "description", "privacy", "edito", "language", "category", "idCommunity"],
                );
                fields.entry("type").or_insert_with(|| json!("spot"));
                Ok(Value::Object(fields))
            })
            .boxed(),
        BackendTool::new(ctx, "jamespot_get_categories_configuration", "group.getCategoriesConfiguration")
            .with_description("Get the configuration of group categories in Jamespot. This returns detailed category settings.")
            .with_fallback("Failed to get categories configuration")
            .boxed(),
        BackendTool::new(ctx, "jamespot_get_categories", "group.getCategories")
            .with_description("Get the list of available group categories in Jamespot.")
            .with_fallback("Failed to get categories")
            .boxed(),
        BackendTool::new(ctx, "jamespot_count_members", "group.countMembers")
            .with_description("Count the number of members in a specific group/community.")
            .with_schema(json!({
                "type": "object",
                "properties": {
                    "uri": { "type": "string", "description": "Group URI identifier" }
                },
                "required": ["uri"]
            }))
            .with_fallback("Failed to count members")
            .with_params(|a, _| Ok(json!({"uri": args::string(a, "uri")?})))
            .with_render(|count, _, _| json!({"count": count}))
            .boxed(),
        BackendTool::new(ctx, "jamespot_get_group_properties", "group.getProperties")
            .with_description(
                "Get the properties of a group that are not within the standard model. This includes additional configuration and settings.",
            )
            .with_schema(group_id_schema("Group ID (numeric)"))
            .with_fallback("Failed to get group properties")
            .with_params(|a, _| group_id(a))
            .boxed(),
        BackendTool::new(ctx, "jamespot_add_member", "group.changeMemberRole")
            .with_description(
                "Add a member to a group or change an existing member's role. Role levels: 0 (member), 1 (moderator), 2 (admin), 3 (owner).",
            )
            .with_schema(json!({
                "type": "object",
                "properties": {
                    "idUser": { "type": "number", "description": "User ID to add or modify" },
                    "role": { "type": "number", "description": "Role level: 0 (member), 1 (moderator), 2 (admin), 3 (owner)" },
                    "idSpot": { "type": "number", "description": "Group/Spot ID" }
                },
                "required": ["idUser", "role", "idSpot"]
            }))
            .with_fallback("Failed to add/update member")
            .with_params(|a, _| {
                let role = args::number(a, "role")?;
                if !(0..=3).contains(&role) {
                    return Err(format!("Role must be between 0 and 3, got {role}"));
                }
                Ok(json!({
                    "idUser": args::number(a, "idUser")?,
                    "role": role,
                    "idSpot": args::number(a, "idSpot")?,
                }))
            })
            .with_render(|_, _, _| json!({"success": true, "message": "Member role updated successfully"}))
            .boxed(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ctx, find, MockBackend};
    use jamespot_core::backend::Envelope;

    #[tokio::test]
    async fn list_groups_sends_spot_filter_with_defaults() {
        let backend = MockBackend::new().respond("group.list", Envelope::success(json!([{"id": 1, "title": "Eng"}])));
        let tools = tools(&ctx(&backend));

        let result = find(&tools, "jamespot_list_groups").execute(json!({})).await.unwrap();
        assert!(result.success);
        assert!(result.output.contains("\"title\": \"Eng\""));
        assert_eq!(
            backend.params_of("group.list").unwrap(),
            json!({"type": "spot", "public": true, "limit": 50})
        );
    }

    #[tokio::test]
    async fn list_groups_failure_without_message_uses_fallback() {
        let backend = MockBackend::new().respond("group.list", Envelope { error: 2, result: Value::Null, error_msg: None });
        let tools = tools(&ctx(&backend));
        let result = find(&tools, "jamespot_list_groups").execute(json!({"limit": 5})).await.unwrap();
        assert_eq!(result.output, "Error: Failed to list groups");
    }

    #[tokio::test]
    async fn search_groups_passes_query() {
        let backend = MockBackend::new().respond("group.list", Envelope::success(json!([])));
        let tools = tools(&ctx(&backend));
        find(&tools, "jamespot_search_groups").execute(json!({"query": "design"})).await.unwrap();
        assert_eq!(backend.params_of("group.list").unwrap()["query"], "design");
    }

    #[tokio::test]
    async fn count_members_wraps_the_count() {
        let backend = MockBackend::new().respond("group.countMembers", Envelope::success(json!(42)));
        let tools = tools(&ctx(&backend));
        let result = find(&tools, "jamespot_count_members").execute(json!({"uri": "spot/3"})).await.unwrap();
        assert_eq!(serde_json::from_str::<Value>(&result.output).unwrap(), json!({"count": 42}));
    }

    #[tokio::test]
    async fn add_member_rejects_unknown_roles() {
        let backend = MockBackend::new();
        let tools = tools(&ctx(&backend));
        let result = find(&tools, "jamespot_add_member")
            .execute(json!({"idUser": 1, "role": 9, "idSpot": 2}))
            .await
            .unwrap();
        assert_eq!(result.output, "Error: Role must be between 0 and 3, got 9");
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn create_group_defaults_type() {
        let backend = MockBackend::new().respond("group.create", Envelope::success(json!({"id": 9})));
        let tools = tools(&ctx(&backend));
        find(&tools, "jamespot_create_group")
            .execute(json!({"title": "New", "description": "d", "privacy": 0, "language": "en", "category": "c"}))
            .await
            .unwrap();
        assert_eq!(backend.params_of("group.create").unwrap()["type"], "spot");
    }
}
