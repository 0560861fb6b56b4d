//! Declarative tool definitions: name, description, input schema.
//!
//! The schemas mirror the `deny_unknown_fields` parameter structs in
//! `params.rs`; `additionalProperties: false` is the schema-side statement
//! of the same contract.

use serde::Serialize;
use serde_json::{Value, json};

/// One tool in the registry.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDef {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
}

fn schema(properties: Value, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false
    })
}

fn string() -> Value {
    json!({"type": "string"})
}

fn string_array() -> Value {
    json!({"type": "array", "items": {"type": "string"}})
}

fn integer() -> Value {
    json!({"type": "integer"})
}

fn boolean() -> Value {
    json!({"type": "boolean"})
}

/// Wire ids: integers for normal types, strings for sessions/dailies.
fn item_id() -> Value {
    json!({"type": ["integer", "string"]})
}

/// The full tool registry. Status CRUD is deliberately absent: callers
/// asking for `create_status`/`update_status`/`delete_status` get
/// `ToolNotFound`.
pub fn tool_definitions() -> Vec<ToolDef> {
    vec![
        ToolDef {
            name: "get_items",
            description: "List items of one type (list view; closed statuses filtered out by default)",
            input_schema: schema(
                json!({
                    "type": string(),
                    "statuses": string_array(),
                    "includeClosedStatuses": boolean(),
                    "start_date": string(),
                    "end_date": string(),
                    "limit": integer(),
                    "offset": integer(),
                    "tags": string_array(),
                }),
                &["type"],
            ),
        },
        ToolDef {
            name: "get_item_detail",
            description: "Get one item with content and relations",
            input_schema: schema(
                json!({"type": string(), "id": item_id()}),
                &["type", "id"],
            ),
        },
        ToolDef {
            name: "create_item",
            description: "Create an item of any registered type",
            input_schema: schema(
                json!({
                    "type": string(),
                    "title": string(),
                    "description": string(),
                    "content": string(),
                    "status": string(),
                    "priority": string(),
                    "tags": string_array(),
                    "related": string_array(),
                    "related_tasks": string_array(),
                    "related_documents": string_array(),
                    "start_date": string(),
                    "end_date": string(),
                    "category": string(),
                    "version": string(),
                    "date": string(),
                    "datetime": string(),
                }),
                &["type", "title"],
            ),
        },
        ToolDef {
            name: "update_item",
            description: "Partially update an item; omitted fields are preserved",
            input_schema: schema(
                json!({
                    "type": string(),
                    "id": item_id(),
                    "title": string(),
                    "description": string(),
                    "content": string(),
                    "status": string(),
                    "priority": string(),
                    "tags": string_array(),
                    "related": string_array(),
                    "related_tasks": string_array(),
                    "related_documents": string_array(),
                    "start_date": string(),
                    "end_date": string(),
                    "category": string(),
                    "version": string(),
                }),
                &["type", "id"],
            ),
        },
        ToolDef {
            name: "delete_item",
            description: "Delete an item; inbound references stay observable",
            input_schema: schema(
                json!({"type": string(), "id": item_id()}),
                &["type", "id"],
            ),
        },
        ToolDef {
            name: "change_item_type",
            description: "Move an item to another type within the same base type",
            input_schema: schema(
                json!({
                    "from_type": string(),
                    "from_id": item_id(),
                    "to_type": string(),
                }),
                &["from_type", "from_id", "to_type"],
            ),
        },
        ToolDef {
            name: "search_items",
            description: "Full-text search; every whitespace-separated token must match",
            input_schema: schema(
                json!({
                    "query": string(),
                    "types": string_array(),
                    "limit": integer(),
                    "offset": integer(),
                }),
                &["query"],
            ),
        },
        ToolDef {
            name: "search_suggest",
            description: "Prefix suggestions over titles and tags",
            input_schema: schema(
                json!({
                    "query": string(),
                    "types": string_array(),
                    "limit": integer(),
                }),
                &["query"],
            ),
        },
        ToolDef {
            name: "search_items_by_tag",
            description: "Exact tag lookup grouped by base type",
            input_schema: schema(
                json!({"tag": string(), "types": string_array()}),
                &["tag"],
            ),
        },
        ToolDef {
            name: "get_tags",
            description: "List all registered tags",
            input_schema: schema(json!({}), &[]),
        },
        ToolDef {
            name: "create_tag",
            description: "Register a tag explicitly",
            input_schema: schema(json!({"name": string()}), &["name"]),
        },
        ToolDef {
            name: "delete_tag",
            description: "Delete a tag everywhere (cascades to items)",
            input_schema: schema(json!({"name": string()}), &["name"]),
        },
        ToolDef {
            name: "search_tags",
            description: "List tags whose name contains a pattern",
            input_schema: schema(json!({"pattern": string()}), &["pattern"]),
        },
        ToolDef {
            name: "get_statuses",
            description: "The fixed status table as a markdown table",
            input_schema: schema(json!({}), &[]),
        },
        ToolDef {
            name: "get_types",
            description: "List registered types, optionally with field definitions",
            input_schema: schema(
                json!({"include_definitions": boolean()}),
                &[],
            ),
        },
        ToolDef {
            name: "create_type",
            description: "Register a new type on the tasks or documents rail",
            input_schema: schema(
                json!({
                    "name": string(),
                    "base_type": json!({"type": "string", "enum": ["tasks", "documents"]}),
                    "description": string(),
                }),
                &["name"],
            ),
        },
        ToolDef {
            name: "update_type",
            description: "Update a type's description (the name is immutable)",
            input_schema: schema(
                json!({"name": string(), "description": string()}),
                &["name", "description"],
            ),
        },
        ToolDef {
            name: "delete_type",
            description: "Delete a type that has no items",
            input_schema: schema(json!({"name": string()}), &["name"]),
        },
        ToolDef {
            name: "get_current_state",
            description: "Read the current-state document",
            input_schema: schema(json!({}), &[]),
        },
        ToolDef {
            name: "update_current_state",
            description: "Overwrite the current-state document; related references are validated",
            input_schema: schema(
                json!({
                    "content": string(),
                    "tags": string_array(),
                    "related": string_array(),
                    "metadata": json!({"type": "object"}),
                }),
                &["content"],
            ),
        },
    ]
}
