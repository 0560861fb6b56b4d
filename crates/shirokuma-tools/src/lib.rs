//! MCP tool surface: declarative schemas and dispatch to the repository
//! services.
//!
//! The transport (JSON-RPC framing, stdio loop) lives in the CLI; this
//! crate owns the tool registry and the strict parameter validation in
//! front of every service call.

pub mod defs;
pub mod error;
pub mod params;

use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use shirokuma_core::enums::BaseType;
use shirokuma_core::filter::{ListFilter, SearchPage};
use shirokuma_core::validation::parse_date_field;
use shirokuma_repo::{CreateItem, Repository, StateUpdate, UpdateItem};

pub use defs::{ToolDef, tool_definitions};
pub use error::{Result, ToolError};

use params::*;

/// The three tool names whose absence is part of the contract.
const FORBIDDEN_STATUS_TOOLS: &[&str] = &["create_status", "update_status", "delete_status"];

fn parse<T: DeserializeOwned>(params: Value) -> Result<T> {
    let params = if params.is_null() { json!({}) } else { params };
    serde_json::from_value(params).map_err(|e| ToolError::InvalidParams(e.to_string()))
}

fn to_value<T: serde::Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value)
        .map_err(|e| ToolError::Repo(shirokuma_repo::RepoError::Internal(e.to_string())))
}

/// Dispatches one tool call against the repository. Unknown tool names --
/// including the status CRUD family -- fail with [`ToolError::ToolNotFound`].
pub fn dispatch(repo: &Repository, tool: &str, params: Value) -> Result<Value> {
    match tool {
        "get_items" => {
            let p: GetItemsParams = parse(params)?;
            let filter = ListFilter {
                statuses: p.statuses.unwrap_or_default(),
                include_closed_statuses: p.include_closed_statuses,
                start_date: parse_opt_date(p.start_date.as_deref())?,
                end_date: parse_opt_date(p.end_date.as_deref())?,
                tags: p.tags.unwrap_or_default(),
                limit: p.limit,
                offset: p.offset.unwrap_or(0),
            };
            to_value(&repo.get_items(&p.type_name, &filter)?)
        }
        "get_item_detail" => {
            let p: GetItemDetailParams = parse(params)?;
            to_value(&repo.get_item_detail(&p.type_name, &p.id)?)
        }
        "create_item" => {
            let p: CreateItemParams = parse(params)?;
            let input = CreateItem {
                type_name: p.type_name,
                title: p.title,
                description: p.description,
                content: p.content,
                status: p.status,
                priority: p.priority,
                tags: p.tags.unwrap_or_default(),
                related: p.related.unwrap_or_default(),
                related_tasks: p.related_tasks.unwrap_or_default(),
                related_documents: p.related_documents.unwrap_or_default(),
                start_date: p.start_date,
                end_date: p.end_date,
                category: p.category,
                version: p.version,
                date: p.date,
                datetime: p.datetime,
            };
            to_value(&repo.create_item(input)?)
        }
        "update_item" => {
            let p: UpdateItemParams = parse(params)?;
            let patch = UpdateItem {
                title: p.title,
                description: p.description,
                content: p.content,
                status: p.status,
                priority: p.priority,
                tags: p.tags,
                related: p.related,
                related_tasks: p.related_tasks,
                related_documents: p.related_documents,
                start_date: p.start_date,
                end_date: p.end_date,
                category: p.category,
                version: p.version,
            };
            to_value(&repo.update_item(&p.type_name, &p.id, patch)?)
        }
        "delete_item" => {
            let p: DeleteItemParams = parse(params)?;
            repo.delete_item(&p.type_name, &p.id)?;
            Ok(json!(format!("{} with ID {} deleted", p.type_name, p.id)))
        }
        "change_item_type" => {
            let p: ChangeItemTypeParams = parse(params)?;
            to_value(&repo.change_item_type(&p.from_type, &p.from_id, &p.to_type)?)
        }
        "search_items" => {
            let p: SearchItemsParams = parse(params)?;
            let page = SearchPage::new(p.limit, p.offset);
            to_value(&repo.search_items(&p.query, &p.types.unwrap_or_default(), page)?)
        }
        "search_suggest" => {
            let p: SearchSuggestParams = parse(params)?;
            to_value(&repo.search_suggest(&p.query, &p.types.unwrap_or_default(), p.limit)?)
        }
        "search_items_by_tag" => {
            let p: SearchItemsByTagParams = parse(params)?;
            to_value(&repo.search_items_by_tag(&p.tag, &p.types.unwrap_or_default())?)
        }
        "get_tags" => {
            let _: EmptyParams = parse(params)?;
            to_value(&repo.store().list_tags().map_err(shirokuma_repo::RepoError::from)?)
        }
        "create_tag" => {
            let p: CreateTagParams = parse(params)?;
            let tag = repo.create_tag(&p.name)?;
            to_value(&tag)
        }
        "delete_tag" => {
            let p: DeleteTagParams = parse(params)?;
            let affected = repo.delete_tag(&p.name)?;
            Ok(json!(format!(
                "tag \"{}\" deleted from {affected} items",
                p.name
            )))
        }
        "search_tags" => {
            let p: SearchTagsParams = parse(params)?;
            to_value(
                &repo
                    .store()
                    .search_tags(&p.pattern)
                    .map_err(shirokuma_repo::RepoError::from)?,
            )
        }
        "get_statuses" => {
            let _: EmptyParams = parse(params)?;
            Ok(json!(repo.statuses_markdown()?))
        }
        "get_types" => {
            let p: GetTypesParams = parse(params)?;
            to_value(&repo.get_types(p.include_definitions)?)
        }
        "create_type" => {
            let p: CreateTypeParams = parse(params)?;
            let base_type = match p.base_type.as_deref() {
                None => BaseType::Documents,
                Some(s) => BaseType::parse(s).ok_or_else(|| {
                    ToolError::InvalidParams(format!(
                        "invalid base_type {s:?} (expected \"tasks\" or \"documents\")"
                    ))
                })?,
            };
            to_value(&repo.create_type(&p.name, base_type, p.description.as_deref())?)
        }
        "update_type" => {
            let p: UpdateTypeParams = parse(params)?;
            to_value(&repo.update_type(&p.name, &p.description)?)
        }
        "delete_type" => {
            let p: DeleteTypeParams = parse(params)?;
            repo.delete_type(&p.name)?;
            Ok(json!(format!("type \"{}\" deleted", p.name)))
        }
        "get_current_state" => {
            let _: EmptyParams = parse(params)?;
            to_value(&repo.get_current_state()?)
        }
        "update_current_state" => {
            let p: UpdateCurrentStateParams = parse(params)?;
            let update = StateUpdate {
                content: p.content,
                tags: p.tags,
                related: p.related,
                metadata: p.metadata,
            };
            to_value(&repo.update_current_state(update)?)
        }
        other => Err(ToolError::ToolNotFound(other.to_owned())),
    }
}

fn parse_opt_date(value: Option<&str>) -> Result<Option<chrono::NaiveDate>> {
    match value {
        None => Ok(None),
        Some(s) => parse_date_field(s)
            .map(Some)
            .map_err(|e| ToolError::InvalidParams(e.to_string())),
    }
}

/// Returns `true` when a tool name is part of the deliberately absent
/// status CRUD family (useful for targeted error messages in transports).
pub fn is_forbidden_status_tool(name: &str) -> bool {
    FORBIDDEN_STATUS_TOOLS.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn open_repo() -> (TempDir, Repository) {
        let tmp = TempDir::new().unwrap();
        let repo = Repository::open(tmp.path().join("data")).unwrap();
        (tmp, repo)
    }

    #[test]
    fn create_then_query_flow() {
        let (_tmp, repo) = open_repo();
        let created = dispatch(
            &repo,
            "create_item",
            json!({
                "type": "issues",
                "title": "Auth Bug",
                "priority": "high",
                "tags": ["bug", "auth"]
            }),
        )
        .unwrap();
        assert_eq!(created["id"], 1);
        assert_eq!(created["priority"], "HIGH");

        let tags = dispatch(&repo, "get_tags", Value::Null).unwrap();
        let names: Vec<&str> = tags
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert!(names.contains(&"bug") && names.contains(&"auth"));

        let items = dispatch(&repo, "get_items", json!({"type": "issues"})).unwrap();
        assert_eq!(items.as_array().unwrap().len(), 1);

        let hits = dispatch(&repo, "search_items", json!({"query": "Auth"})).unwrap();
        assert_eq!(hits.as_array().unwrap().len(), 1);
    }

    #[test]
    fn list_view_has_exact_field_set() {
        let (_tmp, repo) = open_repo();
        dispatch(
            &repo,
            "create_item",
            json!({"type": "issues", "title": "Shape check", "content": "hidden"}),
        )
        .unwrap();
        let items = dispatch(&repo, "get_items", json!({"type": "issues"})).unwrap();
        let mut keys: Vec<&str> =
            items[0].as_object().unwrap().keys().map(|k| k.as_str()).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec!["description", "id", "priority", "status", "tags", "title", "type", "updated_at"]
        );
    }

    #[test]
    fn unknown_tool_and_status_crud_fail_with_tool_not_found() {
        let (_tmp, repo) = open_repo();
        for name in ["create_status", "update_status", "delete_status", "bogus"] {
            let err = dispatch(&repo, name, json!({})).unwrap_err();
            assert_eq!(err.code(), "ToolNotFound", "{name}");
        }
        assert!(is_forbidden_status_tool("create_status"));
        assert!(!is_forbidden_status_tool("get_statuses"));
    }

    #[test]
    fn unknown_parameter_key_is_validation_error() {
        let (_tmp, repo) = open_repo();
        let err = dispatch(
            &repo,
            "get_item_detail",
            json!({"type": "issues", "id": 1, "extra": true}),
        )
        .unwrap_err();
        assert_eq!(err.code(), "ValidationError");
    }

    #[test]
    fn missing_item_maps_to_not_found_code() {
        let (_tmp, repo) = open_repo();
        let err = dispatch(
            &repo,
            "get_item_detail",
            json!({"type": "issues", "id": 42}),
        )
        .unwrap_err();
        assert_eq!(err.code(), "NotFoundError");
        assert_eq!(err.to_string(), "issues with ID 42 not found");
    }

    #[test]
    fn get_statuses_renders_markdown() {
        let (_tmp, repo) = open_repo();
        let table = dispatch(&repo, "get_statuses", Value::Null).unwrap();
        assert!(table.as_str().unwrap().contains("| Open | No |"));
    }

    #[test]
    fn update_current_state_with_bad_ref_is_reference_error() {
        let (_tmp, repo) = open_repo();
        let err = dispatch(
            &repo,
            "update_current_state",
            json!({"content": "hi", "related": ["issues-9999"]}),
        )
        .unwrap_err();
        assert_eq!(err.code(), "ReferenceError");
        assert!(err.to_string().contains("issues-9999"));
    }

    #[test]
    fn change_item_type_returns_counts() {
        let (_tmp, repo) = open_repo();
        dispatch(&repo, "create_item", json!({"type": "issues", "title": "Mover"})).unwrap();
        let result = dispatch(
            &repo,
            "change_item_type",
            json!({"from_type": "issues", "from_id": 1, "to_type": "plans"}),
        )
        .unwrap();
        assert_eq!(result["new_id"], 1);
        assert_eq!(result["migrated_references"], 0);
    }
}
