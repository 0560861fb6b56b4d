//! Type and status registry service.
//!
//! Types are runtime-created over the two base-type rails; the reserved
//! names `sessions`/`dailies` are pre-registered and immutable. Statuses
//! are read-only everywhere: there is deliberately no create/update/delete
//! entry point for them in this crate or any surface above it.

use serde::Serialize;

use shirokuma_core::enums::{BaseType, TypeDef, is_reserved_type};
use shirokuma_core::status::Status;
use shirokuma_core::validation::validate_type_slug;

use crate::error::{RepoError, Result};
use crate::repository::Repository;

/// A type row with its field definitions, for `get_types` with
/// `include_definitions`.
#[derive(Debug, Clone, Serialize)]
pub struct TypeInfo {
    #[serde(flatten)]
    pub def: TypeDef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supported_fields: Option<Vec<&'static str>>,
}

/// Fields available on items of a tasks-base type.
const TASK_FIELDS: &[&str] = &[
    "title",
    "description",
    "content",
    "status",
    "priority",
    "category",
    "version",
    "start_date",
    "end_date",
    "tags",
    "related",
];

/// Fields available on items of a documents-base type (`content` required).
const DOCUMENT_FIELDS: &[&str] = &[
    "title",
    "description",
    "content",
    "status",
    "priority",
    "category",
    "version",
    "tags",
    "related",
];

impl Repository {
    /// Lists registered types, optionally with their field definitions.
    pub fn get_types(&self, include_definitions: bool) -> Result<Vec<TypeInfo>> {
        let types = self.store().list_types()?;
        Ok(types
            .into_iter()
            .map(|def| {
                let supported_fields = include_definitions.then(|| {
                    match def.base_type {
                        BaseType::Tasks => TASK_FIELDS.to_vec(),
                        BaseType::Documents => DOCUMENT_FIELDS.to_vec(),
                    }
                });
                TypeInfo {
                    def,
                    supported_fields,
                }
            })
            .collect())
    }

    /// Registers a new type on one of the base-type rails.
    pub fn create_type(
        &self,
        name: &str,
        base_type: BaseType,
        description: Option<&str>,
    ) -> Result<TypeDef> {
        validate_type_slug(name)?;
        if is_reserved_type(name) {
            return Err(RepoError::Conflict(format!(
                "type \"{name}\" is reserved and cannot be created"
            )));
        }
        self.with_write(|tx, _staging| {
            tx.insert_type(name, base_type, description)
                .map_err(|e| match e {
                    shirokuma_storage::StorageError::Conflict { message } => {
                        RepoError::Conflict(message)
                    }
                    other => other.into(),
                })?;
            tx.get_type(name).map_err(Into::into)
        })
    }

    /// Updates a type's description. The name is immutable.
    pub fn update_type(&self, name: &str, description: &str) -> Result<TypeDef> {
        let def = self.get_type(name)?;
        if def.is_reserved {
            return Err(RepoError::Conflict(format!(
                "type \"{name}\" is reserved and cannot be updated"
            )));
        }
        self.with_write(|tx, _staging| {
            tx.update_type_description(name, description)?;
            tx.get_type(name).map_err(Into::into)
        })
    }

    /// Deletes a type. Allowed only when no items of the type exist;
    /// reserved types are never deletable.
    pub fn delete_type(&self, name: &str) -> Result<()> {
        let def = self.get_type(name)?;
        if def.is_reserved {
            return Err(RepoError::Conflict(format!(
                "type \"{name}\" is reserved and cannot be deleted"
            )));
        }
        self.with_write(|tx, _staging| {
            let count = tx.count_items(name)?;
            if count > 0 {
                return Err(RepoError::Conflict(format!(
                    "type \"{name}\" still has {count} items"
                )));
            }
            tx.remove_type(name)?;
            Ok(())
        })
    }

    /// Lists the fixed status table.
    pub fn get_statuses(&self) -> Result<Vec<Status>> {
        Ok(self.store().list_statuses()?)
    }

    /// Renders the status table as the markdown surface `get_statuses`
    /// returns.
    pub fn statuses_markdown(&self) -> Result<String> {
        let statuses = self.get_statuses()?;
        let mut out = String::from("| Status | Closable |\n|--------|----------|\n");
        for s in statuses {
            out.push_str(&format!(
                "| {} | {} |\n",
                s.name,
                if s.is_closable { "Yes" } else { "No" }
            ));
        }
        Ok(out)
    }
}
