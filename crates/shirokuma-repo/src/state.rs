//! Current-state service: the latest-wins singleton document.
//!
//! Unlike item references, state references are validated strictly at
//! write time: one missing target rejects the whole update, enumerating
//! the invalid ids and the valid subset, without mutating anything.

use serde::Serialize;

use chrono::{DateTime, Utc};
use shirokuma_core::refs::ItemRef;
use shirokuma_core::state::{
    CurrentState, STATE_PRIORITY, STATE_TITLE, STATE_TYPE, StateMetadata,
};
use shirokuma_core::validation::ValidationError;
use shirokuma_markdown::front_matter::assemble_document;
use shirokuma_markdown::layout;

use crate::error::{RepoError, Result};
use crate::repository::{Repository, now_ms};

/// Input for [`Repository::update_current_state`].
#[derive(Debug, Clone, Default)]
pub struct StateUpdate {
    pub content: String,
    pub tags: Option<Vec<String>>,
    pub related: Option<Vec<String>>,
    pub metadata: Option<StateMetadata>,
}

/// The wire shape of `get_current_state`.
#[derive(Debug, Clone, Serialize)]
pub struct StateView {
    pub content: String,
    pub metadata: StateViewMetadata,
}

#[derive(Debug, Clone, Serialize)]
pub struct StateViewMetadata {
    pub title: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub priority: String,
    pub tags: Vec<String>,
    pub related: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
}

fn view_of(state: CurrentState) -> StateView {
    StateView {
        content: state.content,
        metadata: StateViewMetadata {
            title: STATE_TITLE.to_owned(),
            type_name: STATE_TYPE.to_owned(),
            priority: STATE_PRIORITY.to_owned(),
            tags: state.tags,
            related: state.related.iter().map(ItemRef::token).collect(),
            updated_at: state.updated_at,
            updated_by: state.metadata.updated_by,
        },
    }
}

/// Front-matter shape of a state history file.
#[derive(Debug, Serialize)]
struct StateDoc<'a> {
    title: &'a str,
    #[serde(rename = "type")]
    type_name: &'a str,
    priority: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tags: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    related: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    updated_by: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<&'a str>,
    updated_at: DateTime<Utc>,
}

fn render_state(state: &CurrentState, updated_at: DateTime<Utc>) -> Result<String> {
    let doc = StateDoc {
        title: STATE_TITLE,
        type_name: STATE_TYPE,
        priority: STATE_PRIORITY,
        tags: state.tags.clone(),
        related: state.related.iter().map(ItemRef::token).collect(),
        updated_by: state.metadata.updated_by.as_deref(),
        context: state.metadata.context.as_deref(),
        updated_at,
    };
    let yaml = serde_yaml::to_string(&doc)
        .map_err(|e| RepoError::Internal(format!("state serialization failed: {e}")))?;
    Ok(assemble_document(&yaml, &state.content))
}

impl Repository {
    /// Reads the current state, or the default skeleton when nothing has
    /// ever been written.
    pub fn get_current_state(&self) -> Result<StateView> {
        let state = self
            .store()
            .current_state()?
            .map(|(state, _)| state)
            .unwrap_or_default();
        Ok(view_of(state))
    }

    /// Overwrites the current state. Every `related` entry must name a live
    /// item; otherwise the error lists the invalid ids and the valid subset
    /// and the prior state is untouched. Tags are auto-registered.
    pub fn update_current_state(&self, update: StateUpdate) -> Result<StateView> {
        let tags = match update.tags {
            Some(ref tags) => shirokuma_core::validation::normalize_tags(tags)?,
            None => Vec::new(),
        };

        let mut related: Vec<ItemRef> = Vec::new();
        for token in update.related.as_deref().unwrap_or(&[]) {
            let r = ItemRef::parse(token)
                .ok_or_else(|| ValidationError::MalformedReference(token.clone()))?;
            if !related.contains(&r) {
                related.push(r);
            }
        }

        // Strict referential validation, outside the write path: nothing
        // mutates when any target is missing.
        let mut invalid: Vec<String> = Vec::new();
        let mut valid: Vec<String> = Vec::new();
        for r in &related {
            let exists = self.store().get_type(&r.type_name).is_ok()
                && self.store().item_exists(&r.type_name, &r.id)?;
            if exists {
                valid.push(r.token());
            } else {
                invalid.push(r.token());
            }
        }
        if !invalid.is_empty() {
            return Err(RepoError::Reference(format!(
                "Invalid related references: {}. Valid references are: [{}]",
                invalid.join(", "),
                valid.join(", ")
            )));
        }

        let updated_at = now_ms();
        let state = CurrentState {
            content: update.content,
            tags,
            related,
            metadata: update.metadata.unwrap_or_default(),
            updated_at: Some(updated_at),
        };

        self.with_write(|tx, staging| {
            for tag in &state.tags {
                tx.ensure_tag(tag)?;
            }
            let revision = tx.put_state(&state, updated_at)?;
            let rendered = render_state(&state, updated_at)?;
            staging.stage_write(&layout::state_rel_path(revision), &rendered)?;
            staging.stage_write(&layout::latest_state_rel_path(), &rendered)?;
            Ok(())
        })?;

        self.get_current_state()
    }
}
