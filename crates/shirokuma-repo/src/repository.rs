//! The repository: dual-write orchestration over the index and the
//! Markdown tree.
//!
//! Every mutation runs under one write mutex and follows the same shape:
//! open a staging set, run the SQL transaction (staging file writes along
//! the way), commit the transaction, then rename the staged files into
//! place. A failure before commit discards the staging directory and rolls
//! back the SQL; a failure after commit leaves the index authoritative and
//! is surfaced as an integrity error.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Duration, Timelike, Utc};
use fs2::FileExt;
use serde::Serialize;
use tracing::{info, warn};

use shirokuma_core::enums::{Priority, TypeDef, is_reserved_type};
use shirokuma_core::id::{self, ItemId};
use shirokuma_core::item::{Item, ItemDetail, ListItem};
use shirokuma_core::filter::ListFilter;
use shirokuma_core::refs::ItemRef;
use shirokuma_core::validation::{
    ValidationError, normalize_tags, parse_date_field, validate_content, validate_description,
    validate_short_field, validate_title,
};
use shirokuma_markdown::document::render_item;
use shirokuma_markdown::layout;
use shirokuma_markdown::{Staging, atomic_write};
use shirokuma_storage::sqlite::transaction::IndexTx;
use shirokuma_storage::{IndexStore, StorageError};

use crate::error::{RepoError, Result};

/// Relative path of the index database under the data root.
const INDEX_DB_REL: &str = ".system/index.db";
/// Relative path of the advisory lock file under the data root.
const LOCK_FILE_REL: &str = ".system/lock";

/// The knowledge-base repository. Single writer per data root, enforced by
/// an advisory file lock at open and a write mutex per operation.
#[derive(Debug)]
pub struct Repository {
    root: PathBuf,
    store: IndexStore,
    write_lock: Mutex<()>,
    /// Held for the repository's lifetime; the fs2 lock releases on drop.
    _lock_file: fs::File,
}

/// Input for [`Repository::create_item`]. Reference tokens are `type-id`
/// strings; `date`/`datetime` drive the reserved-type id policies.
#[derive(Debug, Clone, Default)]
pub struct CreateItem {
    pub type_name: String,
    pub title: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub tags: Vec<String>,
    pub related: Vec<String>,
    pub related_tasks: Vec<String>,
    pub related_documents: Vec<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub category: Option<String>,
    pub version: Option<String>,
    /// Daily date override (`YYYY-MM-DD`); dailies only.
    pub date: Option<String>,
    /// Session timestamp override; sessions only.
    pub datetime: Option<String>,
}

/// Partial update for [`Repository::update_item`]. `None` preserves the
/// current value; an empty string clears an optional field.
#[derive(Debug, Clone, Default)]
pub struct UpdateItem {
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub tags: Option<Vec<String>>,
    pub related: Option<Vec<String>>,
    pub related_tasks: Option<Vec<String>>,
    pub related_documents: Option<Vec<String>>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub category: Option<String>,
    pub version: Option<String>,
}

/// Result of [`Repository::change_item_type`].
#[derive(Debug, Clone, Serialize)]
pub struct ChangeTypeResult {
    pub new_id: i64,
    pub migrated_references: usize,
}

impl Repository {
    /// Opens the repository at `root`, creating the directory skeleton and
    /// index database on first use. Fails with a conflict when another
    /// process holds the data root.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(root.join(layout::SYSTEM_DIR).join(layout::CURRENT_STATE_DIR))
            .map_err(|e| RepoError::Internal(format!("cannot create data root: {e}")))?;

        let lock_path = root.join(LOCK_FILE_REL);
        let lock_file = fs::File::create(&lock_path)
            .map_err(|e| RepoError::Internal(format!("cannot create lock file: {e}")))?;
        lock_file.try_lock_exclusive().map_err(|_| {
            RepoError::Conflict(format!(
                "data root {} is locked by another process",
                root.display()
            ))
        })?;

        let store = IndexStore::open(root.join(INDEX_DB_REL))?;
        info!(root = %root.display(), "repository opened");

        Ok(Self {
            root,
            store,
            write_lock: Mutex::new(()),
            _lock_file: lock_file,
        })
    }

    /// The data root this repository projects into.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Direct access to the index (read paths, services in this crate).
    pub fn store(&self) -> &IndexStore {
        &self.store
    }

    // -----------------------------------------------------------------------
    // Shared plumbing
    // -----------------------------------------------------------------------

    /// Runs one mutation: write mutex, staging set, SQL transaction, staged
    /// commit. The closure stages file writes while the transaction is
    /// open; they become visible only after the SQL commit.
    pub(crate) fn with_write<T>(
        &self,
        f: impl FnOnce(&IndexTx<'_>, &mut Staging) -> Result<T>,
    ) -> Result<T> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|e| RepoError::Internal(format!("write lock poisoned: {e}")))?;
        let mut staging = Staging::new(&self.root)?;
        let value = self
            .store
            .run_in_transaction(|tx| f(tx, &mut staging))?;
        staging
            .commit()
            .map_err(|e| RepoError::Integrity(format!("projection commit failed: {e}")))?;
        Ok(value)
    }

    /// Looks up a type, mapping the miss to the caller-facing message.
    pub(crate) fn get_type(&self, name: &str) -> Result<TypeDef> {
        self.store.get_type(name).map_err(|e| match e {
            StorageError::NotFound { .. } => RepoError::type_not_found(name),
            other => other.into(),
        })
    }

    /// Splits outbound references by target base type. Targets whose type
    /// is unknown (deleted types, foreign dumps) surface on the tasks side.
    pub(crate) fn split_refs(&self, refs: &[ItemRef]) -> (Vec<String>, Vec<String>) {
        let mut tasks = Vec::new();
        let mut documents = Vec::new();
        for r in refs {
            match self.store.get_type(&r.type_name) {
                Ok(td) if td.base_type == shirokuma_core::enums::BaseType::Documents => {
                    documents.push(r.token());
                }
                _ => tasks.push(r.token()),
            }
        }
        (tasks, documents)
    }

    fn hydrate(&self, mut item: Item) -> Result<Item> {
        item.tags = self.store.item_tags(&item.type_name, &item.id)?;
        item.related = self.store.item_relations(&item.type_name, &item.id)?;
        Ok(item)
    }

    fn detail_of(&self, item: Item) -> Result<ItemDetail> {
        let item = self.hydrate(item)?;
        let (related_tasks, related_documents) = self.split_refs(&item.related);
        Ok(ItemDetail::new(item, related_tasks, related_documents))
    }

    // -----------------------------------------------------------------------
    // CRUD
    // -----------------------------------------------------------------------

    /// Creates an item, allocating its id and projecting its file.
    pub fn create_item(&self, input: CreateItem) -> Result<ItemDetail> {
        let type_def = self.get_type(&input.type_name)?;
        let type_name = type_def.name.clone();

        let title = validate_title(&input.title)?;
        if let Some(ref d) = input.description {
            validate_description(d)?;
        }
        if let Some(ref c) = input.category {
            validate_short_field("category", c)?;
        }
        if let Some(ref v) = input.version {
            validate_short_field("version", v)?;
        }
        if type_name == "sessions" && input.category.is_some() {
            return Err(ValidationError::FieldNotAllowed("category", type_name).into());
        }
        if type_name != "dailies" && input.date.is_some() {
            return Err(ValidationError::FieldNotAllowed("date", type_name).into());
        }
        if type_name != "sessions" && input.datetime.is_some() {
            return Err(ValidationError::FieldNotAllowed("datetime", type_name).into());
        }

        let content = match input.content {
            Some(ref c) => {
                validate_content(c)?;
                Some(c.clone())
            }
            None => None,
        };
        let content_required = type_def.base_type == shirokuma_core::enums::BaseType::Documents
            && !type_def.is_reserved
            || type_name == "dailies";
        if content_required && content.as_deref().unwrap_or("").is_empty() {
            return Err(ValidationError::ContentRequired(type_name).into());
        }

        let priority = parse_priority(input.priority.as_deref())?;
        let tags = normalize_tags(&input.tags)?;
        let related = parse_ref_lists(&[
            &input.related,
            &input.related_tasks,
            &input.related_documents,
        ])?;
        let start_date = parse_opt_date(input.start_date.as_deref())?;
        let end_date = parse_opt_date(input.end_date.as_deref())?;
        let status_name = input
            .status
            .clone()
            .unwrap_or_else(|| shirokuma_core::status::DEFAULT_STATUS_NAME.to_owned());

        let now = now_ms();
        let fixed_id = match type_name.as_str() {
            "sessions" => {
                let at = match input.datetime.as_deref() {
                    Some(s) => id::parse_session_datetime(s).ok_or_else(|| {
                        ValidationError::InvalidDate(s.to_owned())
                    })?,
                    None => now,
                };
                Some(id::session_id_for(at))
            }
            "dailies" => {
                let date = match input.date.as_deref() {
                    Some(s) => parse_date_field(s)?,
                    None => now.date_naive(),
                };
                Some(id::daily_id_for(date))
            }
            _ => None,
        };

        let created = self.with_write(|tx, staging| {
            let item_id = match fixed_id {
                Some(ref key) => key.clone(),
                None => ItemId::Seq(tx.next_id(&type_name)?),
            };

            if related.iter().any(|r| r.points_to(&type_name, &item_id)) {
                return Err(ValidationError::SelfReference.into());
            }

            let status = resolve_status(tx, &status_name)?;
            let item = Item {
                id: item_id,
                type_name: type_name.clone(),
                title: title.clone(),
                description: input.description.clone(),
                content: content.clone(),
                status: status.name.clone(),
                priority,
                category: input.category.clone(),
                version: input.version.clone(),
                start_date,
                end_date,
                tags: tags.clone(),
                related: related.clone(),
                created_at: now,
                updated_at: now,
            };

            tx.insert_item(&item, status.id).map_err(|e| match e {
                StorageError::Conflict { message } => RepoError::Conflict(message),
                other => other.into(),
            })?;
            tx.set_item_tags(&type_name, &item.id, &item.tags)?;
            tx.set_item_relations(&type_name, &item.id, &item.related)?;

            let rel = layout::item_rel_path(&type_name, type_def.base_type, &item.id);
            staging.stage_write(&rel, &render_item(&item)?)?;
            Ok(item)
        })?;

        self.detail_of(created)
    }

    /// Retrieves the full detail view of one item.
    pub fn get_item_detail(&self, type_name: &str, item_id: &ItemId) -> Result<ItemDetail> {
        let type_def = self.get_type(type_name)?;
        let item = self
            .store
            .get_item_row(&type_def.name, item_id)
            .map_err(|e| match e {
                StorageError::NotFound { .. } => RepoError::item_not_found(type_name, item_id),
                other => other.into(),
            })?;
        self.detail_of(item)
    }

    /// Lists items of one type as list-view projections.
    pub fn get_items(&self, type_name: &str, filter: &ListFilter) -> Result<Vec<ListItem>> {
        let type_def = self.get_type(type_name)?;
        let rows = self
            .store
            .list_item_rows(&type_def.name, filter, type_def.is_reserved)?;
        let mut out = Vec::with_capacity(rows.len());
        for mut item in rows {
            item.tags = self.store.item_tags(&item.type_name, &item.id)?;
            out.push(ListItem::from(&item));
        }
        Ok(out)
    }

    /// Applies a partial update; omitted fields are preserved.
    pub fn update_item(
        &self,
        type_name: &str,
        item_id: &ItemId,
        patch: UpdateItem,
    ) -> Result<ItemDetail> {
        let type_def = self.get_type(type_name)?;
        let type_name = type_def.name.clone();

        let updated = self.with_write(|tx, staging| {
            let mut item = tx.get_item(&type_name, item_id).map_err(|e| match e {
                StorageError::NotFound { .. } => RepoError::item_not_found(&type_name, item_id),
                other => other.into(),
            })?;
            item.tags = tx.get_item_tags(&type_name, item_id)?;
            item.related = tx.get_item_relations(&type_name, item_id)?;

            if let Some(ref title) = patch.title {
                item.title = validate_title(title)?;
            }
            if let Some(ref d) = patch.description {
                validate_description(d)?;
                item.description = non_empty(d);
            }
            if let Some(ref c) = patch.content {
                validate_content(c)?;
                let required = type_def.base_type
                    == shirokuma_core::enums::BaseType::Documents
                    && !type_def.is_reserved
                    || type_name == "dailies";
                if required && c.is_empty() {
                    return Err(ValidationError::ContentRequired(type_name.clone()).into());
                }
                item.content = non_empty(c);
            }
            if let Some(ref p) = patch.priority {
                item.priority = parse_priority(Some(p))?;
            }
            if let Some(ref c) = patch.category {
                validate_short_field("category", c)?;
                if type_name == "sessions" {
                    return Err(
                        ValidationError::FieldNotAllowed("category", type_name.clone()).into()
                    );
                }
                item.category = non_empty(c);
            }
            if let Some(ref v) = patch.version {
                validate_short_field("version", v)?;
                item.version = non_empty(v);
            }
            if let Some(ref s) = patch.start_date {
                item.start_date = parse_opt_date(Some(s))?;
            }
            if let Some(ref e) = patch.end_date {
                item.end_date = parse_opt_date(Some(e))?;
            }
            if let Some(ref tags) = patch.tags {
                item.tags = normalize_tags(tags)?;
            }
            if patch.related.is_some()
                || patch.related_tasks.is_some()
                || patch.related_documents.is_some()
            {
                let empty: Vec<String> = Vec::new();
                let related = parse_ref_lists(&[
                    patch.related.as_deref().unwrap_or(&empty),
                    patch.related_tasks.as_deref().unwrap_or(&empty),
                    patch.related_documents.as_deref().unwrap_or(&empty),
                ])?;
                if related.iter().any(|r| r.points_to(&type_name, item_id)) {
                    return Err(ValidationError::SelfReference.into());
                }
                item.related = related;
            }
            if let Some(ref status_name) = patch.status {
                item.status = resolve_status(tx, status_name)?.name;
            }

            let status = resolve_status(tx, &item.status)?;
            if status.is_closable && item.end_date.is_none() {
                warn!(
                    type_name = %item.type_name,
                    id = %item.id,
                    "item moved to closable status without end_date"
                );
            }

            item.updated_at = bump_ms(item.updated_at);

            tx.update_item_row(&item, status.id)?;
            tx.set_item_tags(&type_name, item_id, &item.tags)?;
            tx.set_item_relations(&type_name, item_id, &item.related)?;

            let rel = layout::item_rel_path(&type_name, type_def.base_type, item_id);
            staging.stage_write(&rel, &render_item(&item)?)?;
            Ok(item)
        })?;

        self.detail_of(updated)
    }

    /// Deletes an item and its projection file. Inbound references from
    /// other items are left dangling on purpose; the sequence counter is
    /// not decremented.
    pub fn delete_item(&self, type_name: &str, item_id: &ItemId) -> Result<()> {
        let type_def = self.get_type(type_name)?;
        let type_name = type_def.name.clone();

        self.with_write(|tx, staging| {
            tx.delete_item(&type_name, item_id).map_err(|e| match e {
                StorageError::NotFound { .. } => RepoError::item_not_found(&type_name, item_id),
                other => other.into(),
            })?;
            staging.stage_delete(&layout::item_rel_path(
                &type_name,
                type_def.base_type,
                item_id,
            ));
            Ok(())
        })
    }

    /// Moves an item to another type within the same base type: allocates a
    /// new id, copies every field, rewrites inbound references across the
    /// store (index and projections), and deletes the original.
    pub fn change_item_type(
        &self,
        from_type: &str,
        from_id: &ItemId,
        to_type: &str,
    ) -> Result<ChangeTypeResult> {
        let from_def = self.get_type(from_type)?;
        let to_def = self.get_type(to_type)?;
        if is_reserved_type(&from_def.name) || is_reserved_type(&to_def.name) {
            return Err(RepoError::Reference(
                "change_item_type is not available for sessions or dailies".to_owned(),
            ));
        }
        if from_def.base_type != to_def.base_type {
            return Err(RepoError::Reference(format!(
                "cannot change type across base types ({} is {}, {} is {})",
                from_def.name, from_def.base_type, to_def.name, to_def.base_type
            )));
        }

        self.with_write(|tx, staging| {
            let mut item = tx.get_item(&from_def.name, from_id).map_err(|e| match e {
                StorageError::NotFound { .. } => RepoError::item_not_found(from_type, from_id),
                other => other.into(),
            })?;
            item.tags = tx.get_item_tags(&from_def.name, from_id)?;
            item.related = tx.get_item_relations(&from_def.name, from_id)?;

            let new_id = tx.next_id(&to_def.name)?;
            item.type_name = to_def.name.clone();
            item.id = ItemId::Seq(new_id);
            item.updated_at = bump_ms(item.updated_at);

            let status = resolve_status(tx, &item.status)?;
            tx.insert_item(&item, status.id)?;
            tx.set_item_tags(&to_def.name, &item.id, &item.tags)?;
            tx.set_item_relations(&to_def.name, &item.id, &item.related)?;

            // Rewrite inbound edges, then re-project every referrer.
            let referrers = tx.inbound_sources(&from_def.name, from_id)?;
            let migrated =
                tx.retarget_relations(&from_def.name, from_id, &to_def.name, &item.id)?;
            for (src_type, src_id) in referrers {
                if src_type == from_def.name && src_id == *from_id {
                    continue;
                }
                match tx.get_item(&src_type, &src_id) {
                    Ok(mut src) => {
                        src.tags = tx.get_item_tags(&src_type, &src_id)?;
                        src.related = tx.get_item_relations(&src_type, &src_id)?;
                        let src_def = tx.get_type(&src_type)?;
                        let rel =
                            layout::item_rel_path(&src_type, src_def.base_type, &src_id);
                        staging.stage_write(&rel, &render_item(&src)?)?;
                    }
                    Err(e) => {
                        // A referrer row that cannot be loaded is logged,
                        // never fatal: the edge rewrite already happened.
                        warn!(
                            source = %format!("{src_type}-{src_id}"),
                            error = %e,
                            "could not re-project referrer during type change"
                        );
                    }
                }
            }

            tx.delete_item(&from_def.name, from_id)?;

            let new_rel = layout::item_rel_path(&to_def.name, to_def.base_type, &item.id);
            staging.stage_write(&new_rel, &render_item(&item)?)?;
            staging.stage_delete(&layout::item_rel_path(
                &from_def.name,
                from_def.base_type,
                from_id,
            ));

            Ok(ChangeTypeResult {
                new_id,
                migrated_references: migrated,
            })
        })
    }

    /// Registers a tag explicitly. Names are trimmed; duplicates conflict.
    pub fn create_tag(&self, name: &str) -> Result<shirokuma_storage::Tag> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyTagName.into());
        }
        self.with_write(|tx, _staging| {
            tx.create_tag(name).map_err(|e| match e {
                StorageError::Conflict { message } => RepoError::Conflict(message),
                other => other.into(),
            })
        })
    }

    /// Deletes a tag everywhere and re-projects every item that carried it.
    pub fn delete_tag(&self, name: &str) -> Result<usize> {
        self.with_write(|tx, staging| {
            let affected = tx.delete_tag(name).map_err(|e| match e {
                StorageError::NotFound { .. } => {
                    RepoError::NotFound(format!("tag \"{name}\" not found"))
                }
                other => other.into(),
            })?;
            let count = affected.len();
            for (type_name, item_id) in affected {
                let mut item = tx.get_item(&type_name, &item_id)?;
                item.tags = tx.get_item_tags(&type_name, &item_id)?;
                item.related = tx.get_item_relations(&type_name, &item_id)?;
                let type_def = tx.get_type(&type_name)?;
                let rel = layout::item_rel_path(&type_name, type_def.base_type, &item_id);
                staging.stage_write(&rel, &render_item(&item)?)?;
            }
            Ok(count)
        })
    }

    /// Writes the projection file of every item whose file is missing.
    /// Startup reconciliation for a crash between SQL commit and rename:
    /// the index wins and the tree catches up.
    pub fn reproject(&self) -> Result<usize> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|e| RepoError::Internal(format!("write lock poisoned: {e}")))?;
        let mut written = 0;
        for type_def in self.store.list_types()? {
            for item in self.store.list_type_rows(&type_def.name)? {
                let rel = layout::item_rel_path(&type_def.name, type_def.base_type, &item.id);
                let path = self.root.join(&rel);
                if path.exists() {
                    continue;
                }
                let item = self.hydrate(item)?;
                atomic_write(&path, &render_item(&item)?)?;
                written += 1;
            }
        }
        if written > 0 {
            info!(written, "re-projected missing files");
        }
        Ok(written)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Current time truncated to millisecond precision, matching what the index
/// and the projection files store.
pub(crate) fn now_ms() -> DateTime<Utc> {
    let now = Utc::now();
    let ns = now.nanosecond();
    now.with_nanosecond(ns - ns % 1_000_000).unwrap_or(now)
}

/// A timestamp strictly after `prev` at millisecond precision.
pub(crate) fn bump_ms(prev: DateTime<Utc>) -> DateTime<Utc> {
    let now = now_ms();
    let min = prev + Duration::milliseconds(1);
    if now < min { min } else { now }
}

pub(crate) fn parse_priority(value: Option<&str>) -> Result<Priority> {
    match value {
        None => Ok(Priority::Medium),
        Some(s) => Priority::parse(s)
            .ok_or_else(|| ValidationError::InvalidPriority(s.to_owned()).into()),
    }
}

/// Parses and deduplicates reference tokens from the three wire lists.
pub(crate) fn parse_ref_lists(lists: &[&[String]]) -> Result<Vec<ItemRef>> {
    let mut out: Vec<ItemRef> = Vec::new();
    for list in lists {
        for token in *list {
            let r = ItemRef::parse(token)
                .ok_or_else(|| ValidationError::MalformedReference(token.clone()))?;
            if !out.contains(&r) {
                out.push(r);
            }
        }
    }
    Ok(out)
}

fn parse_opt_date(value: Option<&str>) -> Result<Option<chrono::NaiveDate>> {
    match value {
        None => Ok(None),
        Some("") => Ok(None),
        Some(s) => Ok(Some(parse_date_field(s)?)),
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() { None } else { Some(s.to_owned()) }
}

/// Resolves a status name, reporting an unknown name as a validation error
/// (the status table is a closed enum from the caller's point of view).
pub(crate) fn resolve_status(
    tx: &IndexTx<'_>,
    name: &str,
) -> Result<shirokuma_core::status::Status> {
    tx.resolve_status(name).map_err(|e| match e {
        StorageError::NotFound { .. } => {
            ValidationError::UnknownStatus(name.to_owned()).into()
        }
        other => other.into(),
    })
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

    fn issue_input(title: &str) -> CreateItem {
        CreateItem {
            type_name: "issues".into(),
            title: title.into(),
            ..Default::default()
        }
    }

    #[test]
    fn create_allocates_sequential_ids() {
        let (_tmp, repo) = open_repo();
        let a = repo.create_item(issue_input("First")).unwrap();
        let b = repo.create_item(issue_input("Second")).unwrap();
        assert_eq!(a.item.id, ItemId::Seq(1));
        assert_eq!(b.item.id, ItemId::Seq(2));
    }

    #[test]
    fn create_projects_markdown_file() {
        let (_tmp, repo) = open_repo();
        let detail = repo
            .create_item(CreateItem {
                tags: vec!["bug".into()],
                content: Some("body text".into()),
                ..issue_input("Auth Bug")
            })
            .unwrap();
        assert_eq!(detail.item.id, ItemId::Seq(1));

        let path = repo.root().join("tasks/issues/issues-1.md");
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("---\n"));
        assert!(text.contains("title: Auth Bug"));
        assert!(text.ends_with("body text"));
    }

    #[test]
    fn create_unknown_type_fails_with_message() {
        let (_tmp, repo) = open_repo();
        let err = repo
            .create_item(CreateItem {
                type_name: "ghosts".into(),
                title: "T".into(),
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(err.to_string(), "Type \"ghosts\" does not exist");
    }

    #[test]
    fn create_documents_require_content() {
        let (_tmp, repo) = open_repo();
        let err = repo
            .create_item(CreateItem {
                type_name: "docs".into(),
                title: "Guide".into(),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err.kind(), crate::error::ErrorKind::Validation));
    }

    #[test]
    fn create_daily_duplicate_date_conflicts() {
        let (_tmp, repo) = open_repo();
        let input = CreateItem {
            type_name: "dailies".into(),
            title: "Summary".into(),
            content: Some("done".into()),
            date: Some("2025-01-15".into()),
            ..Default::default()
        };
        repo.create_item(input.clone()).unwrap();
        let err = repo.create_item(input).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Conflict);
    }

    #[test]
    fn create_session_rejects_category() {
        let (_tmp, repo) = open_repo();
        let err = repo
            .create_item(CreateItem {
                type_name: "sessions".into(),
                title: "Work session".into(),
                category: Some("dev".into()),
                ..Default::default()
            })
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Validation);
    }

    #[test]
    fn start_after_end_is_allowed() {
        let (_tmp, repo) = open_repo();
        let detail = repo
            .create_item(CreateItem {
                type_name: "plans".into(),
                title: "Backwards plan".into(),
                start_date: Some("2025-12-31".into()),
                end_date: Some("2025-01-01".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(detail.item.start_date.unwrap().to_string(), "2025-12-31");
    }

    #[test]
    fn failed_create_rolls_back_file_and_sequence() {
        let (_tmp, repo) = open_repo();
        // Self-reference fails after id allocation, inside the transaction.
        let err = repo
            .create_item(CreateItem {
                related: vec!["issues-1".into()],
                ..issue_input("Self ref")
            })
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Validation);
        assert!(!repo.root().join("tasks/issues/issues-1.md").exists());
        assert_eq!(repo.store().sequence_value("issues").unwrap(), 0);

        // And the next create starts from 1 again.
        let detail = repo.create_item(issue_input("Fresh")).unwrap();
        assert_eq!(detail.item.id, ItemId::Seq(1));
    }

    #[test]
    fn get_detail_includes_content_and_split_refs() {
        let (_tmp, repo) = open_repo();
        repo.create_item(CreateItem {
            type_name: "docs".into(),
            title: "Guide".into(),
            content: Some("# G".into()),
            ..Default::default()
        })
        .unwrap();
        repo.create_item(CreateItem {
            related: vec!["docs-1".into(), "plans-7".into()],
            ..issue_input("Bug")
        })
        .unwrap();

        let detail = repo.get_item_detail("issues", &ItemId::Seq(1)).unwrap();
        assert_eq!(detail.related_documents, vec!["docs-1"]);
        assert_eq!(detail.related_tasks, vec!["plans-7"]);
    }

    #[test]
    fn update_preserves_omitted_fields_and_bumps_updated_at() {
        let (_tmp, repo) = open_repo();
        let before = repo
            .create_item(CreateItem {
                description: Some("desc".into()),
                tags: vec!["keep".into()],
                ..issue_input("Original")
            })
            .unwrap();

        let after = repo
            .update_item(
                "issues",
                &ItemId::Seq(1),
                UpdateItem {
                    title: Some("Renamed".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(after.item.title, "Renamed");
        assert_eq!(after.item.description.as_deref(), Some("desc"));
        assert_eq!(after.item.tags, vec!["keep"]);
        assert_eq!(after.item.created_at, before.item.created_at);
        assert!(after.item.updated_at > before.item.updated_at);
    }

    #[test]
    fn update_rejects_self_reference() {
        let (_tmp, repo) = open_repo();
        repo.create_item(issue_input("Loner")).unwrap();
        let err = repo
            .update_item(
                "issues",
                &ItemId::Seq(1),
                UpdateItem {
                    related: Some(vec!["issues-1".into()]),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Validation);
    }

    #[test]
    fn update_unknown_status_is_validation_error() {
        let (_tmp, repo) = open_repo();
        repo.create_item(issue_input("Statusful")).unwrap();
        let err = repo
            .update_item(
                "issues",
                &ItemId::Seq(1),
                UpdateItem {
                    status: Some("Bogus".into()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Validation);
    }

    #[test]
    fn delete_leaves_inbound_references_dangling() {
        let (_tmp, repo) = open_repo();
        repo.create_item(issue_input("Target")).unwrap();
        repo.create_item(CreateItem {
            type_name: "plans".into(),
            title: "Referrer".into(),
            related: vec!["issues-1".into()],
            ..Default::default()
        })
        .unwrap();

        repo.delete_item("issues", &ItemId::Seq(1)).unwrap();
        assert!(
            repo.get_item_detail("issues", &ItemId::Seq(1))
                .unwrap_err()
                .is_not_found()
        );
        assert!(!repo.root().join("tasks/issues/issues-1.md").exists());

        let referrer = repo.get_item_detail("plans", &ItemId::Seq(1)).unwrap();
        assert_eq!(referrer.related_tasks, vec!["issues-1"]);
    }

    #[test]
    fn delete_does_not_roll_back_sequence() {
        let (_tmp, repo) = open_repo();
        repo.create_item(issue_input("One")).unwrap();
        repo.delete_item("issues", &ItemId::Seq(1)).unwrap();
        let next = repo.create_item(issue_input("Two")).unwrap();
        assert_eq!(next.item.id, ItemId::Seq(2));
    }

    #[test]
    fn change_type_migrates_references() {
        let (_tmp, repo) = open_repo();
        repo.create_item(issue_input("Movable")).unwrap();
        repo.create_item(CreateItem {
            type_name: "plans".into(),
            title: "Referrer".into(),
            related_tasks: vec!["issues-1".into()],
            ..Default::default()
        })
        .unwrap();

        let result = repo
            .change_item_type("issues", &ItemId::Seq(1), "plans")
            .unwrap();
        assert_eq!(result.new_id, 2);
        assert_eq!(result.migrated_references, 1);

        assert!(
            repo.get_item_detail("issues", &ItemId::Seq(1))
                .unwrap_err()
                .is_not_found()
        );
        let moved = repo.get_item_detail("plans", &ItemId::Seq(2)).unwrap();
        assert_eq!(moved.item.title, "Movable");

        let referrer = repo.get_item_detail("plans", &ItemId::Seq(1)).unwrap();
        assert_eq!(referrer.related_tasks, vec!["plans-2"]);

        // The referrer's projection file was rewritten too.
        let text = fs::read_to_string(repo.root().join("tasks/plans/plans-1.md")).unwrap();
        assert!(text.contains("plans-2"));
        assert!(!text.contains("issues-1"));
    }

    #[test]
    fn change_type_across_base_types_is_rejected() {
        let (_tmp, repo) = open_repo();
        repo.create_item(issue_input("Stuck")).unwrap();
        let err = repo
            .change_item_type("issues", &ItemId::Seq(1), "docs")
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Reference);
    }

    #[test]
    fn change_type_reserved_is_rejected() {
        let (_tmp, repo) = open_repo();
        let err = repo
            .change_item_type("sessions", &ItemId::Key("2025-01-15-10.00.00.000".into()), "issues")
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Reference);
    }

    #[test]
    fn delete_tag_updates_items_and_projections() {
        let (_tmp, repo) = open_repo();
        repo.create_item(CreateItem {
            type_name: "docs".into(),
            title: "Guide".into(),
            content: Some("g".into()),
            tags: vec!["api".into(), "keep".into()],
            ..Default::default()
        })
        .unwrap();

        let affected = repo.delete_tag("api").unwrap();
        assert_eq!(affected, 1);

        let detail = repo.get_item_detail("docs", &ItemId::Seq(1)).unwrap();
        assert_eq!(detail.item.tags, vec!["keep"]);
        let names: Vec<String> = repo
            .store()
            .list_tags()
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert!(!names.contains(&"api".to_owned()));

        let text = fs::read_to_string(repo.root().join("documents/docs/docs-1.md")).unwrap();
        assert!(!text.contains("api"));
    }

    #[test]
    fn reproject_restores_missing_file() {
        let (_tmp, repo) = open_repo();
        repo.create_item(issue_input("Restore me")).unwrap();
        let path = repo.root().join("tasks/issues/issues-1.md");
        fs::remove_file(&path).unwrap();

        let written = repo.reproject().unwrap();
        assert_eq!(written, 1);
        assert!(path.exists());
    }

    #[test]
    fn second_open_of_same_root_conflicts() {
        let (_tmp, repo) = open_repo();
        let err = Repository::open(repo.root().to_owned()).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Conflict);
    }

    #[test]
    fn bump_ms_is_strictly_monotonic() {
        let t0 = now_ms();
        let t1 = bump_ms(t0);
        let t2 = bump_ms(t1);
        assert!(t1 > t0);
        assert!(t2 > t1);
    }
}
