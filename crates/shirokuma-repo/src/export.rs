//! Batch export and import.
//!
//! Export is a pure projection: every item is rendered into a timestamped
//! directory (`<type>/<id>-<slug>.md`), optionally with the current-state
//! history, and nothing in the index changes. Import is the reverse: a
//! Markdown tree or a JSONL dump is loaded through the same per-item pass
//! ordering the rebuild engine uses.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use shirokuma_core::id::ItemId;
use shirokuma_core::item::Item;
use shirokuma_core::validation::title_slug;
use shirokuma_markdown::document::{parse_item, render_item};
use shirokuma_markdown::layout::{CURRENT_STATE_DIR, SYSTEM_DIR};
use shirokuma_markdown::{atomic_write, walk_markdown_files};

use crate::error::{RepoError, Result};
use crate::repository::Repository;

/// Outcome of an export run.
#[derive(Debug, Clone, Serialize)]
pub struct ExportReport {
    pub dir: PathBuf,
    pub files: usize,
}

/// Outcome of an import run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: Vec<String>,
}

/// Options for [`Repository::import`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ImportOptions {
    /// Keep ids from the dump, raising sequence counters past them.
    /// Otherwise sequence ids are re-allocated.
    pub preserve_ids: bool,
    /// Truncate the index (and drop stale projections) before loading.
    pub clear: bool,
}

impl Repository {
    /// Projects every item (and optionally the state history) into a fresh
    /// timestamped directory under `export_root`. No index mutation.
    pub fn export(
        &self,
        export_root: &Path,
        include_state: bool,
        cancel: &AtomicBool,
    ) -> Result<ExportReport> {
        let stamp = Utc::now().format("%Y%m%d-%H%M%S");
        let dir = export_root.join(format!("export-{stamp}"));
        let mut files = 0;

        for type_def in self.store().list_types()? {
            if cancel.load(Ordering::Relaxed) {
                return Err(RepoError::Cancelled);
            }
            for item in self.store().list_type_rows(&type_def.name)? {
                let mut item = item;
                item.tags = self.store().item_tags(&item.type_name, &item.id)?;
                item.related = self.store().item_relations(&item.type_name, &item.id)?;

                let name = format!("{}-{}.md", item.id, title_slug(&item.title, 40));
                let path = dir.join(&type_def.name).join(name);
                atomic_write(&path, &render_item(&item)?)?;
                files += 1;
            }
        }

        if include_state {
            let state_src = self.root().join(SYSTEM_DIR).join(CURRENT_STATE_DIR);
            if state_src.is_dir() {
                let state_dst = dir.join(SYSTEM_DIR).join(CURRENT_STATE_DIR);
                fs::create_dir_all(&state_dst)
                    .map_err(shirokuma_markdown::MarkdownError::Io)?;
                for entry in fs::read_dir(&state_src).map_err(shirokuma_markdown::MarkdownError::Io)? {
                    let entry = entry.map_err(shirokuma_markdown::MarkdownError::Io)?;
                    if entry.path().extension().is_some_and(|e| e == "md") {
                        fs::copy(entry.path(), state_dst.join(entry.file_name()))
                            .map_err(shirokuma_markdown::MarkdownError::Io)?;
                        files += 1;
                    }
                }
            }
        }

        info!(dir = %dir.display(), files, "export complete");
        Ok(ExportReport { dir, files })
    }

    /// Loads items from a Markdown tree or a `.jsonl` dump.
    pub fn import(&self, source: &Path, options: ImportOptions) -> Result<ImportReport> {
        let mut parsed: Vec<Item> = Vec::new();
        let mut report = ImportReport::default();

        if source.extension().is_some_and(|e| e == "jsonl") {
            let text = fs::read_to_string(source)
                .map_err(|e| RepoError::Internal(format!("cannot read {}: {e}", source.display())))?;
            for (lineno, line) in text.lines().enumerate() {
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<Item>(line) {
                    Ok(item) => parsed.push(item),
                    Err(e) => {
                        let reason = format!("{}:{}: {e}", source.display(), lineno + 1);
                        warn!(reason, "skipping JSONL line");
                        report.skipped.push(reason);
                    }
                }
            }
        } else {
            for path in walk_markdown_files(source, &|| false)? {
                let text = match fs::read_to_string(&path) {
                    Ok(t) => t,
                    Err(e) => {
                        report.skipped.push(format!("{}: {e}", path.display()));
                        continue;
                    }
                };
                match parse_item(&text, &path) {
                    Ok(item) => parsed.push(item),
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "skipping file during import");
                        report.skipped.push(format!("{}: {e}", path.display()));
                    }
                }
            }
        }

        let skipped_in_tx = self.with_write(|tx, staging| {
            let mut skipped: Vec<String> = Vec::new();
            let mut written: BTreeSet<PathBuf> = BTreeSet::new();

            if options.clear {
                tx.clear_index()?;
            }

            let mut imported = 0usize;
            for mut item in std::mem::take(&mut parsed) {
                let key = format!("{}-{}", item.type_name, item.id);
                let type_def = match tx.get_type(&item.type_name) {
                    Ok(td) => td,
                    Err(_) => {
                        skipped.push(format!("{key}: unknown type"));
                        continue;
                    }
                };
                let status = match tx.resolve_status(&item.status) {
                    Ok(s) => s,
                    Err(_) => {
                        skipped.push(format!("{key}: unknown status {:?}", item.status));
                        continue;
                    }
                };

                match item.id {
                    ItemId::Seq(n) if options.preserve_ids => {
                        tx.raise_sequence(&item.type_name, n)?;
                    }
                    ItemId::Seq(_) => {
                        item.id = ItemId::Seq(tx.next_id(&item.type_name)?);
                    }
                    ItemId::Key(_) => {}
                }

                if let Err(e) = tx.insert_item(&item, status.id) {
                    skipped.push(format!("{key}: {e}"));
                    continue;
                }
                tx.set_item_tags(&item.type_name, &item.id, &item.tags)?;
                tx.set_item_relations(&item.type_name, &item.id, &item.related)?;

                let rel = shirokuma_markdown::layout::item_rel_path(
                    &item.type_name,
                    type_def.base_type,
                    &item.id,
                );
                staging.stage_write(&rel, &render_item(&item)?)?;
                written.insert(rel);
                imported += 1;
            }

            // With --clear, projections of items that were not re-imported
            // are dropped so the tree matches the truncated index.
            if options.clear {
                for path in walk_markdown_files(self.root(), &|| false)? {
                    let rel = path
                        .strip_prefix(self.root())
                        .map_err(|e| RepoError::Internal(e.to_string()))?
                        .to_owned();
                    if !written.contains(&rel) {
                        staging.stage_delete(&rel);
                    }
                }
            }

            report.imported = imported;
            Ok(skipped)
        })?;

        report.skipped.extend(skipped_in_tx);
        info!(
            imported = report.imported,
            skipped = report.skipped.len(),
            "import complete"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::CreateItem;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn open_repo() -> (TempDir, Repository) {
        let tmp = TempDir::new().unwrap();
        let repo = Repository::open(tmp.path().join("data")).unwrap();
        (tmp, repo)
    }

    #[test]
    fn export_writes_slugged_files_without_mutation() {
        let (tmp, repo) = open_repo();
        repo.create_item(CreateItem {
            type_name: "issues".into(),
            title: "Auth Bug!".into(),
            content: Some("body".into()),
            ..Default::default()
        })
        .unwrap();

        let report = repo
            .export(&tmp.path().join("exports"), false, &AtomicBool::new(false))
            .unwrap();
        assert_eq!(report.files, 1);
        let exported = report.dir.join("issues/1-auth-bug.md");
        assert!(exported.exists());

        // Pure projection: item is still there and unchanged.
        assert!(repo.get_item_detail("issues", &ItemId::Seq(1)).is_ok());
    }

    #[test]
    fn export_includes_state_history_when_asked() {
        let (tmp, repo) = open_repo();
        repo.create_item(CreateItem {
            type_name: "issues".into(),
            title: "T".into(),
            ..Default::default()
        })
        .unwrap();
        repo.update_current_state(crate::state::StateUpdate {
            content: "now".into(),
            ..Default::default()
        })
        .unwrap();

        let report = repo
            .export(&tmp.path().join("exports"), true, &AtomicBool::new(false))
            .unwrap();
        assert!(report.dir.join(".system/current_state/latest.md").exists());
    }

    #[test]
    fn import_export_roundtrip_with_preserved_ids() {
        let (tmp, source_repo) = open_repo();
        source_repo
            .create_item(CreateItem {
                type_name: "issues".into(),
                title: "Carried over".into(),
                tags: vec!["imported".into()],
                ..Default::default()
            })
            .unwrap();
        let export = source_repo
            .export(&tmp.path().join("exports"), false, &AtomicBool::new(false))
            .unwrap();

        let target = Repository::open(tmp.path().join("target")).unwrap();
        let report = target
            .import(
                &export.dir,
                ImportOptions {
                    preserve_ids: true,
                    clear: false,
                },
            )
            .unwrap();
        assert_eq!(report.imported, 1);
        assert!(report.skipped.is_empty());

        let detail = target.get_item_detail("issues", &ItemId::Seq(1)).unwrap();
        assert_eq!(detail.item.title, "Carried over");
        assert_eq!(detail.item.tags, vec!["imported"]);
        // Sequence moved past the preserved id.
        assert_eq!(target.store().sequence_value("issues").unwrap(), 1);
    }

    #[test]
    fn import_without_preserve_allocates_new_ids() {
        let (tmp, repo) = open_repo();
        repo.create_item(CreateItem {
            type_name: "issues".into(),
            title: "Existing".into(),
            ..Default::default()
        })
        .unwrap();
        let export = repo
            .export(&tmp.path().join("exports"), false, &AtomicBool::new(false))
            .unwrap();

        // Re-import into the same repository: id 1 is taken, so the new
        // copy lands at 2.
        let report = repo.import(&export.dir, ImportOptions::default()).unwrap();
        assert_eq!(report.imported, 1);
        assert!(repo.get_item_detail("issues", &ItemId::Seq(2)).is_ok());
    }

    #[test]
    fn import_jsonl_dump() {
        let (tmp, repo) = open_repo();
        let line = serde_json::json!({
            "id": 5,
            "type": "issues",
            "title": "From JSONL",
            "status": "Open",
            "priority": "HIGH",
            "created_at": "2025-01-15T10:00:00Z",
            "updated_at": "2025-01-15T10:00:00Z"
        });
        let path = tmp.path().join("dump.jsonl");
        fs::write(&path, format!("{line}\nnot json\n")).unwrap();

        let report = repo
            .import(
                &path,
                ImportOptions {
                    preserve_ids: true,
                    clear: false,
                },
            )
            .unwrap();
        assert_eq!(report.imported, 1);
        assert_eq!(report.skipped.len(), 1);
        let detail = repo.get_item_detail("issues", &ItemId::Seq(5)).unwrap();
        assert_eq!(detail.item.title, "From JSONL");
        assert_eq!(repo.store().sequence_value("issues").unwrap(), 5);
    }

    #[test]
    fn import_clear_drops_stale_items_and_files() {
        let (tmp, repo) = open_repo();
        repo.create_item(CreateItem {
            type_name: "issues".into(),
            title: "Stale".into(),
            ..Default::default()
        })
        .unwrap();

        // Import an empty dump with --clear: everything goes away.
        let empty = tmp.path().join("empty.jsonl");
        fs::write(&empty, "").unwrap();
        let report = repo
            .import(
                &empty,
                ImportOptions {
                    preserve_ids: true,
                    clear: true,
                },
            )
            .unwrap();
        assert_eq!(report.imported, 0);
        assert!(
            repo.get_item_detail("issues", &ItemId::Seq(1))
                .unwrap_err()
                .is_not_found()
        );
        assert!(!repo.root().join("tasks/issues/issues-1.md").exists());
    }
}
