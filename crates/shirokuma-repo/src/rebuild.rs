//! Rebuild engine: reconstructs the index from the Markdown tree.
//!
//! The tree is the source of truth here. Mutable item-side tables are
//! truncated and re-filled from parsed projection files; statuses and the
//! type registry survive (unknown types found in the tree are registered
//! on the way through). Items absent from the tree stay absent -- deletion
//! is honored, never resurrected. Sequence counters end at
//! `max(observed max id, prior counter)` so the allocator never moves
//! backwards.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use tracing::{info, warn};

use shirokuma_core::enums::BaseType;
use shirokuma_core::id::ItemId;
use shirokuma_markdown::document::parse_item;
use shirokuma_markdown::walk_markdown_files;

use crate::error::{RepoError, Result};
use crate::repository::Repository;

/// Outcome of a rebuild run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RebuildReport {
    /// Re-inserted item counts per type.
    pub counts: BTreeMap<String, usize>,
    /// Files that could not be used, with the reason. Never fatal.
    pub skipped: Vec<SkippedFile>,
    /// Final sequence counters per type.
    pub sequences: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

impl Repository {
    /// Rebuilds the whole index from the projection tree. Holds the write
    /// lock for the full duration; the cancellation flag is polled at
    /// directory boundaries and between files, and cancelling rolls back
    /// to the last committed state.
    pub fn rebuild(&self, cancel: &AtomicBool) -> Result<RebuildReport> {
        let files = walk_markdown_files(self.root(), &|| cancel.load(Ordering::Relaxed))?;
        if cancel.load(Ordering::Relaxed) {
            return Err(RepoError::Cancelled);
        }

        let report = self.with_write(|tx, _staging| {
            let prior: BTreeMap<String, i64> = tx.all_sequences()?.into_iter().collect();
            tx.clear_index()?;

            let mut report = RebuildReport::default();
            let mut observed_max: BTreeMap<String, i64> = BTreeMap::new();

            for path in &files {
                if cancel.load(Ordering::Relaxed) {
                    return Err(RepoError::Cancelled);
                }
                let Some(item) = read_one(path, &mut report) else {
                    continue;
                };

                // Register types discovered in the tree; the base type
                // comes from the directory the file lives under.
                if tx.get_type(&item.type_name).is_err() {
                    match infer_base_type(self.root(), path) {
                        Some(base) => tx.insert_type(&item.type_name, base, None)?,
                        None => {
                            skip(&mut report, path, "file outside any base-type directory");
                            continue;
                        }
                    }
                }

                let status = match tx.resolve_status(&item.status) {
                    Ok(s) => s,
                    Err(_) => {
                        skip(&mut report, path, format!("unknown status {:?}", item.status));
                        continue;
                    }
                };

                if let Err(e) = tx.insert_item(&item, status.id) {
                    skip(&mut report, path, e.to_string());
                    continue;
                }
                tx.set_item_tags(&item.type_name, &item.id, &item.tags)?;
                tx.set_item_relations(&item.type_name, &item.id, &item.related)?;

                if let ItemId::Seq(n) = item.id {
                    let entry = observed_max.entry(item.type_name.clone()).or_insert(0);
                    *entry = (*entry).max(n);
                }
                *report.counts.entry(item.type_name.clone()).or_insert(0) += 1;
            }

            // Restore sequence high-water marks. The counter never drops
            // below what it was before the rebuild.
            for type_def in tx.list_types()? {
                if type_def.is_reserved {
                    continue;
                }
                let observed = observed_max.get(&type_def.name).copied().unwrap_or(0);
                let kept = prior.get(&type_def.name).copied().unwrap_or(0);
                let value = observed.max(kept);
                tx.set_sequence(&type_def.name, value)?;
                report.sequences.insert(type_def.name.clone(), value);
            }

            Ok(report)
        })?;

        info!(
            items = report.counts.values().sum::<usize>(),
            skipped = report.skipped.len(),
            "rebuild finished"
        );
        Ok(report)
    }
}

fn read_one(path: &Path, report: &mut RebuildReport) -> Option<shirokuma_core::item::Item> {
    let text = match fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) => {
            skip(report, path, format!("unreadable: {e}"));
            return None;
        }
    };
    match parse_item(&text, path) {
        Ok(item) => Some(item),
        Err(e) => {
            skip(report, path, e.to_string());
            None
        }
    }
}

fn skip(report: &mut RebuildReport, path: &Path, reason: impl Into<String>) {
    let reason = reason.into();
    warn!(path = %path.display(), reason, "skipping file during rebuild");
    report.skipped.push(SkippedFile {
        path: path.to_owned(),
        reason,
    });
}

/// Maps a projection path back to the base type of its top-level
/// directory. Sessions and dailies live on the tasks rail.
fn infer_base_type(root: &Path, path: &Path) -> Option<BaseType> {
    let rel = path.strip_prefix(root).ok()?;
    let first = rel.components().next()?.as_os_str().to_str()?;
    match first {
        "tasks" | "sessions" | "dailies" => Some(BaseType::Tasks),
        "documents" => Some(BaseType::Documents),
        _ => None,
    }
}
