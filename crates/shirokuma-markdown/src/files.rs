//! Atomic file writes and the staged commit set.
//!
//! A mutation stages its file writes under `.system/staging/<txn>/` while
//! the database transaction is open. On commit the staged files are renamed
//! into their final locations (same filesystem, so the rename is atomic);
//! on rollback the staging directory is dropped wholesale.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, warn};

use crate::front_matter::MarkdownError;
use crate::layout::{STAGING_DIR, SYSTEM_DIR};

/// Writes `contents` to `path` via a temporary sibling and rename.
pub fn atomic_write(path: &Path, contents: &str) -> crate::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = temp_sibling(path);
    {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(contents.as_bytes())?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "file".to_owned());
    name.push_str(".tmp");
    path.with_file_name(name)
}

/// Monotonic counter distinguishing staging directories within a process.
static STAGING_SEQ: AtomicU64 = AtomicU64::new(0);

/// A set of pending file writes and deletes tied to one mutation.
///
/// Nothing outside the staging directory changes until [`Staging::commit`];
/// dropping the value (or calling [`Staging::discard`]) leaves the tree
/// exactly as it was.
pub struct Staging {
    root: PathBuf,
    dir: PathBuf,
    writes: Vec<(PathBuf, PathBuf)>,
    deletes: Vec<PathBuf>,
    committed: bool,
}

impl Staging {
    /// Opens a fresh staging directory under the data root.
    pub fn new(root: &Path) -> crate::Result<Self> {
        let seq = STAGING_SEQ.fetch_add(1, Ordering::SeqCst);
        let dir = root
            .join(SYSTEM_DIR)
            .join(STAGING_DIR)
            .join(format!("txn-{}-{seq}", std::process::id()));
        fs::create_dir_all(&dir)?;
        Ok(Self {
            root: root.to_owned(),
            dir,
            writes: Vec::new(),
            deletes: Vec::new(),
            committed: false,
        })
    }

    /// Stages `contents` for the root-relative path `rel`.
    pub fn stage_write(&mut self, rel: &Path, contents: &str) -> crate::Result<()> {
        let staged = self.dir.join(format!("{}.md", self.writes.len()));
        let mut file = fs::File::create(&staged)?;
        file.write_all(contents.as_bytes())?;
        file.sync_all()?;
        self.writes.push((staged, self.root.join(rel)));
        Ok(())
    }

    /// Stages a delete of the root-relative path `rel`.
    pub fn stage_delete(&mut self, rel: &Path) {
        self.deletes.push(self.root.join(rel));
    }

    /// Renames every staged file into place and applies deletes. Called
    /// after the database transaction committed; failures here surface as
    /// integrity errors on the operation but the index stays authoritative.
    pub fn commit(mut self) -> crate::Result<()> {
        for (staged, target) in std::mem::take(&mut self.writes) {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::rename(&staged, &target)?;
            debug!(path = %target.display(), "projected");
        }
        for target in std::mem::take(&mut self.deletes) {
            match fs::remove_file(&target) {
                Ok(()) => debug!(path = %target.display(), "removed projection"),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    warn!(path = %target.display(), "projection already absent on delete");
                }
                Err(e) => return Err(MarkdownError::Io(e)),
            }
        }
        self.committed = true;
        self.cleanup();
        Ok(())
    }

    /// Drops all staged writes.
    pub fn discard(mut self) {
        self.committed = true; // suppress the Drop pass; cleanup below
        self.cleanup();
    }

    fn cleanup(&self) {
        if let Err(e) = fs::remove_dir_all(&self.dir) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(dir = %self.dir.display(), error = %e, "failed to remove staging dir");
            }
        }
    }
}

impl Drop for Staging {
    fn drop(&mut self) {
        if !self.committed {
            self.cleanup();
        }
    }
}

/// Walks the projection tree depth-first and returns every `.md` file,
/// skipping the `.system` directory. Directories are visited in name order
/// so rebuild output is deterministic.
///
/// `cancelled` is polled at directory boundaries; when it returns `true`
/// the walk stops early with what it has.
pub fn walk_markdown_files(
    root: &Path,
    cancelled: &dyn Fn() -> bool,
) -> crate::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    walk_dir(root, root, cancelled, &mut files)?;
    Ok(files)
}

fn walk_dir(
    root: &Path,
    dir: &Path,
    cancelled: &dyn Fn() -> bool,
    files: &mut Vec<PathBuf>,
) -> crate::Result<()> {
    if cancelled() {
        return Ok(());
    }
    let mut entries: Vec<PathBuf> = Vec::new();
    for entry in fs::read_dir(dir)? {
        entries.push(entry?.path());
    }
    entries.sort();

    for path in entries {
        if path.is_dir() {
            if path.file_name().is_some_and(|n| n == SYSTEM_DIR) && dir == root {
                continue;
            }
            walk_dir(root, &path, cancelled, files)?;
        } else if path.extension().is_some_and(|e| e == "md") {
            files.push(path);
        }
    }
    Ok(())
}
