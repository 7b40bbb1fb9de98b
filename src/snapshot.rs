//! snapshot — hard-link snapshot of a store directory.
//!
//! Lets a read-only process open a store whose LOCK is held by a live writer:
//! - every regular file of the source dir (except the lock file) gets a hard
//!   link in a fresh temp dir (same inode, no data copy);
//! - the lock file is never linked, so the engine creates its own LOCK there;
//! - subdirectories and symlinks are skipped (flat layout, see `FlatListing`).
//!
//! Same-device only: a cross-device link fails the whole operation, the temp
//! dir is removed and `SnapshotFailed` names the offending file. There is no
//! fallback to copying bytes.
//!
//! `SnapshotDir` removes the directory on Drop; `remove()` does the same and
//! reports the I/O outcome.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use tempfile::TempDir;

use crate::consts::SNAPSHOT_DIR_PREFIX;
use crate::error::{InspectError, InspectResult};
use crate::metrics::record_snapshot_provisioned;

/// Decides which files of a store directory are aliased into a snapshot.
///
/// Returned paths are relative to `source`. Nested paths are allowed; the
/// provisioner creates the intermediate directories.
pub trait SourceListing {
    fn linkable_files(&self, source: &Path) -> io::Result<Vec<PathBuf>>;
}

/// Regular files directly inside the store root, minus the lock file.
#[derive(Debug, Clone)]
pub struct FlatListing {
    lock_file: String,
}

impl FlatListing {
    pub fn new(lock_file: impl Into<String>) -> Self {
        Self {
            lock_file: lock_file.into(),
        }
    }
}

impl SourceListing for FlatListing {
    fn linkable_files(&self, source: &Path) -> io::Result<Vec<PathBuf>> {
        let mut out = Vec::new();
        for entry in fs::read_dir(source)? {
            let entry = entry?;
            let name = entry.file_name();
            // file_type() не следует по симлинкам.
            let ft = entry.file_type()?;
            if !ft.is_file() {
                debug!("snapshot: skip non-regular entry {:?}", name);
                continue;
            }
            if name == self.lock_file.as_str() {
                continue;
            }
            out.push(PathBuf::from(name));
        }
        out.sort();
        Ok(out)
    }
}

pub struct SnapshotDir {
    dir: Option<TempDir>,
    path: PathBuf,
    source: PathBuf,
    files: Vec<PathBuf>,
}

impl SnapshotDir {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Linked files, relative to the snapshot root, sorted.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Remove the snapshot directory now.
    pub fn remove(mut self) -> io::Result<()> {
        match self.dir.take() {
            Some(dir) => dir.close(),
            None => Ok(()),
        }
    }
}

impl Drop for SnapshotDir {
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take() {
            if let Err(e) = dir.close() {
                warn!("snapshot: remove {} failed: {}", self.path.display(), e);
            }
        }
    }
}

/// Provision a flat snapshot of `source` under `parent`, excluding `lock_file`.
pub fn provision(source: &Path, parent: &Path, lock_file: &str) -> InspectResult<SnapshotDir> {
    provision_with(source, parent, &FlatListing::new(lock_file))
}

/// Provision a snapshot using a custom directory listing.
pub fn provision_with(
    source: &Path,
    parent: &Path,
    listing: &dyn SourceListing,
) -> InspectResult<SnapshotDir> {
    let files = listing
        .linkable_files(source)
        .map_err(|e| InspectError::snapshot(source.display().to_string(), e))?;

    let tmp = tempfile::Builder::new()
        .prefix(SNAPSHOT_DIR_PREFIX)
        .tempdir_in(parent)
        .map_err(|e| InspectError::snapshot(parent.display().to_string(), e))?;
    let root = tmp.path().to_path_buf();

    for rel in &files {
        if let Err(e) = link_one(source, &root, rel) {
            // Частичный снапшот не оставляем.
            if let Err(rm) = tmp.close() {
                warn!("snapshot: cleanup of {} failed: {}", root.display(), rm);
            }
            return Err(InspectError::snapshot(rel.display().to_string(), e));
        }
    }

    record_snapshot_provisioned(files.len());
    info!(
        "snapshot: linked {} file(s) from {} into {}",
        files.len(),
        source.display(),
        root.display()
    );
    Ok(SnapshotDir {
        dir: Some(tmp),
        path: root,
        source: source.to_path_buf(),
        files,
    })
}

fn link_one(source: &Path, root: &Path, rel: &Path) -> io::Result<()> {
    let dst = root.join(rel);
    if let Some(parent) = dst.parent() {
        if parent != root {
            fs::create_dir_all(parent)?;
        }
    }
    fs::hard_link(source.join(rel), dst)
}
