//! Error taxonomy of the inspection core.
//!
//! A missing key is not an error: lookups return `Ok(None)`.
//! Binaries wrap these in `anyhow` with context.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type InspectResult<T> = Result<T, InspectError>;

#[derive(Debug, Error)]
pub enum InspectError {
    /// The engine refused to open the store (missing dir, corrupt files, held lock).
    #[error("open store {}: {reason}", path.display())]
    OpenFailed { path: PathBuf, reason: String },

    /// Snapshot provisioning failed; the temporary directory was already removed.
    #[error(
        "snapshot failed at '{file}': {source} (hint: snapshot dir must be on the same filesystem as the store)"
    )]
    SnapshotFailed {
        file: String,
        #[source]
        source: io::Error,
    },

    /// Iteration failed mid-scan. Partial results are discarded.
    #[error("scan failed: {0}")]
    Scan(String),

    /// Point lookup failed at the engine level (distinct from not-found).
    #[error("lookup failed: {0}")]
    Lookup(String),

    #[error("size of {}: {source}", path.display())]
    SizeComputation {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl InspectError {
    pub(crate) fn snapshot(file: impl Into<String>, source: io::Error) -> Self {
        Self::SnapshotFailed {
            file: file.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_error_names_file_and_hint() {
        let e = InspectError::snapshot(
            "000012.sst",
            io::Error::new(io::ErrorKind::Other, "Invalid cross-device link"),
        );
        let msg = e.to_string();
        assert!(msg.contains("000012.sst"));
        assert!(msg.contains("same filesystem"));
    }
}
