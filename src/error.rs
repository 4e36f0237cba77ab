//! The error taxonomy of spec §7, surfaced as a single `thiserror`-derived
//! enum so every fallible operation in the crate returns `Result<_, SsccError>`.

use std::path::PathBuf;

use crate::archive::wire::WireError;

/// The primary error type for archive parsing, workspace materialisation,
/// addon loading, and the launcher pipeline.
#[derive(Debug, thiserror::Error)]
pub enum SsccError {
    #[error("archive '{path}' does not start with the expected magic bytes")]
    BadMagic { path: PathBuf },

    #[error("archive '{path}' ended unexpectedly while framing an entry")]
    TruncatedArchive { path: PathBuf },

    #[error("archive '{path}' contains an entry path longer than the 4096-byte limit")]
    PathTooLong { path: PathBuf },

    #[error("archive '{path}' contains an unsafe entry path: {detail}")]
    UnsafePath { path: PathBuf, detail: String },

    #[error("archive '{path}' is corrupt: {detail}")]
    CorruptArchive { path: PathBuf, detail: String },

    #[error("no backing store could be created for the workspace ({tried})")]
    WorkspaceUnavailable { tried: String },

    #[error("failed to write the back-end executable into the workspace: {source}")]
    ExecutableWriteFailed { source: std::io::Error },

    #[error("addon '{path}' could not be opened: {source}")]
    AddonOpenFailed { path: PathBuf, source: std::io::Error },

    #[error("addon '{path}' has the wrong magic bytes and was skipped")]
    AddonBadMagic { path: PathBuf },

    #[error("addon '{path}' has a corrupt entry: {detail}")]
    AddonEntryCorrupt { path: PathBuf, detail: String },

    #[error("failed to spawn the back-end compiler: {source}")]
    SpawnFailed { source: std::io::Error },

    #[error("usage error: {0}")]
    UsageError(String),

    #[error("I/O error on '{path}': {source}")]
    Io { path: PathBuf, source: std::io::Error },
}

impl SsccError {
    /// The process exit code this error maps to per spec §6/§7.
    pub fn exit_code(&self) -> i32 {
        match self {
            SsccError::UsageError(_) => 2,
            _ => 1,
        }
    }

    pub(crate) fn from_wire(path: &std::path::Path, err: WireError) -> Self {
        let path = path.to_path_buf();
        match err {
            WireError::BadMagic => SsccError::BadMagic { path },
            WireError::Truncated => SsccError::TruncatedArchive { path },
            WireError::PathTooLong => SsccError::PathTooLong { path },
            WireError::UnsafePath(detail) => SsccError::UnsafePath { path, detail },
        }
    }
}
