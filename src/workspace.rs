//! # Workspace materialiser (C5)
//!
//! Given a freshly-created [`Workspace`] and a sequence of archive entries,
//! writes every entry at its relative path under the workspace root
//! (directories at mode `0755`, files at mode `0644`, the back-end
//! executable at `0755`). Entries are processed one at a time so at most
//! one decompressed buffer is resident at once (spec §4.5, §5).

use std::fs;
use std::path::{Path, PathBuf};

use crate::archive::reader::RawEntry;
use crate::archive::wire;
use crate::codec;
use crate::error::SsccError;
use crate::fsx;
use crate::store::Workspace;

/// Name the back-end executable is written under at the workspace root.
pub const BACKEND_NAME: &str = "tcc";

const DIR_MODE: u32 = 0o755;
const FILE_MODE: u32 = 0o644;
const EXEC_MODE: u32 = 0o755;

fn io_err(path: &Path, source: std::io::Error) -> SsccError {
    SsccError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Re-validates an already-framed path against the §4.2 safety rules
/// before touching the filesystem — defence in depth against a corrupted
/// intermediate escaping the workspace, even though the reader already
/// rejected unsafe paths at parse time.
fn safe_join(root: &Path, entry_path: &str, archive_path: &Path) -> Result<PathBuf, SsccError> {
    wire::validate_path(entry_path).map_err(|e| SsccError::from_wire(archive_path, e))?;
    Ok(root.join(entry_path))
}

fn write_entry(
    workspace: &mut Workspace,
    archive_path: &Path,
    entry: RawEntry<'_>,
) -> Result<(), SsccError> {
    let dest = safe_join(workspace.root(), &entry.path, archive_path)?;
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
        fsx::set_unix_permissions(parent, DIR_MODE).map_err(|e| io_err(parent, e))?;
    }
    let data = codec::decompress_entry(archive_path, &entry.path, entry.payload, entry.original_size)?;
    fs::write(&dest, &data).map_err(|e| io_err(&dest, e))?;
    fsx::set_unix_permissions(&dest, FILE_MODE).map_err(|e| io_err(&dest, e))?;
    workspace.record_write(data.len() as u64);
    Ok(())
}

/// Materialises every entry of `stream` into `workspace`, one at a time.
/// Returns the number of files written and total bytes written for this
/// call (the caller prints these after the core and after each addon, per
/// spec §4.5).
pub fn materialise<'a, I>(
    workspace: &mut Workspace,
    archive_path: &Path,
    entries: I,
) -> Result<(u64, u64), SsccError>
where
    I: IntoIterator<Item = Result<RawEntry<'a>, SsccError>>,
{
    let files_before = workspace.files_written();
    let bytes_before = workspace.bytes_written();
    for entry in entries {
        write_entry(workspace, archive_path, entry?)?;
    }
    Ok((
        workspace.files_written() - files_before,
        workspace.bytes_written() - bytes_before,
    ))
}

/// Writes the embedded back-end executable at `<workspace>/tcc` with mode
/// `0755` (spec §4.7 step 4).
pub fn write_backend(workspace: &Workspace, bytes: &[u8]) -> Result<PathBuf, SsccError> {
    let dest = workspace.root().join(BACKEND_NAME);
    fs::write(&dest, bytes).map_err(|source| SsccError::ExecutableWriteFailed { source })?;
    fsx::set_unix_permissions(&dest, EXEC_MODE)
        .map_err(|source| SsccError::ExecutableWriteFailed { source })?;
    Ok(dest)
}
