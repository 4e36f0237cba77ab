//! # Addon loader (C6)
//!
//! Applies a user-ordered list of `ADDON` archives on top of the core
//! workspace. Ordering matters: later addons overwrite earlier ones (and
//! the core) at colliding paths, because the materialiser simply writes
//! over whatever is already at a path (spec §4.6).
//!
//! `discover_candidates` backs the supplemented `--list-addons` flag
//! (SPEC_FULL.md §C.1): it is read-only and purely informational, and is
//! kept entirely separate from the addon list the launcher actually
//! applies — spec §4.6 excludes cwd auto-loading as a reproducibility
//! hazard, but listing candidates does not touch the workspace.

use std::path::{Path, PathBuf};

use crate::archive::reader::{self, AddonMeta};
use crate::archive::wire::ADDON_MAGIC;
use crate::error::SsccError;
use crate::store::Workspace;
use crate::workspace as ws_mod;

/// Tallies reported to the user after an addon is applied.
pub struct AddonReport {
    pub meta: AddonMeta,
    pub files: u64,
    pub bytes: u64,
}

/// Applies one addon archive file on top of `workspace`. Returns `Ok(None)`
/// (with a warning already logged) if the addon could not be opened or has
/// the wrong magic bytes — those failures are recovered locally and do not
/// abort the launch. A corrupt entry mid-stream is a hard failure.
pub fn apply_one(workspace: &mut Workspace, addon_path: &Path) -> Result<Option<AddonReport>, SsccError> {
    let bytes = match std::fs::read(addon_path) {
        Ok(b) => b,
        Err(source) => {
            let err = SsccError::AddonOpenFailed {
                path: addon_path.to_path_buf(),
                source,
            };
            tracing::warn!(%err, "skipping addon");
            eprintln!("Warning: {err}");
            return Ok(None);
        }
    };

    if reader::peek_magic(&bytes) != Some(ADDON_MAGIC) {
        let err = SsccError::AddonBadMagic {
            path: addon_path.to_path_buf(),
        };
        tracing::warn!(%err, "skipping addon");
        eprintln!("Warning: {err}");
        return Ok(None);
    }

    let (meta, entries) = reader::read_addon(addon_path, &bytes)?;
    let entries: Vec<_> = entries.collect();
    let (files, bytes_written) = ws_mod::materialise(workspace, addon_path, entries.into_iter())
        .map_err(|e| promote_to_addon_error(addon_path, e))?;

    Ok(Some(AddonReport {
        meta,
        files,
        bytes: bytes_written,
    }))
}

/// Archive-integrity failures surfaced while materialising an addon are
/// reported as `AddonEntryCorrupt` per spec §7, rather than the generic
/// archive-reader variants, so the launcher's top-level diagnostic names
/// the addon as the offending party.
fn promote_to_addon_error(addon_path: &Path, err: SsccError) -> SsccError {
    SsccError::AddonEntryCorrupt {
        path: addon_path.to_path_buf(),
        detail: err.to_string(),
    }
}

/// Applies every addon in `addon_paths`, in order, printing per-addon
/// name/description and byte/file tallies as each is applied (spec §4.5,
/// §4.6). Stops and propagates on the first hard (entry-corrupt) failure;
/// open/magic failures are warned and skipped.
pub fn apply_all(workspace: &mut Workspace, addon_paths: &[PathBuf]) -> Result<(), SsccError> {
    for addon_path in addon_paths {
        if let Some(report) = apply_one(workspace, addon_path)? {
            println!(
                "Addon '{}' ({}): {} files, {} bytes",
                report.meta.name, report.meta.description, report.files, report.bytes
            );
        }
    }
    Ok(())
}

/// Globs `sscc-*.addon` in the current directory and returns their paths
/// and sizes, for the informational `--list-addons` flag. Never feeds the
/// launcher's actual addon-application list (`--addon` is the only way an
/// addon is ever applied).
pub fn discover_candidates() -> std::io::Result<Vec<(PathBuf, u64)>> {
    let mut found = Vec::new();
    for entry in std::fs::read_dir(".")? {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with("sscc-") && name.ends_with(".addon") {
            let size = entry.metadata()?.len();
            found.push((entry.path(), size));
        }
    }
    found.sort();
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::writer::{write_addon, Staged};
    use std::fs;

    #[test]
    fn later_addon_overwrites_earlier_one_at_the_same_path() {
        let mut ws = crate::store::select().unwrap();

        let a = write_addon(
            "a",
            "addon a",
            &[Staged {
                path: "include/x.h".to_string(),
                data: b"A".to_vec(),
            }],
        )
        .unwrap();
        let b = write_addon(
            "b",
            "addon b",
            &[Staged {
                path: "include/x.h".to_string(),
                data: b"B".to_vec(),
            }],
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let a_path = dir.path().join("A.addon");
        let b_path = dir.path().join("B.addon");
        fs::write(&a_path, &a).unwrap();
        fs::write(&b_path, &b).unwrap();

        apply_all(&mut ws, &[a_path, b_path]).unwrap();

        let content = fs::read_to_string(ws.root().join("include/x.h")).unwrap();
        assert_eq!(content, "B");
    }

    #[test]
    fn unopenable_addon_is_skipped_not_fatal() {
        let mut ws = crate::store::select().unwrap();
        let missing = PathBuf::from("/nonexistent/path/does-not-exist.addon");
        let result = apply_all(&mut ws, &[missing]);
        assert!(result.is_ok());
    }

    #[test]
    fn wrong_magic_addon_is_skipped_not_fatal() {
        let mut ws = crate::store::select().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bogus.addon");
        fs::write(&path, b"NOTANADDON").unwrap();
        let result = apply_all(&mut ws, &[path]);
        assert!(result.is_ok());
    }

    #[test]
    fn corrupt_entry_is_a_hard_failure() {
        let mut ws = crate::store::select().unwrap();
        // Hand-build an ADDON archive whose original_size lies about the
        // decompressed length, per scenario S4.
        let mut buf = Vec::new();
        buf.extend_from_slice(b"ADDON");
        crate::archive::wire::push_len_prefixed(&mut buf, b"bad");
        crate::archive::wire::push_len_prefixed(&mut buf, b"bad addon");
        crate::archive::wire::push_u32_le(&mut buf, 1);
        let compressed = crate::codec::compress(b"real content").unwrap();
        crate::archive::wire::push_entry(&mut buf, "include/x.h", 99999, &compressed);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrupt.addon");
        fs::write(&path, &buf).unwrap();

        let result = apply_all(&mut ws, &[path]);
        assert!(matches!(result, Err(SsccError::AddonEntryCorrupt { .. })));
    }
}
