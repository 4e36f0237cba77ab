//! # Archive writer (C3)
//!
//! The offline archive builder: walks a directory tree, filters entries
//! against one of three predicate families (§4.3), compresses each
//! retained file, and emits the framed `CORE` / `ADDON` bytes. This module
//! backs both `src/bin/sscc-mkcore.rs` / `src/bin/sscc-mkaddon.rs` and
//! `build.rs` (via the `archive::wire` module it shares with the runtime).

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use super::wire::{self, ADDON_MAGIC, CORE_MAGIC};
use crate::codec;

/// The default ceiling above which addon files are skipped with a warning.
/// Core archives have no ceiling (spec §4.3).
pub const ADDON_SIZE_CEILING: u64 = 2 * 1024 * 1024;

/// A single file staged for inclusion, already read into memory. Produced
/// by [`stage_tree`] and consumed by [`write_core`] / [`write_addon`].
#[derive(Debug, Clone)]
pub struct Staged {
    pub path: String,
    pub data: Vec<u8>,
}

/// The three mutually-exclusive predicate families of spec §4.3. Predicates
/// are combined by family, never mixed.
pub enum Predicate<'a> {
    /// Retain every regular file. Used to build the full core.
    IncludeAll,
    /// Retain every file whose basename is absent from `excluded_basenames`.
    /// Used by addon builders so addons never duplicate a core file.
    ExcludeBasenames(&'a HashSet<String>),
    /// Retain files whose basename contains any of these substrings.
    PatternMatch(&'a [String]),
}

impl<'a> Predicate<'a> {
    fn retains(&self, basename: &str) -> bool {
        match self {
            Predicate::IncludeAll => true,
            Predicate::ExcludeBasenames(excluded) => !excluded.contains(basename),
            Predicate::PatternMatch(patterns) => patterns.iter().any(|p| basename.contains(p.as_str())),
        }
    }
}

/// Walks `root` (expected to contain `include/` and/or `lib/` subtrees),
/// retaining files that satisfy `predicate` and are not larger than
/// `size_ceiling` (if `Some`). Traversal is sorted so output is
/// deterministic; symlinks and non-regular files are skipped silently.
pub fn stage_tree(
    root: &Path,
    predicate: &Predicate,
    size_ceiling: Option<u64>,
) -> std::io::Result<Vec<Staged>> {
    let mut staged = Vec::new();
    for subtree in ["include", "lib"] {
        let dir = root.join(subtree);
        if !dir.is_dir() {
            continue;
        }
        let walker = WalkDir::new(&dir).sort_by_file_name().into_iter();
        for entry in walker {
            let entry = entry?;
            let file_type = entry.file_type();
            if file_type.is_symlink() || !file_type.is_file() {
                continue;
            }
            let meta = entry.metadata()?;
            if let Some(ceiling) = size_ceiling {
                if meta.len() > ceiling {
                    eprintln!(
                        "Warning: skipping '{}' ({} bytes exceeds the {}-byte ceiling)",
                        entry.path().display(),
                        meta.len(),
                        ceiling
                    );
                    continue;
                }
            }
            let basename = entry.file_name().to_string_lossy().into_owned();
            if !predicate.retains(&basename) {
                continue;
            }
            let rel_path = entry
                .path()
                .strip_prefix(root)
                .unwrap_or(entry.path())
                .to_string_lossy()
                .replace('\\', "/");
            let data = fs::read(entry.path())?;
            staged.push(Staged { path: rel_path, data });
        }
    }
    Ok(staged)
}

/// Reads an already-built `CORE` archive and returns the set of basenames it
/// contains, for use as an [`Predicate::ExcludeBasenames`] input — this is
/// how addon builders guarantee addons never duplicate a core file.
pub fn core_basenames(core_bytes: &[u8]) -> Result<HashSet<String>, crate::error::SsccError> {
    let path = Path::new("<core-for-exclusion>");
    let stream = super::reader::read_core(path, core_bytes)?;
    let mut names = HashSet::new();
    for entry in stream {
        let entry = entry?;
        if let Some(basename) = entry.path.rsplit('/').next() {
            names.insert(basename.to_string());
        }
    }
    Ok(names)
}

fn compress_staged(staged: &[Staged]) -> std::io::Result<Vec<(String, u32, Vec<u8>)>> {
    staged
        .iter()
        .map(|f| {
            let compressed = codec::compress(&f.data)?;
            Ok((f.path.clone(), f.data.len() as u32, compressed))
        })
        .collect()
}

/// Emits a `CORE` archive: `magic[4] | count:u32 | entry*`.
pub fn write_core(staged: &[Staged]) -> std::io::Result<Vec<u8>> {
    let compressed = compress_staged(staged)?;
    let mut buf = Vec::new();
    buf.extend_from_slice(CORE_MAGIC);
    wire::push_u32_le(&mut buf, compressed.len() as u32);
    for (path, original_size, payload) in &compressed {
        wire::push_entry(&mut buf, path, *original_size, payload);
    }
    Ok(buf)
}

/// Emits an `ADDON` archive:
/// `magic[5] | name_len:u32 | name | desc_len:u32 | desc | count:u32 | entry*`.
pub fn write_addon(name: &str, description: &str, staged: &[Staged]) -> std::io::Result<Vec<u8>> {
    let compressed = compress_staged(staged)?;
    let mut buf = Vec::new();
    buf.extend_from_slice(ADDON_MAGIC);
    wire::push_len_prefixed(&mut buf, name.as_bytes());
    wire::push_len_prefixed(&mut buf, description.as_bytes());
    wire::push_u32_le(&mut buf, compressed.len() as u32);
    for (path, original_size, payload) in &compressed {
        wire::push_entry(&mut buf, path, *original_size, payload);
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_file(dir: &Path, rel: &str, content: &[u8]) {
        let full = dir.join(rel);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, content).unwrap();
    }

    #[test]
    fn stages_include_and_lib_subtrees_sorted() {
        let tmp = tempfile::tempdir().unwrap();
        write_file(tmp.path(), "include/stdio.h", b"int printf();");
        write_file(tmp.path(), "include/zlib.h", b"int deflate();");
        write_file(tmp.path(), "lib/libc.a", b"ARCHIVE");

        let staged = stage_tree(tmp.path(), &Predicate::IncludeAll, None).unwrap();
        let paths: Vec<_> = staged.iter().map(|s| s.path.clone()).collect();
        assert_eq!(paths, vec!["include/stdio.h", "include/zlib.h", "lib/libc.a"]);
    }

    #[test]
    fn exclusion_predicate_drops_basenames_present_in_core() {
        let tmp = tempfile::tempdir().unwrap();
        write_file(tmp.path(), "include/stdio.h", b"int printf();");
        write_file(tmp.path(), "include/gmp.h", b"gmp extras");

        let mut excluded = HashSet::new();
        excluded.insert("stdio.h".to_string());
        let staged = stage_tree(tmp.path(), &Predicate::ExcludeBasenames(&excluded), None).unwrap();
        assert_eq!(staged.len(), 1);
        assert_eq!(staged[0].path, "include/gmp.h");
    }

    #[test]
    fn size_ceiling_skips_oversized_files() {
        let tmp = tempfile::tempdir().unwrap();
        write_file(tmp.path(), "lib/big.a", &vec![0u8; 64]);
        let staged = stage_tree(tmp.path(), &Predicate::IncludeAll, Some(8)).unwrap();
        assert!(staged.is_empty());
    }

    #[test]
    fn write_then_read_round_trips_a_full_tree() {
        let tmp = tempfile::tempdir().unwrap();
        write_file(tmp.path(), "include/stdio.h", b"int printf();");
        write_file(tmp.path(), "lib/libc.a", b"fake archive contents");

        let staged = stage_tree(tmp.path(), &Predicate::IncludeAll, None).unwrap();
        let bytes = write_core(&staged).unwrap();

        let path = Path::new("roundtrip.blz");
        let stream = super::super::reader::read_core(path, &bytes).unwrap();
        let mut entries: Vec<_> = stream.collect::<Result<_, _>>().unwrap();
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].path, "include/stdio.h");
        assert_eq!(entries[1].path, "lib/libc.a");
    }
}
