//! # Embedded blob binding (C8)
//!
//! Exposes the baked-in `CORE` archive and back-end executable as
//! read-only byte spans. `build.rs` stages `resources/core/{include,lib}`
//! into a `CORE` archive at build time (using the same `archive::writer`
//! the offline builders use) and writes it to `$OUT_DIR/core.archive`;
//! `include_bytes!` pulls both that and the back-end executable in
//! verbatim. This module has no runtime logic beyond delivering pointers,
//! sizes, and a framed entry stream.

use crate::archive::reader::{self, RawEntry};
use crate::error::SsccError;

static CORE_ARCHIVE: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/core.archive"));
static BACKEND_EXECUTABLE: &[u8] = include_bytes!(concat!(env!("OUT_DIR"), "/backend"));

/// The raw bytes of the baked-in `CORE` archive.
pub fn core_archive() -> &'static [u8] {
    CORE_ARCHIVE
}

/// The raw bytes of the embedded back-end compiler executable.
pub fn backend_executable() -> &'static [u8] {
    BACKEND_EXECUTABLE
}

/// Opens the embedded `CORE` archive and returns its entry stream, ready
/// for the materialiser.
pub fn core_archive_entries() -> Result<impl Iterator<Item = Result<RawEntry<'static>, SsccError>>, SsccError> {
    let path = std::path::Path::new("<embedded-core>");
    reader::read_core(path, CORE_ARCHIVE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_core_archive_starts_with_the_core_magic() {
        assert!(core_archive().starts_with(b"CORE"));
    }

    #[test]
    fn embedded_core_archive_entries_are_readable() {
        let entries: Vec<_> = core_archive_entries().unwrap().collect::<Result<_, _>>().unwrap();
        assert!(!entries.is_empty());
        assert!(entries.iter().any(|e| e.path == "include/stdio.h"));
    }
}
