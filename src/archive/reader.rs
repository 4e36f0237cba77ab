//! # Archive reader (C2)
//!
//! Frames `CORE` / `ADDON` archives into a lazy, ordered sequence of
//! [`RawEntry`] values without decompressing anything — decompression is
//! the materialiser's job (§4.2), so it can hold at most one decompressed
//! buffer at a time.

use std::path::Path;

use super::wire::{self, Cursor, ADDON_MAGIC, CORE_MAGIC};
use crate::error::SsccError;

/// One framed-but-still-compressed entry read off the wire. `path` is owned
/// because the reader validates and UTF-8-decodes it; `payload` borrows
/// straight from the archive's backing byte span, so no compressed bytes
/// are ever copied during framing.
#[derive(Debug, Clone)]
pub struct RawEntry<'a> {
    pub path: String,
    pub original_size: u32,
    pub payload: &'a [u8],
}

/// The name/description metadata that precedes an `ADDON` archive's entry
/// list. Carries no semantic obligation beyond being surfaced to the user
/// (spec §3).
#[derive(Debug, Clone)]
pub struct AddonMeta {
    pub name: String,
    pub description: String,
}

/// A lazy iterator over the entries of a `CORE` or `ADDON` archive, borrowed
/// from the archive's backing byte span for the lifetime `'a`.
pub struct EntryStream<'a> {
    path: &'a Path,
    cursor: Cursor<'a>,
    remaining: u32,
}

impl<'a> Iterator for EntryStream<'a> {
    type Item = Result<RawEntry<'a>, SsccError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(self.read_one())
    }
}

impl<'a> EntryStream<'a> {
    fn read_one(&mut self) -> Result<RawEntry<'a>, SsccError> {
        let path = self
            .cursor
            .read_path()
            .map_err(|e| SsccError::from_wire(self.path, e))?;
        let (payload, original_size, _compressed_size) = self
            .cursor
            .read_payload()
            .map_err(|e| SsccError::from_wire(self.path, e))?;
        Ok(RawEntry {
            path,
            original_size,
            payload,
        })
    }

    /// Number of entries not yet yielded.
    pub fn remaining_count(&self) -> u32 {
        self.remaining
    }
}

/// Opens a `CORE` archive from a byte span, validating the magic and file
/// count header, and returns a lazy stream of its entries.
pub fn read_core<'a>(path: &'a Path, data: &'a [u8]) -> Result<EntryStream<'a>, SsccError> {
    let mut cursor = Cursor::new(data);
    cursor
        .expect_magic(CORE_MAGIC)
        .map_err(|e| SsccError::from_wire(path, e))?;
    let count = cursor.read_u32().map_err(|e| SsccError::from_wire(path, e))?;
    Ok(EntryStream {
        path,
        cursor,
        remaining: count,
    })
}

/// Opens an `ADDON` archive from a byte span, validating the magic, reading
/// the name/description metadata, and returning a lazy stream of entries.
pub fn read_addon<'a>(
    path: &'a Path,
    data: &'a [u8],
) -> Result<(AddonMeta, EntryStream<'a>), SsccError> {
    let mut cursor = Cursor::new(data);
    cursor
        .expect_magic(ADDON_MAGIC)
        .map_err(|e| SsccError::from_wire(path, e))?;
    let name = cursor
        .read_len_prefixed_string()
        .map_err(|e| SsccError::from_wire(path, e))?;
    let description = cursor
        .read_len_prefixed_string()
        .map_err(|e| SsccError::from_wire(path, e))?;
    let count = cursor.read_u32().map_err(|e| SsccError::from_wire(path, e))?;
    let meta = AddonMeta { name, description };
    let stream = EntryStream {
        path,
        cursor,
        remaining: count,
    };
    Ok((meta, stream))
}

/// Parses just the magic byte prefix of a byte span, used by the addon
/// loader to distinguish "not an addon at all" from "corrupt addon".
pub fn peek_magic(data: &[u8]) -> Option<&'static [u8]> {
    if data.starts_with(CORE_MAGIC) {
        Some(CORE_MAGIC)
    } else if data.starts_with(ADDON_MAGIC) {
        Some(ADDON_MAGIC)
    } else {
        None
    }
}

pub use wire::WireError;
