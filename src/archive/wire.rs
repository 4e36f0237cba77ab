//! Shared little-endian wire framing for `CORE` / `ADDON` archives.
//!
//! This module intentionally depends on nothing but `std` so the exact same
//! source can be compiled twice: once as part of the `sscc` library, and
//! once `include!`-d into `build.rs` to stage the embedded core archive at
//! build time without creating a dependency cycle on the crate itself.

use std::fmt;

pub const CORE_MAGIC: &[u8] = b"CORE";
pub const ADDON_MAGIC: &[u8] = b"ADDON";
pub const MAX_PATH_LEN: u32 = 4096;

#[derive(Debug)]
pub enum WireError {
    BadMagic,
    Truncated,
    PathTooLong,
    UnsafePath(String),
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireError::BadMagic => write!(f, "archive magic bytes did not match"),
            WireError::Truncated => write!(f, "archive stream ended mid-field"),
            WireError::PathTooLong => write!(f, "entry path exceeds {MAX_PATH_LEN} bytes"),
            WireError::UnsafePath(p) => write!(f, "entry path '{p}' escapes the archive root"),
        }
    }
}

impl std::error::Error for WireError {}

/// Validates a path exactly as the wire format requires: forward-slash
/// separated, no leading `/`, no NUL byte, no `..` path segment.
pub fn validate_path(path: &str) -> Result<(), WireError> {
    if path.len() as u32 >= MAX_PATH_LEN {
        return Err(WireError::PathTooLong);
    }
    if path.starts_with('/') || path.contains('\0') || path.is_empty() {
        return Err(WireError::UnsafePath(path.to_string()));
    }
    if path.split('/').any(|seg| seg == "..") {
        return Err(WireError::UnsafePath(path.to_string()));
    }
    Ok(())
}

pub fn push_u32_le(buf: &mut Vec<u8>, v: u32) {
    buf.extend_from_slice(&v.to_le_bytes());
}

pub fn push_len_prefixed(buf: &mut Vec<u8>, bytes: &[u8]) {
    push_u32_le(buf, bytes.len() as u32);
    buf.extend_from_slice(bytes);
}

/// Appends one framed entry: `path_len | path | original_size | compressed_size | payload`.
pub fn push_entry(buf: &mut Vec<u8>, path: &str, original_size: u32, compressed_payload: &[u8]) {
    push_len_prefixed(buf, path.as_bytes());
    push_u32_le(buf, original_size);
    push_u32_le(buf, compressed_payload.len() as u32);
    buf.extend_from_slice(compressed_payload);
}

/// A minimal, allocation-free cursor over a byte span, shared by the
/// runtime reader and `build.rs`'s staging logic.
pub struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn take(&mut self, n: usize) -> Result<&'a [u8], WireError> {
        if self.remaining() < n {
            return Err(WireError::Truncated);
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn expect_magic(&mut self, magic: &[u8]) -> Result<(), WireError> {
        let got = self.take(magic.len())?;
        if got != magic {
            return Err(WireError::BadMagic);
        }
        Ok(())
    }

    pub fn read_u32(&mut self) -> Result<u32, WireError> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes(bytes.try_into().unwrap()))
    }

    pub fn read_len_prefixed_string(&mut self) -> Result<String, WireError> {
        let len = self.read_u32()?;
        if len >= MAX_PATH_LEN * 16 {
            // Generous ceiling for name/description fields; prevents a
            // corrupt length from demanding an absurd allocation.
            return Err(WireError::Truncated);
        }
        let bytes = self.take(len as usize)?;
        std::str::from_utf8(bytes)
            .map(|s| s.to_string())
            .map_err(|_| WireError::UnsafePath(String::from_utf8_lossy(bytes).into_owned()))
    }

    pub fn read_path(&mut self) -> Result<String, WireError> {
        let len = self.read_u32()?;
        if len >= MAX_PATH_LEN {
            return Err(WireError::PathTooLong);
        }
        let bytes = self.take(len as usize)?;
        let path = std::str::from_utf8(bytes)
            .map(|s| s.to_string())
            .map_err(|_| WireError::UnsafePath(String::from_utf8_lossy(bytes).into_owned()))?;
        validate_path(&path)?;
        Ok(path)
    }

    pub fn read_payload(&mut self) -> Result<(&'a [u8], u32, u32), WireError> {
        let original_size = self.read_u32()?;
        let compressed_size = self.read_u32()?;
        let payload = self.take(compressed_size as usize)?;
        Ok((payload, original_size, compressed_size))
    }
}
