//! # Codec façade (C1)
//!
//! A stateless, reentrant compress/decompress pair over the LZMA-family
//! codec (`xz2`, libzma's raw `.xz` container). Compression always uses the
//! highest preset — throughput doesn't matter because compression only
//! happens offline, in the archive builders (C3) and in `build.rs`.
//! Decompression is exact: it fails unless the decompressed stream is
//! precisely `expected_output_length` bytes long.

use std::io::{Read, Write};

use xz2::read::XzDecoder;
use xz2::write::XzEncoder;

use crate::error::SsccError;

/// Highest-ratio preset; compression is always offline so speed is moot.
const PRESET: u32 = 9;

/// Compresses `data` with the highest LZMA preset and returns the `.xz`
/// container bytes.
pub fn compress(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = XzEncoder::new(Vec::new(), PRESET);
    encoder.write_all(data)?;
    encoder.finish()
}

/// Decompresses `payload`, requiring the result to be exactly
/// `expected_output_length` bytes. Any mismatch (short or long output, or a
/// malformed stream) is a `CorruptArchive`-class failure at the caller.
pub fn decompress(payload: &[u8], expected_output_length: u32) -> Result<Vec<u8>, std::io::Error> {
    let mut decoder = XzDecoder::new(payload);
    let mut out = Vec::with_capacity(expected_output_length as usize);
    decoder.read_to_end(&mut out)?;
    if out.len() as u32 != expected_output_length {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!(
                "decompressed {} bytes, expected exactly {}",
                out.len(),
                expected_output_length
            ),
        ));
    }
    Ok(out)
}

/// Convenience wrapper used by the materialiser, which needs a `SsccError`
/// pinned to the archive path a corrupt entry came from.
pub fn decompress_entry(
    archive_path: &std::path::Path,
    entry_path: &str,
    payload: &[u8],
    expected_output_length: u32,
) -> Result<Vec<u8>, SsccError> {
    decompress(payload, expected_output_length).map_err(|e| SsccError::CorruptArchive {
        path: archive_path.to_path_buf(),
        detail: format!("entry '{entry_path}' failed to decompress: {e}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_arbitrary_bytes() {
        let data = b"int printf();\nint main() { return 0; }\n".repeat(37);
        let compressed = compress(&data).unwrap();
        let restored = decompress(&compressed, data.len() as u32).unwrap();
        assert_eq!(restored, data);
    }

    #[test]
    fn rejects_a_length_mismatch() {
        let data = b"some header content";
        let compressed = compress(data).unwrap();
        assert!(decompress(&compressed, (data.len() + 1) as u32).is_err());
    }

    #[test]
    fn round_trips_empty_input() {
        let compressed = compress(b"").unwrap();
        let restored = decompress(&compressed, 0).unwrap();
        assert!(restored.is_empty());
    }
}
