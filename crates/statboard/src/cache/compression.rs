//! Payload compression for the distributed cache tier.
//!
//! Uses zstd with magic-byte detection so uncompressed payloads written
//! by older processes (or after a compression failure) decompress
//! transparently: bytes without the magic header pass through as-is.

/// Zstd magic bytes (little-endian): 0xFD2FB528
const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];

/// Compression level 3 balances speed against ratio for JSON payloads.
const DEFAULT_COMPRESSION_LEVEL: i32 = 3;

/// Compression error types.
#[derive(Debug, thiserror::Error)]
pub enum CompressionError {
    /// Failed to compress data.
    #[error("compression failed: {0}")]
    CompressFailed(String),

    /// Failed to decompress data.
    #[error("decompression failed: {0}")]
    DecompressFailed(String),
}

/// Check if data is zstd-compressed by checking magic bytes.
#[inline]
#[must_use]
pub fn is_compressed(data: &[u8]) -> bool {
    data.len() >= 4 && data[..4] == ZSTD_MAGIC
}

/// Compress bytes with the default level.
pub fn compress_bytes(data: &[u8]) -> Result<Vec<u8>, CompressionError> {
    zstd::encode_all(data, DEFAULT_COMPRESSION_LEVEL)
        .map_err(|e| CompressionError::CompressFailed(e.to_string()))
}

/// Decompress bytes, passing uncompressed input through unchanged.
pub fn decompress_bytes(data: &[u8]) -> Result<Vec<u8>, CompressionError> {
    if is_compressed(data) {
        zstd::decode_all(data).map_err(|e| CompressionError::DecompressFailed(e.to_string()))
    } else {
        Ok(data.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let original = br#"{"entries": [1, 2, 3], "built_at": "2026-03-01T00:00:00Z"}"#;
        let compressed = compress_bytes(original).unwrap();
        assert!(is_compressed(&compressed));

        let decompressed = decompress_bytes(&compressed).unwrap();
        assert_eq!(original.as_slice(), decompressed.as_slice());
    }

    #[test]
    fn test_plain_bytes_pass_through() {
        let plain = br#"{"plain": true}"#;
        assert!(!is_compressed(plain));
        assert_eq!(decompress_bytes(plain).unwrap(), plain.to_vec());
    }

    #[test]
    fn test_magic_detection_on_short_input() {
        assert!(!is_compressed(b""));
        assert!(!is_compressed(b"abc"));
    }

    #[test]
    fn test_repetitive_json_shrinks() {
        let payload = serde_json::json!({
            "entries": (0..100).map(|i| serde_json::json!({
                "member_id": "00000000-0000-0000-0000-000000000000",
                "kind": "commits",
                "amount": i,
            })).collect::<Vec<_>>()
        });
        let bytes = serde_json::to_vec(&payload).unwrap();
        let compressed = compress_bytes(&bytes).unwrap();
        assert!(compressed.len() < bytes.len());
    }
}
