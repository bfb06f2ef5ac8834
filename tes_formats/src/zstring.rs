/// Longest zero-terminated string kept from a subrecord, in bytes.
///
/// Matches the engine's 512-byte scratch buffer minus the terminator. Longer
/// payloads are truncated rather than rejected.
pub const MAX_ZSTRING_LEN: usize = 511;

/// Decode a NUL-padded subrecord payload.
///
/// Stops at the first NUL, caps the result at [`MAX_ZSTRING_LEN`] bytes and
/// replaces invalid UTF-8 (plugin strings are usually Windows-1252).
pub fn decode_zstring(bytes: &[u8]) -> String {
    let bytes = &bytes[..bytes.len().min(MAX_ZSTRING_LEN)];
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}
