/// Strings on the wire are NUL terminated 7-bit ASCII, so a valid
/// NETASCII field holds only code points 1 through 127.
pub fn is_netascii(s: &str) -> bool {
    is_netascii_bytes(s.as_bytes())
}

/// Any byte of a multi-byte UTF-8 sequence is >= 0x80, so checking bytes
/// is the same as checking characters.
pub fn is_netascii_bytes(bytes: &[u8]) -> bool {
    bytes.iter().all(|&b| b != 0 && b.is_ascii())
}
