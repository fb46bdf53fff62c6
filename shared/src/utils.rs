use base64::{engine::general_purpose as b64, Engine};

use crate::error::VaultError;

pub fn b64_encode(bytes: &[u8]) -> String {
    b64::STANDARD.encode(bytes)
}

/// Decodes a stored bundle field. A bad encoding is indistinguishable from a
/// failed decryption to the caller.
pub fn b64_decode(str: &str) -> Result<Vec<u8>, VaultError> {
    b64::STANDARD
        .decode(str)
        .map_err(|_| VaultError::WrongPassword)
}

/// `0x`-prefixed lowercase hex.
pub fn hex_prefixed(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

pub fn strip_hex_prefix(str: &str) -> &str {
    str.strip_prefix("0x")
        .or_else(|| str.strip_prefix("0X"))
        .unwrap_or(str)
}

#[cfg(test)]
#[test]
fn hex_prefix_handling() {
    assert_eq!(hex_prefixed(&[0xde, 0xad]), "0xdead");
    assert_eq!(strip_hex_prefix("0xdead"), "dead");
    assert_eq!(strip_hex_prefix("0Xdead"), "dead");
    assert_eq!(strip_hex_prefix("dead"), "dead");
}
