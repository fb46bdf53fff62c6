use serde::{Deserialize, Serialize};
use std::fmt;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop};

#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct AutoZeroedByteArray(Vec<u8>);

impl AutoZeroedByteArray {
    pub fn new(bytes: Vec<u8>) -> AutoZeroedByteArray {
        AutoZeroedByteArray(bytes)
    }

    pub fn as_slice(&self) -> &[u8] {
        self.0.as_slice()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for AutoZeroedByteArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AutoZeroedByteArray([REDACTED; {}])", self.0.len())
    }
}

/// Password bytes in Unicode NFKD form.
///
/// Whitespace is significant: two passwords that differ only by a trailing
/// space derive different keys.
pub struct NormalizedPassword(pub AutoZeroedByteArray);

impl NormalizedPassword {
    pub fn new(str: &str) -> NormalizedPassword {
        let mut normalized: String = str.nfkd().collect();
        let arr = AutoZeroedByteArray::new(normalized.as_bytes().to_vec());
        normalized.zeroize();
        NormalizedPassword(arr)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedEmail(pub String);

impl NormalizedEmail {
    pub fn new(str: &str) -> NormalizedEmail {
        NormalizedEmail(str.trim().to_lowercase())
    }

    /// Normalizes and applies a minimal shape check: one `@` with a
    /// non-empty local part and a dotted domain.
    pub fn parse(str: &str) -> Option<NormalizedEmail> {
        let email = NormalizedEmail::new(str);
        let (local, domain) = email.0.split_once('@')?;
        if local.is_empty()
            || domain.contains('@')
            || !domain.contains('.')
            || domain.starts_with('.')
            || domain.ends_with('.')
            || email.0.chars().any(char::is_whitespace)
        {
            return None;
        }
        Some(email)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub struct Salt(pub Vec<u8>);

/// Storable form of a password-wrapped secret. Every field is standard
/// base64; `ciphertext` carries the AES-GCM tag.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrappedKey {
    pub salt: String,
    pub iv: String,
    pub ciphertext: String,
}

impl fmt::Debug for WrappedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WrappedKey { .. }")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_is_trimmed_and_lowercased() {
        let email = NormalizedEmail::new("  Alice@Example.COM ");
        assert_eq!(email.as_str(), "alice@example.com");
    }

    #[test]
    fn email_shape_check() {
        assert!(NormalizedEmail::parse("a@x.com").is_some());
        assert!(NormalizedEmail::parse("a@x").is_none());
        assert!(NormalizedEmail::parse("@x.com").is_none());
        assert!(NormalizedEmail::parse("a@b@x.com").is_none());
        assert!(NormalizedEmail::parse("a b@x.com").is_none());
        assert!(NormalizedEmail::parse("a@x.com.").is_none());
    }

    #[test]
    fn password_normalization_keeps_whitespace() {
        let a = NormalizedPassword::new("secret");
        let b = NormalizedPassword::new("secret ");
        assert_ne!(a.0.as_slice(), b.0.as_slice());
    }

    #[test]
    fn password_normalization_folds_compatibility_forms() {
        // U+00E9 vs "e" + U+0301
        let composed = NormalizedPassword::new("caf\u{e9}");
        let decomposed = NormalizedPassword::new("cafe\u{301}");
        assert_eq!(composed.0.as_slice(), decomposed.0.as_slice());
    }

    #[test]
    fn debug_output_is_redacted() {
        let bytes = AutoZeroedByteArray::new(vec![0xAB; 4]);
        assert_eq!(format!("{:?}", bytes), "AutoZeroedByteArray([REDACTED; 4])");

        let bundle = WrappedKey {
            salt: "c2FsdA==".into(),
            iv: "aXY=".into(),
            ciphertext: "Y3Q=".into(),
        };
        assert_eq!(format!("{:?}", bundle), "WrappedKey { .. }");
    }
}
