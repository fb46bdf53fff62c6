use std::sync::OnceLock;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::error::CredentialError;

pub const MIN_PASSWORD_LEN: usize = 8;

pub fn check_password_policy(password: &str) -> Result<(), CredentialError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(CredentialError::WeakPassword(
            "password must be at least 8 characters",
        ));
    }
    if !password.chars().any(|c| c.is_lowercase()) {
        return Err(CredentialError::WeakPassword(
            "password must contain a lowercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        return Err(CredentialError::WeakPassword(
            "password must contain an uppercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(CredentialError::WeakPassword("password must contain a digit"));
    }
    Ok(())
}

pub fn hash_password(password: &str) -> Result<String, CredentialError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CredentialError::Hashing(e.to_string()))
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, CredentialError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| CredentialError::MalformedHash)?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

static DUMMY_HASH: OnceLock<String> = OnceLock::new();

/// Spends one Argon2 verification on a throwaway hash, so a login for an
/// unknown email costs the same as one with a bad password. Always `false`.
pub fn verify_password_for_unknown_account(password: &str) -> bool {
    let hash = DUMMY_HASH.get_or_init(|| {
        hash_password("clipmark-unknown-account").unwrap_or_default()
    });
    let _ = verify_password(password, hash);
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy() {
        assert!(check_password_policy("Abcd1234").is_ok());
        assert!(check_password_policy("Abc123").is_err());
        assert!(check_password_policy("abcd1234").is_err());
        assert!(check_password_policy("ABCD1234").is_err());
        assert!(check_password_policy("Abcdefgh").is_err());
    }

    #[test]
    fn hash_and_verify() {
        let hash = hash_password("Abcd1234").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("Abcd1234", &hash).unwrap());
        assert!(!verify_password("Abcd12345", &hash).unwrap());
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_password("Abcd1234").unwrap();
        let b = hash_password("Abcd1234").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn unknown_account_runs_a_real_verification() {
        assert!(!verify_password_for_unknown_account("Abcd1234"));
        assert!(!verify_password_for_unknown_account("clipmark-unknown-account"));

        let hash = DUMMY_HASH.get().unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(PasswordHash::new(hash).is_ok());
    }

    #[test]
    fn malformed_hash() {
        assert_eq!(
            verify_password("Abcd1234", "plaintext").unwrap_err(),
            CredentialError::MalformedHash
        );
    }
}
