//! Error types for the custody core.
//!
//! None of these carry passwords, key bytes or bundle contents in their
//! messages.

use thiserror::Error;

/// Wrapped-key codec failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VaultError {
    /// Authenticated decryption failed. Covers a wrong password as well as a
    /// corrupted, truncated or field-swapped bundle; callers cannot tell them
    /// apart.
    #[error("wrong password")]
    WrongPassword,

    /// Iteration count below the accepted floor.
    #[error("key derivation work factor too low: {0} < {1}")]
    WeakParameters(u32, u32),

    #[error("encryption failed")]
    Encryption,
}

/// Wallet provider failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WalletError {
    #[error("invalid private key material")]
    InvalidKey,

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("signing failed: {0}")]
    Signing(String),
}

/// Session token failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Bad MAC, malformed token or claims.
    #[error("invalid token")]
    InvalidToken,

    #[error("token expired")]
    Expired,

    #[error("token signing secret must be at least {0} bytes")]
    WeakSecret(usize),

    #[error("failed to issue token: {0}")]
    Issue(String),
}

/// Credential hashing and password policy failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("{0}")]
    WeakPassword(&'static str),

    #[error("failed to hash password: {0}")]
    Hashing(String),

    #[error("stored credential hash is malformed")]
    MalformedHash,
}

/// Failures of the unwrap, re-derive, sign sequence.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SigningError {
    #[error("wrong password")]
    WrongPassword,

    /// The unwrapped key does not derive the stored address.
    #[error("stored wallet address does not match unwrapped key")]
    AddressMismatch,

    #[error(transparent)]
    Wallet(#[from] WalletError),
}

impl From<VaultError> for SigningError {
    fn from(err: VaultError) -> Self {
        match err {
            VaultError::WrongPassword => SigningError::WrongPassword,
            other => SigningError::Wallet(WalletError::Signing(other.to_string())),
        }
    }
}

/// Failures while producing registration material.
#[derive(Error, Debug)]
pub enum RegistrationError {
    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    Vault(#[from] VaultError),

    #[error(transparent)]
    Wallet(#[from] WalletError),
}
