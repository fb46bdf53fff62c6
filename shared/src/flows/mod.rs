use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::credential::hash_password;
use crate::error::{RegistrationError, SigningError};
use crate::primitives::WrappedKey;
use crate::vault::KeyVault;
use crate::wallet::{self, PrivateKey};

/// Everything persisted for a new account besides its id and email.
pub struct RegistrationMaterial {
    pub credential_hash: String,
    pub wallet_address: String,
    pub wrapped_key: WrappedKey,
}

/// Hashes the login credential, generates a wallet and wraps its private key
/// under `password`. The plaintext key is dropped (and wiped) before return.
pub fn generate_registration_material(
    vault: &KeyVault,
    password: &str,
) -> Result<RegistrationMaterial, RegistrationError> {
    let credential_hash = hash_password(password)?;

    let generated = wallet::generate();
    let wrapped_key = vault.wrap(generated.private_key.as_bytes(), password)?;

    Ok(RegistrationMaterial {
        credential_hash,
        wallet_address: generated.address,
        wrapped_key,
    })
}

/// ISO 8601 UTC with millisecond precision, e.g. `2024-01-01T00:00:00.000Z`.
pub fn signing_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn canonical_message(location_url: &str, title: &str, signed_at: &str) -> String {
    format!(
        "Video Upload: {}\nTitle: {}\nTimestamp: {}",
        location_url, title, signed_at
    )
}

/// Unwraps the custodial key, checks it still derives `expected_address`,
/// and signs `message` with it. The plaintext never leaves this call.
pub fn sign_with_custodial_key(
    vault: &KeyVault,
    wrapped_key: &WrappedKey,
    password: &str,
    expected_address: &str,
    message: &str,
) -> Result<String, SigningError> {
    vault.with_unwrapped(wrapped_key, password, |plaintext| -> Result<String, SigningError> {
        let private_key = PrivateKey::from_bytes(plaintext)?;

        let derived = wallet::derive_address(&private_key)?;
        if !wallet::same_address(&derived, expected_address)? {
            return Err(SigningError::AddressMismatch);
        }

        Ok(wallet::sign(&private_key, message)?)
    })?
}

/// No `Debug`: carries a password.
#[derive(Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AccountView {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub wallet_address: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct LoginResponse {
    pub token: String,
    pub account: AccountView,
}

#[derive(Serialize, Deserialize)]
pub struct RecordVideoRequest {
    pub location_url: String,
    pub title: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct VideoView {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub location_url: String,
    pub signature: String,
    pub signed_at: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct VideoVerification {
    pub video_id: Uuid,
    pub wallet_address: String,
    pub message: String,
    pub valid: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorBody {
    pub kind: String,
    pub message: String,
}
