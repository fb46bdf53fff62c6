//! Password-based wrapping of wallet private keys.
//!
//! `wrap` derives a 256-bit key with PBKDF2-HMAC-SHA256 over a fresh 32-byte
//! salt and seals the secret with AES-256-GCM under a fresh 96-bit IV. The
//! three values are stored base64-encoded in a [`WrappedKey`].
//!
//! Both directions run the full derivation; call them from a blocking
//! context.

use zeroize::Zeroizing;

use crate::crypto::{aes256_gcm_decrypt, aes256_gcm_encrypt, generate_random_bytes, IV_LEN};
use crate::derivation::{derive_key, DEFAULT_PBKDF2_ITERATIONS, MIN_PBKDF2_ITERATIONS, SALT_LEN};
use crate::error::VaultError;
use crate::primitives::{NormalizedPassword, Salt, WrappedKey};
use crate::utils::{b64_decode, b64_encode};

/// Bound into every ciphertext as associated data.
const WRAP_CONTEXT: &[u8] = b"clipmark/wallet-key/v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyVault {
    iterations: u32,
}

impl Default for KeyVault {
    fn default() -> Self {
        KeyVault {
            iterations: DEFAULT_PBKDF2_ITERATIONS,
        }
    }
}

impl KeyVault {
    pub fn new() -> KeyVault {
        KeyVault::default()
    }

    pub fn with_iterations(iterations: u32) -> Result<KeyVault, VaultError> {
        if iterations < MIN_PBKDF2_ITERATIONS {
            return Err(VaultError::WeakParameters(iterations, MIN_PBKDF2_ITERATIONS));
        }
        Ok(KeyVault { iterations })
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn wrap(&self, plaintext: &[u8], password: &str) -> Result<WrappedKey, VaultError> {
        let password = NormalizedPassword::new(password);
        let salt = Salt::generate();
        let iv: [u8; IV_LEN] = generate_random_bytes();

        let key = derive_key(&password, &salt, self.iterations);
        let ciphertext = aes256_gcm_encrypt(plaintext, &key, &iv, WRAP_CONTEXT)?;

        Ok(WrappedKey {
            salt: b64_encode(&salt.0),
            iv: b64_encode(&iv),
            ciphertext: b64_encode(&ciphertext),
        })
    }

    /// Reverses [`KeyVault::wrap`]. Every failure, including undecodable
    /// fields, is `VaultError::WrongPassword`.
    pub fn unwrap(
        &self,
        bundle: &WrappedKey,
        password: &str,
    ) -> Result<Zeroizing<Vec<u8>>, VaultError> {
        let password = NormalizedPassword::new(password);

        let decoded = (
            b64_decode(&bundle.salt),
            b64_decode(&bundle.iv),
            b64_decode(&bundle.ciphertext),
        );
        let (Ok(salt), Ok(iv), Ok(ciphertext)) = decoded else {
            // same derivation cost as a real attempt
            let _ = derive_key(&password, &Salt(vec![0u8; SALT_LEN]), self.iterations);
            return Err(VaultError::WrongPassword);
        };

        let key = derive_key(&password, &Salt(salt), self.iterations);

        aes256_gcm_decrypt(&ciphertext, &key, &iv, WRAP_CONTEXT)
    }

    /// Unwraps, hands the plaintext to `f`, and zeroizes it before returning,
    /// whatever `f` returns.
    pub fn with_unwrapped<T>(
        &self,
        bundle: &WrappedKey,
        password: &str,
        f: impl FnOnce(&[u8]) -> T,
    ) -> Result<T, VaultError> {
        let plaintext = self.unwrap(bundle, password)?;
        Ok(f(plaintext.as_slice()))
    }
}
