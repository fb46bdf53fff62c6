use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::primitives::{NormalizedPassword, Salt};

pub const SALT_LEN: usize = 32;
pub const DERIVED_KEY_LEN: usize = 32;

/// Floor for the PBKDF2 work factor.
pub const MIN_PBKDF2_ITERATIONS: u32 = 100_000;

pub const DEFAULT_PBKDF2_ITERATIONS: u32 = 650_000;

impl Salt {
    pub fn generate() -> Salt {
        let mut salt = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);
        Salt(salt.to_vec())
    }
}

/// PBKDF2-HMAC-SHA256 of the normalized password.
pub fn derive_key(
    password: &NormalizedPassword,
    salt: &Salt,
    iterations: u32,
) -> Zeroizing<[u8; DERIVED_KEY_LEN]> {
    let mut key = Zeroizing::new([0u8; DERIVED_KEY_LEN]);
    pbkdf2_hmac::<Sha256>(
        password.0.as_slice(),
        salt.0.as_slice(),
        iterations,
        key.as_mut(),
    );
    key
}
