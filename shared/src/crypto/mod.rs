use aes_gcm::{
    aead::{Aead, KeyInit, Payload},
    Aes256Gcm, Key, Nonce,
};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

use crate::error::VaultError;

pub const IV_LEN: usize = 12;
pub const TAG_LEN: usize = 16;

pub fn generate_random_bytes<const N: usize>() -> [u8; N] {
    let mut bytes = [0u8; N];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

pub fn aes256_gcm_encrypt(
    plaintext: &[u8],
    key: &[u8; 32],
    iv: &[u8; IV_LEN],
    additional_data: &[u8],
) -> Result<Vec<u8>, VaultError> {
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));

    let payload = Payload {
        msg: plaintext,
        aad: additional_data,
    };

    cipher
        .encrypt(Nonce::from_slice(iv), payload)
        .map_err(|_| VaultError::Encryption)
}

/// Any tag failure or malformed nonce is reported as `WrongPassword`.
pub fn aes256_gcm_decrypt(
    ciphertext: &[u8],
    key: &[u8; 32],
    iv: &[u8],
    additional_data: &[u8],
) -> Result<Zeroizing<Vec<u8>>, VaultError> {
    if iv.len() != IV_LEN || ciphertext.len() < TAG_LEN {
        return Err(VaultError::WrongPassword);
    }

    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key));

    let payload = Payload {
        msg: ciphertext,
        aad: additional_data,
    };

    cipher
        .decrypt(Nonce::from_slice(iv), payload)
        .map(Zeroizing::new)
        .map_err(|_| VaultError::WrongPassword)
}
