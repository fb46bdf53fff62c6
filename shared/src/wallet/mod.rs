//! secp256k1 wallets: EIP-55 addresses, EIP-191 personal-message
//! signatures (deterministic, RFC 6979).

use std::fmt;

use alloy_primitives::{Address, Signature};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use zeroize::{Zeroize, Zeroizing};

use crate::error::WalletError;
use crate::utils::{hex_prefixed, strip_hex_prefix};

pub const PRIVATE_KEY_LEN: usize = 32;

/// Raw secp256k1 scalar, wiped on drop.
pub struct PrivateKey(Zeroizing<[u8; PRIVATE_KEY_LEN]>);

impl PrivateKey {
    pub fn from_bytes(bytes: &[u8]) -> Result<PrivateKey, WalletError> {
        if bytes.len() != PRIVATE_KEY_LEN {
            return Err(WalletError::InvalidKey);
        }
        let mut key = Zeroizing::new([0u8; PRIVATE_KEY_LEN]);
        key.copy_from_slice(bytes);
        let key = PrivateKey(key);
        // rejects zero and values >= the curve order
        key.signer()?;
        Ok(key)
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_slice()
    }

    fn signer(&self) -> Result<PrivateKeySigner, WalletError> {
        PrivateKeySigner::from_slice(self.0.as_slice()).map_err(|_| WalletError::InvalidKey)
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey([REDACTED])")
    }
}

#[derive(Debug)]
pub struct GeneratedWallet {
    pub address: String,
    pub private_key: PrivateKey,
}

pub fn generate() -> GeneratedWallet {
    let signer = PrivateKeySigner::random();

    let mut raw = signer.to_bytes();
    let mut key = Zeroizing::new([0u8; PRIVATE_KEY_LEN]);
    key.copy_from_slice(raw.as_slice());
    raw.0.zeroize();

    GeneratedWallet {
        address: signer.address().to_checksum(None),
        private_key: PrivateKey(key),
    }
}

pub fn derive_address(private_key: &PrivateKey) -> Result<String, WalletError> {
    Ok(private_key.signer()?.address().to_checksum(None))
}

/// EIP-191 signature over `message`, as `0x` + 130 hex chars (r, s, v).
pub fn sign(private_key: &PrivateKey, message: &str) -> Result<String, WalletError> {
    let signature = private_key
        .signer()?
        .sign_message_sync(message.as_bytes())
        .map_err(|e| WalletError::Signing(e.to_string()))?;

    Ok(hex_prefixed(&signature.as_bytes()))
}

/// Recovers the signer of `message` and compares it with `address`.
/// Malformed addresses or signatures verify as `false`.
pub fn verify(address: &str, message: &str, signature: &str) -> bool {
    let Ok(expected) = parse_address(address) else {
        return false;
    };
    let Ok(bytes) = hex::decode(strip_hex_prefix(signature)) else {
        return false;
    };
    let Ok(signature) = Signature::from_raw(&bytes) else {
        return false;
    };

    signature
        .recover_address_from_msg(message.as_bytes())
        .map(|recovered| recovered == expected)
        .unwrap_or(false)
}

pub fn parse_address(address: &str) -> Result<Address, WalletError> {
    address
        .parse::<Address>()
        .map_err(|e| WalletError::InvalidAddress(e.to_string()))
}

/// Case-insensitive address equality.
pub fn same_address(a: &str, b: &str) -> Result<bool, WalletError> {
    Ok(parse_address(a)? == parse_address(b)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KNOWN_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const KNOWN_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    fn known_key() -> PrivateKey {
        PrivateKey::from_bytes(&hex::decode(KNOWN_KEY).unwrap()).unwrap()
    }

    fn is_address_shaped(address: &str) -> bool {
        address.len() == 42
            && address.starts_with("0x")
            && address[2..].chars().all(|c| c.is_ascii_hexdigit())
    }

    #[test]
    fn generated_address_matches_derived() {
        for _ in 0..8 {
            let wallet = generate();
            assert!(is_address_shaped(&wallet.address));
            assert_eq!(derive_address(&wallet.private_key).unwrap(), wallet.address);
        }
    }

    #[test]
    fn generated_keys_differ() {
        let a = generate();
        let b = generate();
        assert_ne!(a.private_key.as_bytes(), b.private_key.as_bytes());
        assert_ne!(a.address, b.address);
    }

    #[test]
    fn known_key_derives_known_checksummed_address() {
        assert_eq!(derive_address(&known_key()).unwrap(), KNOWN_ADDRESS);
    }

    #[test]
    fn sign_then_verify() {
        let wallet = generate();
        let message = "Video Upload: https://cdn/v1.mp4\nTitle: My Clip\nTimestamp: 2024-01-01T00:00:00.000Z";

        let signature = sign(&wallet.private_key, message).unwrap();
        assert!(signature.starts_with("0x"));
        assert_eq!(signature.len(), 2 + 130);

        assert!(verify(&wallet.address, message, &signature));
        assert!(verify(&wallet.address.to_lowercase(), message, &signature));
        assert!(!verify(&wallet.address, "Video Upload: other", &signature));
        assert!(!verify(&generate().address, message, &signature));
    }

    #[test]
    fn signing_is_deterministic() {
        let key = known_key();
        assert_eq!(sign(&key, "hello").unwrap(), sign(&key, "hello").unwrap());
        assert_ne!(sign(&key, "hello").unwrap(), sign(&key, "hello!").unwrap());
    }

    #[test]
    fn malformed_inputs_do_not_verify() {
        let key = known_key();
        let signature = sign(&key, "hello").unwrap();

        assert!(!verify("not-an-address", "hello", &signature));
        assert!(!verify(KNOWN_ADDRESS, "hello", "0xzz"));
        assert!(!verify(KNOWN_ADDRESS, "hello", &signature[..64]));
    }

    #[test]
    fn malformed_key_material_is_rejected() {
        assert_eq!(
            PrivateKey::from_bytes(&[1u8; 31]).unwrap_err(),
            WalletError::InvalidKey
        );
        assert_eq!(
            PrivateKey::from_bytes(&[0u8; 32]).unwrap_err(),
            WalletError::InvalidKey
        );
        assert_eq!(
            PrivateKey::from_bytes(&[0xffu8; 32]).unwrap_err(),
            WalletError::InvalidKey
        );
    }

    #[test]
    fn address_comparison_ignores_case() {
        assert!(same_address(KNOWN_ADDRESS, &KNOWN_ADDRESS.to_lowercase()).unwrap());
        assert!(!same_address(KNOWN_ADDRESS, &generate().address).unwrap());
        assert!(same_address(KNOWN_ADDRESS, "0x1234").is_err());
    }

    #[test]
    fn private_key_debug_is_redacted() {
        assert_eq!(format!("{:?}", known_key()), "PrivateKey([REDACTED])");
    }
}
