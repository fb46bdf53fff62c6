//! Custody core: password-wrapped wallet keys, wallet signing and session
//! tokens. Nothing in this crate touches persistence.

pub mod credential;
pub mod crypto;
pub mod derivation;
pub mod error;
pub mod flows;
pub mod primitives;
pub mod token;
pub mod utils;
pub mod vault;
pub mod wallet;

pub use error::{CredentialError, RegistrationError, SigningError, TokenError, VaultError, WalletError};
pub use primitives::{NormalizedEmail, WrappedKey};
pub use token::{Claims, SessionTokens};
pub use vault::KeyVault;
