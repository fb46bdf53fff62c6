use std::fmt;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::TokenError;

pub const MIN_SECRET_LEN: usize = 32;
pub const DEFAULT_LIFETIME_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Account id
    pub sub: String,
    pub wallet_address: String,
    pub iat: i64,
    pub exp: i64,
}

/// HS256 JWTs asserting `(account id, wallet address)`. Stateless: a token
/// is good until `exp`.
#[derive(Clone)]
pub struct SessionTokens {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime: Duration,
}

impl fmt::Debug for SessionTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionTokens")
            .field("lifetime", &self.lifetime)
            .finish_non_exhaustive()
    }
}

impl SessionTokens {
    pub fn new(secret: &[u8], lifetime: Duration) -> Result<SessionTokens, TokenError> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(TokenError::WeakSecret(MIN_SECRET_LEN));
        }

        Ok(SessionTokens {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            lifetime,
        })
    }

    pub fn with_default_lifetime(secret: &[u8]) -> Result<SessionTokens, TokenError> {
        SessionTokens::new(secret, Duration::days(DEFAULT_LIFETIME_DAYS))
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    pub fn issue(&self, subject_id: &str, wallet_address: &str) -> Result<String, TokenError> {
        self.issue_at(subject_id, wallet_address, Utc::now())
    }

    pub fn issue_at(
        &self,
        subject_id: &str,
        wallet_address: &str,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = Claims {
            sub: subject_id.to_string(),
            wallet_address: wallet_address.to_string(),
            iat: now.timestamp(),
            exp: now
                .checked_add_signed(self.lifetime)
                .ok_or_else(|| TokenError::Issue("token lifetime out of range".into()))?
                .timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Issue(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// MAC first, then `exp > now`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "iat", "exp"]);

        let claims = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|_| TokenError::InvalidToken)?
            .claims;

        if claims.exp <= now.timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

/// Accepts `Bearer <token>`; anything else yields `None`.
pub fn extract_bearer_token(header: Option<&str>) -> Option<&str> {
    let token = header?.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}
