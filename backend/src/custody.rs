use chrono::Utc;
use shared::credential::{
    check_password_policy, verify_password, verify_password_for_unknown_account,
};
use shared::error::SigningError;
use shared::flows::{
    canonical_message, generate_registration_material, sign_with_custodial_key,
    signing_timestamp, VideoVerification,
};
use shared::primitives::NormalizedEmail;
use shared::token::{Claims, SessionTokens};
use shared::vault::KeyVault;
use shared::wallet;
use tokio::task;
use tracing::{error, info, warn};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::error::ApiError;
use crate::models::{Account, Video};
use crate::store::Store;

/// The password is supplied again on every signing request; decrypted key
/// material never outlives the blocking task that uses it.
pub struct Custody {
    store: Store,
    vault: KeyVault,
    tokens: SessionTokens,
}

impl Custody {
    pub fn new(store: Store, vault: KeyVault, tokens: SessionTokens) -> Custody {
        Custody {
            store,
            vault,
            tokens,
        }
    }

    pub async fn register(&self, email: &str, password: &str) -> Result<Account, ApiError> {
        let email = NormalizedEmail::parse(email)
            .ok_or_else(|| ApiError::Validation("invalid email address".into()))?;
        check_password_policy(password)?;

        if self.store.find_account_by_email(&email).await?.is_some() {
            warn!(%email, "registration rejected: email taken");
            return Err(ApiError::EmailTaken);
        }

        let vault = self.vault;
        let password = Zeroizing::new(password.to_owned());
        let material = task::spawn_blocking(move || generate_registration_material(&vault, &password))
            .await
            .map_err(|e| ApiError::Internal(format!("registration task failed: {e}")))??;

        let account = Account {
            id: Uuid::now_v7(),
            email: email.0,
            username: material.wallet_address.clone(),
            credential_hash: material.credential_hash,
            wallet_address: material.wallet_address,
            wrapped_key: sqlx::types::Json(material.wrapped_key),
            created_at: Utc::now(),
        };

        self.store.insert_account(&account).await?;

        info!(
            account_id = %account.id,
            wallet_address = %account.wallet_address,
            "registered account"
        );

        Ok(account)
    }

    /// Returns a session token and the account. Unknown email and bad
    /// password are indistinguishable.
    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(String, Account), ApiError> {
        let email = NormalizedEmail::new(email);
        let account = match self.store.find_account_by_email(&email).await? {
            Some(account) => account,
            None => {
                let password = Zeroizing::new(password.to_owned());
                task::spawn_blocking(move || verify_password_for_unknown_account(&password))
                    .await
                    .map_err(|e| ApiError::Internal(format!("login task failed: {e}")))?;
                warn!(%email, "login failed: unknown email");
                return Err(ApiError::InvalidCredentials);
            }
        };

        let hash = account.credential_hash.clone();
        let password = Zeroizing::new(password.to_owned());
        let valid = task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| ApiError::Internal(format!("login task failed: {e}")))??;

        if !valid {
            warn!(account_id = %account.id, "login failed: bad password");
            return Err(ApiError::InvalidCredentials);
        }

        let token = self
            .tokens
            .issue(&account.id.to_string(), &account.wallet_address)?;

        info!(account_id = %account.id, "issued session token");

        Ok((token, account))
    }

    /// Resolves a bearer token to its account.
    pub async fn authorize(&self, token: &str) -> Result<(Claims, Account), ApiError> {
        let claims = self.tokens.verify(token).map_err(|e| {
            warn!(reason = %e, "rejected session token");
            ApiError::Unauthenticated
        })?;

        let account_id = Uuid::parse_str(&claims.sub).map_err(|_| {
            warn!("rejected session token: malformed subject");
            ApiError::Unauthenticated
        })?;

        let account = self.store.find_account_by_id(account_id).await?.ok_or_else(|| {
            warn!(%account_id, "rejected session token: unknown account");
            ApiError::Unauthenticated
        })?;

        Ok((claims, account))
    }

    /// Signs `"Video Upload: <url>\nTitle: <title>\nTimestamp: <signed_at>"`
    /// with the caller's custodial key and stores the video with the exact
    /// timestamp that was signed.
    pub async fn record_video(
        &self,
        token: &str,
        location_url: &str,
        title: &str,
        password: &str,
    ) -> Result<Video, ApiError> {
        let (_, account) = self.authorize(token).await?;

        if location_url.trim().is_empty() {
            return Err(ApiError::Validation("location_url is required".into()));
        }
        if title.trim().is_empty() {
            return Err(ApiError::Validation("title is required".into()));
        }

        let signed_at = signing_timestamp(Utc::now());
        let message = canonical_message(location_url, title, &signed_at);

        let vault = self.vault;
        let wrapped_key = account.wrapped_key.0.clone();
        let wallet_address = account.wallet_address.clone();
        let password = Zeroizing::new(password.to_owned());
        let signed = task::spawn_blocking(move || {
            sign_with_custodial_key(&vault, &wrapped_key, &password, &wallet_address, &message)
        })
        .await
        .map_err(|e| ApiError::Internal(format!("signing task failed: {e}")))?;

        let signature = match signed {
            Ok(signature) => signature,
            Err(SigningError::WrongPassword) => {
                warn!(account_id = %account.id, "signing refused: wrong password");
                return Err(ApiError::WrongPassword);
            }
            Err(SigningError::AddressMismatch) => {
                error!(
                    account_id = %account.id,
                    wallet_address = %account.wallet_address,
                    "unwrapped key does not derive the stored wallet address; stored key material may be corrupt"
                );
                return Err(ApiError::AddressMismatch);
            }
            Err(SigningError::Wallet(e)) => {
                return Err(ApiError::Internal(format!(
                    "custodial key for account {} unusable: {e}",
                    account.id
                )));
            }
        };

        let video = Video {
            id: Uuid::now_v7(),
            owner_id: account.id,
            title: title.to_string(),
            location_url: location_url.to_string(),
            signature,
            signed_at,
            created_at: Utc::now(),
        };

        self.store.insert_video(&video).await?;

        info!(
            video_id = %video.id,
            account_id = %account.id,
            "recorded signed video"
        );

        Ok(video)
    }

    pub async fn list_videos(&self, token: &str) -> Result<Vec<Video>, ApiError> {
        let (_, account) = self.authorize(token).await?;
        self.store.list_videos_by_owner(account.id).await
    }

    /// Rebuilds the signed message from the stored row and checks the
    /// signature against the owner's wallet address.
    pub async fn verify_video(&self, video_id: Uuid) -> Result<VideoVerification, ApiError> {
        let video = self
            .store
            .find_video_by_id(video_id)
            .await?
            .ok_or(ApiError::NotFound)?;

        let owner = self
            .store
            .find_account_by_id(video.owner_id)
            .await?
            .ok_or_else(|| ApiError::Internal(format!("video {} has no owner", video.id)))?;

        let message = canonical_message(&video.location_url, &video.title, &video.signed_at);
        let valid = wallet::verify(&owner.wallet_address, &message, &video.signature);

        if !valid {
            error!(video_id = %video.id, "stored video signature does not verify");
        }

        Ok(VideoVerification {
            video_id: video.id,
            wallet_address: owner.wallet_address,
            message,
            valid,
        })
    }
}
