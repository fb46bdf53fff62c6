use std::fmt;

use chrono::{DateTime, Utc};
use shared::flows::{AccountView, VideoView};
use shared::primitives::WrappedKey;
use uuid::Uuid;

#[derive(sqlx::FromRow, Clone)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub credential_hash: String,
    pub wallet_address: String,
    pub wrapped_key: sqlx::types::Json<WrappedKey>,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn view(&self) -> AccountView {
        AccountView {
            id: self.id,
            email: self.email.clone(),
            username: self.username.clone(),
            wallet_address: self.wallet_address.clone(),
            created_at: self.created_at,
        }
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("wallet_address", &self.wallet_address)
            .finish_non_exhaustive()
    }
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq, Eq)]
pub struct Video {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub location_url: String,
    pub signature: String,
    /// Timestamp string exactly as it appeared in the signed message.
    pub signed_at: String,
    pub created_at: DateTime<Utc>,
}

impl Video {
    pub fn view(&self) -> VideoView {
        VideoView {
            id: self.id,
            owner_id: self.owner_id,
            title: self.title.clone(),
            location_url: self.location_url.clone(),
            signature: self.signature.clone(),
            signed_at: self.signed_at.clone(),
            created_at: self.created_at,
        }
    }
}
