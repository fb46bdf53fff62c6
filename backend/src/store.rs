use std::str::FromStr;

use shared::primitives::NormalizedEmail;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{Account, Video};

/// Account and video rows. Email and wallet uniqueness and the video owner
/// foreign key are enforced by the schema, not by callers.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    pub fn new(pool: SqlitePool) -> Store {
        Store { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Store, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        // every connection to `:memory:` would otherwise get its own database
        let max_connections = if database_url.contains(":memory:") { 1 } else { 8 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Ok(Store::new(pool))
    }

    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            "
            CREATE TABLE IF NOT EXISTS accounts (
                id BLOB PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                username TEXT NOT NULL,
                credential_hash TEXT NOT NULL,
                wallet_address TEXT NOT NULL UNIQUE,
                wrapped_key TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
        ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "
            CREATE TABLE IF NOT EXISTS videos (
                id BLOB PRIMARY KEY,
                owner_id BLOB NOT NULL REFERENCES accounts(id),
                title TEXT NOT NULL,
                location_url TEXT NOT NULL,
                signature TEXT NOT NULL,
                signed_at TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
        ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS videos_owner_id ON videos (owner_id);")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn find_account_by_email(
        &self,
        email: &NormalizedEmail,
    ) -> Result<Option<Account>, ApiError> {
        let account = sqlx::query_as::<_, Account>(
            "
            SELECT *
            FROM accounts
            WHERE email = $1
        ",
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    pub async fn find_account_by_id(&self, id: Uuid) -> Result<Option<Account>, ApiError> {
        let account = sqlx::query_as::<_, Account>(
            "
            SELECT *
            FROM accounts
            WHERE id = $1
        ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    /// A uniqueness violation surfaces as `EmailTaken`; this is what
    /// serializes concurrent registrations of the same address.
    pub async fn insert_account(&self, account: &Account) -> Result<(), ApiError> {
        let result = sqlx::query(
            "
            INSERT INTO accounts
            (id, email, username, credential_hash, wallet_address, wrapped_key, created_at)
            VALUES
            ($1, $2, $3, $4, $5, $6, $7)
        ",
        )
        .bind(account.id)
        .bind(&account.email)
        .bind(&account.username)
        .bind(&account.credential_hash)
        .bind(&account.wallet_address)
        .bind(&account.wrapped_key)
        .bind(account.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(ApiError::EmailTaken),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn insert_video(&self, video: &Video) -> Result<(), ApiError> {
        sqlx::query(
            "
            INSERT INTO videos
            (id, owner_id, title, location_url, signature, signed_at, created_at)
            VALUES
            ($1, $2, $3, $4, $5, $6, $7)
        ",
        )
        .bind(video.id)
        .bind(video.owner_id)
        .bind(&video.title)
        .bind(&video.location_url)
        .bind(&video.signature)
        .bind(&video.signed_at)
        .bind(video.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn find_video_by_id(&self, id: Uuid) -> Result<Option<Video>, ApiError> {
        let video = sqlx::query_as::<_, Video>(
            "
            SELECT *
            FROM videos
            WHERE id = $1
        ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(video)
    }

    /// Newest first.
    pub async fn list_videos_by_owner(&self, owner_id: Uuid) -> Result<Vec<Video>, ApiError> {
        let videos = sqlx::query_as::<_, Video>(
            "
            SELECT *
            FROM videos
            WHERE owner_id = $1
            ORDER BY created_at DESC
        ",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(videos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use shared::primitives::WrappedKey;

    async fn store() -> Store {
        let store = Store::connect("sqlite::memory:").await.unwrap();
        store.run_migrations().await.unwrap();
        store
    }

    fn account(email: &str, wallet_address: &str) -> Account {
        Account {
            id: Uuid::now_v7(),
            email: email.to_string(),
            username: wallet_address.to_string(),
            credential_hash: "$argon2id$placeholder".to_string(),
            wallet_address: wallet_address.to_string(),
            wrapped_key: sqlx::types::Json(WrappedKey {
                salt: "c2FsdA==".into(),
                iv: "aXY=".into(),
                ciphertext: "Y3Q=".into(),
            }),
            created_at: Utc::now(),
        }
    }

    fn video(owner_id: Uuid, title: &str) -> Video {
        Video {
            id: Uuid::now_v7(),
            owner_id,
            title: title.to_string(),
            location_url: "https://cdn/v1.mp4".to_string(),
            signature: "0x00".to_string(),
            signed_at: "2024-01-01T00:00:00.000Z".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn account_roundtrip() {
        let store = store().await;
        let account = account("a@x.com", "0x01");
        store.insert_account(&account).await.unwrap();

        let by_email = store
            .find_account_by_email(&NormalizedEmail::new("A@X.com"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_email.id, account.id);
        assert_eq!(by_email.wrapped_key.0, account.wrapped_key.0);

        let by_id = store.find_account_by_id(account.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, "a@x.com");

        assert!(store.find_account_by_id(Uuid::now_v7()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_email_is_email_taken() {
        let store = store().await;
        store.insert_account(&account("a@x.com", "0x01")).await.unwrap();

        let err = store
            .insert_account(&account("a@x.com", "0x02"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::EmailTaken));
    }

    #[tokio::test]
    async fn videos_list_newest_first() {
        let store = store().await;
        let owner = account("a@x.com", "0x01");
        store.insert_account(&owner).await.unwrap();

        let mut first = video(owner.id, "first");
        first.created_at = Utc::now() - chrono::Duration::seconds(5);
        let second = video(owner.id, "second");
        store.insert_video(&first).await.unwrap();
        store.insert_video(&second).await.unwrap();

        let listed: Vec<Uuid> = store
            .list_videos_by_owner(owner.id)
            .await
            .unwrap()
            .iter()
            .map(|v| v.id)
            .collect();
        assert_eq!(listed, vec![second.id, first.id]);

        let found = store.find_video_by_id(second.id).await.unwrap().unwrap();
        assert_eq!(found.signed_at, "2024-01-01T00:00:00.000Z");
    }

    #[tokio::test]
    async fn video_requires_existing_owner() {
        let store = store().await;
        let err = store
            .insert_video(&video(Uuid::now_v7(), "orphan"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Persistence(_)));
    }
}
