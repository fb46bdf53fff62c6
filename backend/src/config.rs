use std::net::SocketAddr;

use anyhow::{bail, Result};
use clap::Parser;
use shared::derivation::{DEFAULT_PBKDF2_ITERATIONS, MIN_PBKDF2_ITERATIONS};
use shared::token::{SessionTokens, DEFAULT_LIFETIME_DAYS, MIN_SECRET_LEN};
use shared::vault::KeyVault;

pub const MAX_TOKEN_LIFETIME_DAYS: i64 = 3650;

/// Custodial wallet service for signed video uploads.
///
/// No `Debug`: holds the token secret.
#[derive(Parser, Clone)]
#[command(name = "clipmark-backend")]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:3000")]
    pub listen: SocketAddr,

    /// SQLite connection URL
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://clipmark.db?mode=rwc")]
    pub database_url: String,

    /// HMAC secret for session tokens, at least 32 bytes
    #[arg(long, env = "TOKEN_SECRET", hide_env_values = true)]
    pub token_secret: String,

    /// Session token lifetime in days
    #[arg(long, env = "TOKEN_LIFETIME_DAYS", default_value_t = DEFAULT_LIFETIME_DAYS)]
    pub token_lifetime_days: i64,

    /// PBKDF2 iterations used to wrap wallet keys
    #[arg(long, env = "KDF_ITERATIONS", default_value_t = DEFAULT_PBKDF2_ITERATIONS)]
    pub kdf_iterations: u32,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Args {
    pub fn validate(&self) -> Result<()> {
        if self.token_secret.len() < MIN_SECRET_LEN {
            bail!("TOKEN_SECRET must be at least {MIN_SECRET_LEN} bytes");
        }
        if !(1..=MAX_TOKEN_LIFETIME_DAYS).contains(&self.token_lifetime_days) {
            bail!("TOKEN_LIFETIME_DAYS must be between 1 and {MAX_TOKEN_LIFETIME_DAYS}");
        }
        if self.kdf_iterations < MIN_PBKDF2_ITERATIONS {
            bail!("KDF_ITERATIONS must be at least {MIN_PBKDF2_ITERATIONS}");
        }
        Ok(())
    }

    pub fn key_vault(&self) -> Result<KeyVault> {
        Ok(KeyVault::with_iterations(self.kdf_iterations)?)
    }

    pub fn session_tokens(&self) -> Result<SessionTokens> {
        Ok(SessionTokens::new(
            self.token_secret.as_bytes(),
            chrono::Duration::days(self.token_lifetime_days),
        )?)
    }
}
