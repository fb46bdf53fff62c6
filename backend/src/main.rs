use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod config;
mod custody;
mod error;
mod models;
mod store;

use config::Args;
use custody::Custody;
use store::Store;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            format!(
                "clipmark_backend={level},tower_http={level},info",
                level = args.log_level
            )
            .into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    args.validate()?;

    let store = Store::connect(&args.database_url)
        .await
        .with_context(|| format!("failed to open database {}", args.database_url))?;
    store
        .run_migrations()
        .await
        .context("failed to run migrations")?;

    let custody = Custody::new(store, args.key_vault()?, args.session_tokens()?);
    let app = api::router(Arc::new(custody));

    let listener = tokio::net::TcpListener::bind(args.listen)
        .await
        .with_context(|| format!("failed to bind {}", args.listen))?;

    info!(
        listen = %args.listen,
        kdf_iterations = args.kdf_iterations,
        token_lifetime_days = args.token_lifetime_days,
        "clipmark backend listening"
    );

    axum::serve(listener, app).await?;

    Ok(())
}
