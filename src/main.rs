//! Bank ledger bootstrap.
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Create database connection pool
//! 3. Run database migrations
//! 4. Build the account service over the PostgreSQL store
//! 5. Report the stored accounts

use std::sync::Arc;

use bank_ledger::{
    config::Config,
    db,
    repository::PgAccountRepository,
    services::{AccountService, LedgerAccountService},
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG, defaulting to "info"
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env()?;
    tracing::info!("Configuration loaded");

    let pool = db::create_pool(&config.database_url, config.database_max_connections).await?;
    tracing::info!("Database pool created");

    db::run_migrations(&pool).await?;
    tracing::info!("Database migrations complete");

    let accounts = LedgerAccountService::new(Arc::new(PgAccountRepository::new(pool)));

    let stored = accounts.get_accounts().await?;
    tracing::info!(count = stored.len(), "Ledger ready");
    for account in &stored {
        tracing::info!(
            account_id = ?account.id,
            agreement_id = %account.agreement_id,
            number = %account.number,
            account_type = account.account_type,
            amount = %account.amount,
            "Account"
        );
    }

    Ok(())
}
