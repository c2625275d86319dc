//! PostgreSQL account store.
//!
//! Accounts are listed by their `seq` column so that store order is
//! insertion order.

use async_trait::async_trait;
use uuid::Uuid;

use super::AccountRepository;
use crate::{db::DbPool, error::AccountError, models::account::Account};

#[derive(Debug, Clone)]
pub struct PgAccountRepository {
    pool: DbPool,
}

impl PgAccountRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountRepository for PgAccountRepository {
    /// Upsert by id. A new account gets a fresh UUID before the insert.
    async fn save(&self, account: &Account) -> Result<Account, AccountError> {
        let id = account.id.unwrap_or_else(Uuid::new_v4);

        let saved = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (id, agreement_id, number, account_type, amount)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE
            SET agreement_id = EXCLUDED.agreement_id,
                number = EXCLUDED.number,
                account_type = EXCLUDED.account_type,
                amount = EXCLUDED.amount
            RETURNING id, agreement_id, number, account_type, amount
            "#,
        )
        .bind(id)
        .bind(account.agreement_id)
        .bind(&account.number)
        .bind(account.account_type)
        .bind(account.amount)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(account_id = %id, "Account saved");
        Ok(saved)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, AccountError> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, agreement_id, number, account_type, amount
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    async fn find_all(&self) -> Result<Vec<Account>, AccountError> {
        let accounts = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, agreement_id, number, account_type, amount
            FROM accounts
            ORDER BY seq
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(accounts)
    }

    async fn find_by_agreement_id(
        &self,
        agreement_id: Uuid,
    ) -> Result<Vec<Account>, AccountError> {
        let accounts = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, agreement_id, number, account_type, amount
            FROM accounts
            WHERE agreement_id = $1
            ORDER BY seq
            "#,
        )
        .bind(agreement_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(accounts)
    }
}
