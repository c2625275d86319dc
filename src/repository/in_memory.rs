//! In-memory account store.
//!
//! Keeps accounts in insertion order. Useful for tests and local runs.

use std::sync::RwLock;

use async_trait::async_trait;
use uuid::Uuid;

use super::AccountRepository;
use crate::{error::AccountError, models::account::Account};

#[derive(Debug, Default)]
pub struct InMemoryAccountRepository {
    accounts: RwLock<Vec<Account>>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with `accounts`, assigning ids where missing.
    pub fn with_accounts(accounts: impl IntoIterator<Item = Account>) -> Self {
        let accounts = accounts
            .into_iter()
            .map(|mut account| {
                if account.id.is_none() {
                    account.id = Some(Uuid::new_v4());
                }
                account
            })
            .collect();
        Self {
            accounts: RwLock::new(accounts),
        }
    }

    /// A writer panicked while holding the lock; the contents may be torn.
    fn poisoned() -> AccountError {
        AccountError::rejected("Account store lock poisoned")
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn save(&self, account: &Account) -> Result<Account, AccountError> {
        let mut accounts = self.accounts.write().map_err(|_| Self::poisoned())?;
        let mut stored = account.clone();
        let id = *stored.id.get_or_insert_with(Uuid::new_v4);

        match accounts.iter_mut().find(|a| a.id == Some(id)) {
            Some(existing) => *existing = stored.clone(),
            None => accounts.push(stored.clone()),
        }
        tracing::debug!(account_id = %id, "Account saved in memory");

        Ok(stored)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, AccountError> {
        let accounts = self.accounts.read().map_err(|_| Self::poisoned())?;
        Ok(accounts.iter().find(|a| a.id == Some(id)).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Account>, AccountError> {
        let accounts = self.accounts.read().map_err(|_| Self::poisoned())?;
        Ok(accounts.clone())
    }

    async fn find_by_agreement_id(
        &self,
        agreement_id: Uuid,
    ) -> Result<Vec<Account>, AccountError> {
        let accounts = self.accounts.read().map_err(|_| Self::poisoned())?;
        Ok(accounts
            .iter()
            .filter(|a| a.agreement_id == agreement_id)
            .cloned()
            .collect())
    }
}
