//! Account service - per-account operations over the account store.
//!
//! This service handles:
//! - Opening accounts under an agreement
//! - Listing and looking up accounts
//! - Transfers between two account ids
//! - Charges (debits that decline softly on insufficient funds)
//!
//! # Persistence Guarantees
//!
//! There are none across accounts. A transfer persists the source and then
//! the destination with two independent saves. If the second save fails the
//! source stays debited with no matching credit; the failure is logged and
//! the store's error is returned unchanged. Hardening this (a transactional
//! boundary around both saves, or a compensating credit) belongs to the store
//! and must be added before running transfers concurrently.

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    error::AccountError,
    models::{
        account::{Account, NewAccount},
        agreement::Agreement,
    },
    repository::AccountRepository,
};

/// Per-account operations.
///
/// [`crate::services::payment_processor::PaymentProcessor`] depends on this
/// trait rather than on the store, so it persists through the same
/// `settle_transfer` path as id-based transfers.
#[async_trait]
pub trait AccountService: Send + Sync {
    /// Open an account under `agreement` and return what the store persisted.
    async fn add_account(
        &self,
        agreement: &Agreement,
        number: &str,
        account_type: i32,
        amount: Decimal,
    ) -> Result<Account, AccountError>;

    /// Every account, in store order.
    async fn get_accounts(&self) -> Result<Vec<Account>, AccountError>;

    /// Accounts belonging to `agreement`, in store order.
    async fn get_agreement_accounts(
        &self,
        agreement: &Agreement,
    ) -> Result<Vec<Account>, AccountError>;

    async fn find_account(&self, id: Uuid) -> Result<Option<Account>, AccountError>;

    /// Persist one account.
    async fn save_account(&self, account: &Account) -> Result<Account, AccountError>;

    /// Move `amount` from `source_id` to `destination_id`.
    ///
    /// # Errors
    ///
    /// - `NoSourceAccount`: source id not found (checked first)
    /// - `NoDestinationAccount`: destination id not found
    /// - any store error, unchanged
    async fn make_transfer(
        &self,
        source_id: Uuid,
        destination_id: Uuid,
        amount: Decimal,
    ) -> Result<(), AccountError>;

    /// Debit `amount` from one account if its balance covers it.
    ///
    /// Returns `Ok(false)` without touching the store when funds are short.
    /// Non-positive amounts are not validated: a negative charge credits the
    /// account.
    async fn charge(&self, account_id: Uuid, amount: Decimal) -> Result<bool, AccountError>;

    /// Debit `debit` from `source`, credit `credit` to `destination`, then
    /// save source and destination in that order.
    ///
    /// This is the persistence step shared by [`AccountService::make_transfer`]
    /// and [`crate::services::PaymentProcessor`], not an entry point: it does
    /// no lookup or funds check of its own. Both balances are computed before
    /// the first save, so `AmountOutOfRange` leaves the store untouched.
    ///
    /// When both sides are the same account the two movements are applied to
    /// one entity and it is saved once.
    #[doc(hidden)]
    async fn settle_transfer(
        &self,
        mut source: Account,
        mut destination: Account,
        debit: Decimal,
        credit: Decimal,
    ) -> Result<(), AccountError> {
        if source.id.is_some() && source.id == destination.id {
            source.debit(debit)?;
            source.credit(credit)?;
            self.save_account(&source).await?;
            return Ok(());
        }

        source.debit(debit)?;
        destination.credit(credit)?;

        self.save_account(&source).await?;
        if let Err(err) = self.save_account(&destination).await {
            tracing::error!(
                source_id = ?source.id,
                destination_id = ?destination.id,
                %debit,
                %credit,
                error = %err,
                "Source debited but destination credit not persisted"
            );
            return Err(err);
        }

        Ok(())
    }
}

/// [`AccountService`] backed by an [`AccountRepository`].
#[derive(Clone)]
pub struct LedgerAccountService {
    repository: Arc<dyn AccountRepository>,
}

impl LedgerAccountService {
    pub fn new(repository: Arc<dyn AccountRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl AccountService for LedgerAccountService {
    async fn add_account(
        &self,
        agreement: &Agreement,
        number: &str,
        account_type: i32,
        amount: Decimal,
    ) -> Result<Account, AccountError> {
        let account = Account::from(NewAccount {
            agreement_id: agreement.id,
            number: number.to_string(),
            account_type,
            amount,
        });

        let saved = self.repository.save(&account).await?;
        tracing::info!(
            account_id = ?saved.id,
            agreement_id = %agreement.id,
            account_type,
            "Account opened"
        );

        Ok(saved)
    }

    async fn get_accounts(&self) -> Result<Vec<Account>, AccountError> {
        self.repository.find_all().await
    }

    async fn get_agreement_accounts(
        &self,
        agreement: &Agreement,
    ) -> Result<Vec<Account>, AccountError> {
        self.repository.find_by_agreement_id(agreement.id).await
    }

    async fn find_account(&self, id: Uuid) -> Result<Option<Account>, AccountError> {
        self.repository.find_by_id(id).await
    }

    async fn save_account(&self, account: &Account) -> Result<Account, AccountError> {
        self.repository.save(account).await
    }

    async fn make_transfer(
        &self,
        source_id: Uuid,
        destination_id: Uuid,
        amount: Decimal,
    ) -> Result<(), AccountError> {
        // Source resolves before destination
        let source = self
            .repository
            .find_by_id(source_id)
            .await?
            .ok_or(AccountError::NoSourceAccount)?;
        let destination = self
            .repository
            .find_by_id(destination_id)
            .await?
            .ok_or(AccountError::NoDestinationAccount)?;

        self.settle_transfer(source, destination, amount, amount)
            .await?;

        tracing::info!(%source_id, %destination_id, %amount, "Transfer completed");
        Ok(())
    }

    async fn charge(&self, account_id: Uuid, amount: Decimal) -> Result<bool, AccountError> {
        let mut account = self
            .repository
            .find_by_id(account_id)
            .await?
            .ok_or(AccountError::NoSourceAccount)?;

        if !account.has_funds(amount) {
            tracing::warn!(%account_id, %amount, balance = %account.amount, "Charge declined");
            return Ok(false);
        }

        account.debit(amount)?;
        self.repository.save(&account).await?;

        tracing::info!(%account_id, %amount, "Account charged");
        Ok(true)
    }
}
