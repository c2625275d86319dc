//! Payment processor - transfers addressed by agreement and account type.
//!
//! Each side of a transfer is given as an agreement plus an account type
//! code. The processor resolves both to concrete accounts through the
//! [`AccountService`], then hands the balance movement and persistence back
//! to the service's `settle_transfer` step.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::{
    error::AccountError,
    models::{
        account::{Account, exact_sum},
        agreement::Agreement,
    },
    services::account_service::AccountService,
};

/// Pick the first account of `account_type`, in the order given.
pub fn select_by_type(accounts: Vec<Account>, account_type: i32) -> Option<Account> {
    accounts
        .into_iter()
        .find(|account| account.account_type == account_type)
}

#[derive(Clone)]
pub struct PaymentProcessor {
    account_service: Arc<dyn AccountService>,
}

impl PaymentProcessor {
    pub fn new(account_service: Arc<dyn AccountService>) -> Self {
        Self { account_service }
    }

    /// Move `amount` between the accounts of the given types under two agreements.
    ///
    /// # Errors
    ///
    /// - `AccountNotFound`: source agreement has no account of `source_type`
    /// - `DestinationAccountNotFound`: destination agreement has no account
    ///   of `destination_type`
    /// - any error raised by the account lookup itself, unchanged
    pub async fn make_transfer(
        &self,
        source_agreement: &Agreement,
        destination_agreement: &Agreement,
        source_type: i32,
        destination_type: i32,
        amount: Decimal,
    ) -> Result<(), AccountError> {
        self.transfer(
            source_agreement,
            destination_agreement,
            source_type,
            destination_type,
            amount,
            Decimal::ZERO,
        )
        .await
    }

    /// Like [`PaymentProcessor::make_transfer`], but debits
    /// `amount + commission` from the source while crediting only `amount`.
    ///
    /// The commission is not credited to any account.
    pub async fn make_transfer_with_commission(
        &self,
        source_agreement: &Agreement,
        destination_agreement: &Agreement,
        source_type: i32,
        destination_type: i32,
        amount: Decimal,
        commission: Decimal,
    ) -> Result<(), AccountError> {
        self.transfer(
            source_agreement,
            destination_agreement,
            source_type,
            destination_type,
            amount,
            commission,
        )
        .await
    }

    async fn transfer(
        &self,
        source_agreement: &Agreement,
        destination_agreement: &Agreement,
        source_type: i32,
        destination_type: i32,
        amount: Decimal,
        commission: Decimal,
    ) -> Result<(), AccountError> {
        let source = self
            .resolve(source_agreement, source_type)
            .await?
            .ok_or(AccountError::AccountNotFound)?;
        let destination = self
            .resolve(destination_agreement, destination_type)
            .await?
            .ok_or(AccountError::DestinationAccountNotFound)?;

        let debit = exact_sum(amount, commission)?;
        let (source_id, destination_id) = (source.id, destination.id);
        self.account_service
            .settle_transfer(source, destination, debit, amount)
            .await?;

        tracing::info!(
            source_agreement = %source_agreement.id,
            destination_agreement = %destination_agreement.id,
            source_id = ?source_id,
            destination_id = ?destination_id,
            %amount,
            %commission,
            "Agreement transfer completed"
        );
        Ok(())
    }

    async fn resolve(
        &self,
        agreement: &Agreement,
        account_type: i32,
    ) -> Result<Option<Account>, AccountError> {
        let accounts = self
            .account_service
            .get_agreement_accounts(agreement)
            .await?;
        let account = select_by_type(accounts, account_type);

        if account.is_none() {
            tracing::warn!(agreement_id = %agreement.id, account_type, "No account of requested type");
        }
        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;
    use uuid::Uuid;

    /// Account service double with canned per-agreement listings.
    #[derive(Default)]
    struct FakeAccountService {
        by_agreement: HashMap<Uuid, Vec<Account>>,
        failing_agreements: HashMap<Uuid, String>,
        failing_saves: HashSet<Uuid>,
        saved: Mutex<Vec<Account>>,
        listed: Mutex<Vec<Uuid>>,
    }

    impl FakeAccountService {
        fn saved(&self) -> Vec<Account> {
            self.saved.lock().unwrap().clone()
        }

        fn listed(&self) -> Vec<Uuid> {
            self.listed.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AccountService for FakeAccountService {
        async fn add_account(
            &self,
            _agreement: &Agreement,
            _number: &str,
            _account_type: i32,
            _amount: Decimal,
        ) -> Result<Account, AccountError> {
            Err(AccountError::rejected("not used"))
        }

        async fn get_accounts(&self) -> Result<Vec<Account>, AccountError> {
            Ok(self.by_agreement.values().flatten().cloned().collect())
        }

        async fn get_agreement_accounts(
            &self,
            agreement: &Agreement,
        ) -> Result<Vec<Account>, AccountError> {
            self.listed.lock().unwrap().push(agreement.id);
            if let Some(message) = self.failing_agreements.get(&agreement.id) {
                return Err(AccountError::rejected(message.clone()));
            }
            Ok(self
                .by_agreement
                .get(&agreement.id)
                .cloned()
                .unwrap_or_default())
        }

        async fn find_account(&self, _id: Uuid) -> Result<Option<Account>, AccountError> {
            Ok(None)
        }

        async fn save_account(&self, account: &Account) -> Result<Account, AccountError> {
            if account.id.is_some_and(|id| self.failing_saves.contains(&id)) {
                return Err(AccountError::rejected("save failed"));
            }
            self.saved.lock().unwrap().push(account.clone());
            Ok(account.clone())
        }

        async fn make_transfer(
            &self,
            _source_id: Uuid,
            _destination_id: Uuid,
            _amount: Decimal,
        ) -> Result<(), AccountError> {
            Err(AccountError::rejected("not used"))
        }

        async fn charge(&self, _account_id: Uuid, _amount: Decimal) -> Result<bool, AccountError> {
            Err(AccountError::rejected("not used"))
        }
    }

    fn account(agreement: &Agreement, account_type: i32, amount: Decimal) -> Account {
        Account {
            id: Some(Uuid::new_v4()),
            amount,
            account_type,
            agreement_id: agreement.id,
            number: format!("{account_type}"),
        }
    }

    fn agreements() -> (Agreement, Agreement) {
        (
            Agreement::new(Uuid::new_v4(), "Source"),
            Agreement::new(Uuid::new_v4(), "Destination"),
        )
    }

    fn processor(service: &Arc<FakeAccountService>) -> PaymentProcessor {
        PaymentProcessor::new(service.clone())
    }

    #[test]
    fn select_by_type_takes_first_match() {
        let agreement = Agreement::new(Uuid::new_v4(), "A");
        let savings = account(&agreement, 1, dec!(1));
        let first_checking = account(&agreement, 0, dec!(2));
        let second_checking = account(&agreement, 0, dec!(3));

        let picked = select_by_type(
            vec![savings, first_checking.clone(), second_checking],
            0,
        );
        assert_eq!(picked, Some(first_checking));
    }

    #[test]
    fn select_by_type_without_match_is_none() {
        let agreement = Agreement::new(Uuid::new_v4(), "A");
        assert_eq!(select_by_type(vec![], 0), None);
        assert_eq!(select_by_type(vec![account(&agreement, 1, dec!(1))], 0), None);
    }

    #[tokio::test]
    async fn transfer_moves_amount_between_agreements() {
        let (src, dst) = agreements();
        let source = account(&src, 0, dec!(10));
        let destination = account(&dst, 0, dec!(0));
        let mut fake = FakeAccountService::default();
        fake.by_agreement.insert(src.id, vec![source.clone()]);
        fake.by_agreement.insert(dst.id, vec![destination.clone()]);
        let fake = Arc::new(fake);

        processor(&fake)
            .make_transfer(&src, &dst, 0, 0, dec!(1))
            .await
            .unwrap();

        let saved = fake.saved();
        assert_eq!(saved.len(), 2);
        assert_eq!(saved[0].id, source.id);
        assert_eq!(saved[0].amount, dec!(9));
        assert_eq!(saved[1].id, destination.id);
        assert_eq!(saved[1].amount, dec!(1));
        assert_eq!(fake.listed(), vec![src.id, dst.id]);
    }

    #[tokio::test]
    async fn transfer_uses_requested_types() {
        let (src, dst) = agreements();
        let source_savings = account(&src, 1, dec!(50));
        let destination_savings = account(&dst, 1, dec!(5));
        let mut fake = FakeAccountService::default();
        fake.by_agreement
            .insert(src.id, vec![account(&src, 0, dec!(100)), source_savings.clone()]);
        fake.by_agreement.insert(
            dst.id,
            vec![account(&dst, 0, dec!(0)), destination_savings.clone()],
        );
        let fake = Arc::new(fake);

        processor(&fake)
            .make_transfer(&src, &dst, 1, 1, dec!(5))
            .await
            .unwrap();

        let saved = fake.saved();
        assert_eq!(saved[0].id, source_savings.id);
        assert_eq!(saved[0].amount, dec!(45));
        assert_eq!(saved[1].id, destination_savings.id);
        assert_eq!(saved[1].amount, dec!(10));
    }

    #[tokio::test]
    async fn transfer_with_commission_discards_commission() {
        let (src, dst) = agreements();
        let mut fake = FakeAccountService::default();
        fake.by_agreement.insert(src.id, vec![account(&src, 0, dec!(100))]);
        fake.by_agreement.insert(dst.id, vec![account(&dst, 0, dec!(0))]);
        let fake = Arc::new(fake);

        processor(&fake)
            .make_transfer_with_commission(&src, &dst, 0, 0, dec!(10), dec!(1))
            .await
            .unwrap();

        let saved = fake.saved();
        assert_eq!(saved[0].amount, dec!(89));
        assert_eq!(saved[1].amount, dec!(10));
    }

    #[tokio::test]
    async fn source_lookup_fault_propagates() {
        let (src, dst) = agreements();
        let mut fake = FakeAccountService::default();
        fake.failing_agreements
            .insert(src.id, "Account not found".to_string());
        fake.failing_agreements
            .insert(dst.id, "Account not found".to_string());
        let fake = Arc::new(fake);

        let err = processor(&fake)
            .make_transfer(&src, &dst, 0, 0, dec!(10))
            .await
            .unwrap_err();

        assert_eq!(err.message(), "Account not found");
        assert_eq!(fake.listed(), vec![src.id]);
        assert!(fake.saved().is_empty());
    }

    #[tokio::test]
    async fn destination_lookup_fault_propagates_after_source_resolves() {
        let (src, dst) = agreements();
        let mut fake = FakeAccountService::default();
        fake.by_agreement.insert(src.id, vec![account(&src, 0, dec!(10))]);
        fake.failing_agreements
            .insert(dst.id, "Account not found destination".to_string());
        let fake = Arc::new(fake);

        let err = processor(&fake)
            .make_transfer(&src, &dst, 0, 0, dec!(10))
            .await
            .unwrap_err();

        assert_eq!(err.message(), "Account not found destination");
        assert!(fake.saved().is_empty());
    }

    #[tokio::test]
    async fn lookup_fault_message_is_not_rewritten() {
        let (src, dst) = agreements();
        let mut fake = FakeAccountService::default();
        fake.by_agreement.insert(src.id, vec![account(&src, 0, dec!(10))]);
        fake.failing_agreements
            .insert(dst.id, "Account not found destinationAccount".to_string());
        let fake = Arc::new(fake);

        let err = processor(&fake)
            .make_transfer_with_commission(&src, &dst, 0, 0, dec!(10), dec!(10))
            .await
            .unwrap_err();

        assert_eq!(err.message(), "Account not found destinationAccount");
    }

    #[tokio::test]
    async fn missing_source_account_type_fails() {
        let (src, dst) = agreements();
        let mut fake = FakeAccountService::default();
        fake.by_agreement.insert(src.id, vec![account(&src, 1, dec!(10))]);
        fake.by_agreement.insert(dst.id, vec![account(&dst, 0, dec!(0))]);
        let fake = Arc::new(fake);

        let err = processor(&fake)
            .make_transfer(&src, &dst, 0, 0, dec!(1))
            .await
            .unwrap_err();

        assert!(matches!(err, AccountError::AccountNotFound));
        assert_eq!(fake.listed(), vec![src.id]);
    }

    #[tokio::test]
    async fn empty_destination_agreement_fails() {
        let (src, dst) = agreements();
        let mut fake = FakeAccountService::default();
        fake.by_agreement.insert(src.id, vec![account(&src, 0, dec!(10))]);
        let fake = Arc::new(fake);

        let err = processor(&fake)
            .make_transfer_with_commission(&src, &dst, 0, 0, dec!(1), dec!(1))
            .await
            .unwrap_err();

        assert!(matches!(err, AccountError::DestinationAccountNotFound));
        assert_eq!(err.message(), "Account not found destination");
        assert!(fake.saved().is_empty());
    }

    #[tokio::test]
    async fn same_account_commission_transfer_nets_to_minus_commission() {
        let agreement = Agreement::new(Uuid::new_v4(), "Both");
        let only = account(&agreement, 0, dec!(100));
        let mut fake = FakeAccountService::default();
        fake.by_agreement.insert(agreement.id, vec![only.clone()]);
        let fake = Arc::new(fake);

        processor(&fake)
            .make_transfer_with_commission(&agreement, &agreement, 0, 0, dec!(10), dec!(1))
            .await
            .unwrap();

        let saved = fake.saved();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].id, only.id);
        assert_eq!(saved[0].amount, dec!(99));
    }

    #[tokio::test]
    async fn failed_destination_save_returns_error_after_source_saved() {
        let (src, dst) = agreements();
        let destination = account(&dst, 0, dec!(0));
        let mut fake = FakeAccountService::default();
        fake.by_agreement.insert(src.id, vec![account(&src, 0, dec!(100))]);
        fake.by_agreement.insert(dst.id, vec![destination.clone()]);
        fake.failing_saves.insert(destination.id.unwrap());
        let fake = Arc::new(fake);

        let err = processor(&fake)
            .make_transfer_with_commission(&src, &dst, 0, 0, dec!(10), dec!(1))
            .await
            .unwrap_err();

        assert_eq!(err.message(), "save failed");
        let saved = fake.saved();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].amount, dec!(89));
    }

    #[tokio::test]
    async fn commission_past_max_is_rejected_before_saving() {
        let (src, dst) = agreements();
        let mut fake = FakeAccountService::default();
        fake.by_agreement.insert(src.id, vec![account(&src, 0, dec!(100))]);
        fake.by_agreement.insert(dst.id, vec![account(&dst, 0, dec!(0))]);
        let fake = Arc::new(fake);

        let err = processor(&fake)
            .make_transfer_with_commission(&src, &dst, 0, 0, Decimal::MAX, dec!(1))
            .await
            .unwrap_err();

        assert!(matches!(err, AccountError::AmountOutOfRange));
        assert!(fake.saved().is_empty());
    }
}
