//! Account persistence port and its adapters.
//!
//! The services only ever talk to [`AccountRepository`]. A merely missing id
//! is `Ok(None)`; an `Err` from any method is a store fault and is handed to
//! the caller unchanged.

pub mod in_memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{error::AccountError, models::account::Account};

pub use in_memory::InMemoryAccountRepository;
pub use postgres::PgAccountRepository;

/// Account storage.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Insert or update an account, returning the stored representation.
    ///
    /// An account without an id is assigned one.
    async fn save(&self, account: &Account) -> Result<Account, AccountError>;

    /// Look up an account by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, AccountError>;

    /// Every stored account, in store order.
    async fn find_all(&self) -> Result<Vec<Account>, AccountError>;

    /// Accounts owned by one agreement, in store order.
    async fn find_by_agreement_id(&self, agreement_id: Uuid)
    -> Result<Vec<Account>, AccountError>;
}
