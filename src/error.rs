//! Domain error type for account operations.
//!
//! Every failure a caller can observe from the account and payment services
//! is an `AccountError`. The display text doubles as the stable message that
//! callers match on, so the wording of the lookup variants must not change.

/// Errors raised by account lookups, transfers and the persistence layer.
///
/// # Message Taxonomy
///
/// - `NoSourceAccount` → "No source account"
/// - `NoDestinationAccount` → "No destination account"
/// - `AccountNotFound` → "Account not found"
/// - `DestinationAccountNotFound` → "Account not found destination"
/// - `AmountOutOfRange` → "Amount out of range"
///
/// Insufficient funds on a charge is deliberately absent: a declined charge
/// is reported as `Ok(false)`, not as an error.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// Source account id did not resolve to a stored account.
    #[error("No source account")]
    NoSourceAccount,

    /// Destination account id did not resolve to a stored account.
    #[error("No destination account")]
    NoDestinationAccount,

    /// No account of the requested type exists under the source agreement.
    #[error("Account not found")]
    AccountNotFound,

    /// No account of the requested type exists under the destination agreement.
    #[error("Account not found destination")]
    DestinationAccountNotFound,

    /// A balance movement would overflow or lose decimal digits.
    ///
    /// Raised before anything is saved.
    #[error("Amount out of range")]
    AmountOutOfRange,

    /// Domain fault raised by a store with its own message.
    ///
    /// The message is surfaced verbatim.
    #[error("{0}")]
    Rejected(String),

    /// Database operation failed (connection error, query error).
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AccountError {
    /// Build a domain fault carrying an arbitrary message.
    pub fn rejected(message: impl Into<String>) -> Self {
        AccountError::Rejected(message.into())
    }

    /// Human-readable message describing which lookup or precondition failed.
    pub fn message(&self) -> String {
        self.to_string()
    }
}
