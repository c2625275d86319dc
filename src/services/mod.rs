//! Business logic services.
//!
//! Services hold the transfer and charge rules. Storage is reached only
//! through the [`crate::repository::AccountRepository`] port.

pub mod account_service;
pub mod payment_processor;

pub use account_service::{AccountService, LedgerAccountService};
pub use payment_processor::PaymentProcessor;
