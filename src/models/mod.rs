//! Ledger entities.

/// Bank account model
pub mod account;
/// Customer agreement model
pub mod agreement;
