//! Bank ledger - accounts and money movement between them.
//!
//! The crate exposes two services:
//!
//! - [`services::LedgerAccountService`]: open, list and look up accounts,
//!   transfer between two account ids, and charge a single account
//! - [`services::PaymentProcessor`]: transfers addressed by agreement and
//!   account type, optionally with a commission taken from the source
//!
//! Storage sits behind [`repository::AccountRepository`], with a PostgreSQL
//! adapter for production and an in-memory adapter for tests.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use error::AccountError;
