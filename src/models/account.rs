//! Account entity and its balance arithmetic.
//!
//! This module defines:
//! - `Account`: a stored (or about to be stored) bank account
//! - `NewAccount`: the input used to open an account under an agreement

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AccountError;

/// A bank account belonging to exactly one agreement.
///
/// # Database Table
///
/// Maps to the `accounts` table. The `type` classifier is stored in the
/// `account_type` column and serialized as `type`.
///
/// # Amount
///
/// Amounts are `Decimal`, never floats. `Decimal` holds 96 bits of mantissa,
/// so every movement goes through [`exact_sum`] and a result that would be
/// rounded or overflow is rejected with `AmountOutOfRange` instead.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow, Serialize, Deserialize)]
pub struct Account {
    /// Store-assigned identifier, `None` until the account is first saved
    pub id: Option<Uuid>,

    /// Current balance
    pub amount: Decimal,

    /// Integer code distinguishing account kinds under one agreement
    #[serde(rename = "type")]
    pub account_type: i32,

    /// Owning agreement
    pub agreement_id: Uuid,

    /// Display number
    pub number: String,
}

impl Account {
    /// Remove `amount` from the balance.
    ///
    /// No floor check: callers that need one use [`Account::has_funds`] first.
    /// The balance is left untouched on error.
    pub fn debit(&mut self, amount: Decimal) -> Result<(), AccountError> {
        self.amount = exact_sum(self.amount, -amount)?;
        Ok(())
    }

    /// Add `amount` to the balance. The balance is left untouched on error.
    pub fn credit(&mut self, amount: Decimal) -> Result<(), AccountError> {
        self.amount = exact_sum(self.amount, amount)?;
        Ok(())
    }

    /// Whether the current balance covers `amount`.
    pub fn has_funds(&self, amount: Decimal) -> bool {
        amount <= self.amount
    }
}

/// `lhs + rhs`, failing instead of overflowing or rounding.
///
/// `Decimal` addition keeps the larger operand scale unless the result no
/// longer fits the mantissa, in which case it drops fractional digits. A
/// result scale below either operand's therefore marks a rounded sum. A zero
/// operand returns the other one as-is, which is always exact.
pub fn exact_sum(lhs: Decimal, rhs: Decimal) -> Result<Decimal, AccountError> {
    let sum = lhs
        .checked_add(rhs)
        .ok_or(AccountError::AmountOutOfRange)?;
    if lhs.is_zero() || rhs.is_zero() {
        return Ok(sum);
    }
    if sum.scale() < lhs.scale().max(rhs.scale()) {
        return Err(AccountError::AmountOutOfRange);
    }
    Ok(sum)
}

/// Input for opening a new account under an agreement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccount {
    pub agreement_id: Uuid,
    pub number: String,
    pub account_type: i32,
    pub amount: Decimal,
}

/// A new account has no id until the store assigns one.
impl From<NewAccount> for Account {
    fn from(new: NewAccount) -> Self {
        Self {
            id: None,
            amount: new.amount,
            account_type: new.account_type,
            agreement_id: new.agreement_id,
            number: new.number,
        }
    }
}
