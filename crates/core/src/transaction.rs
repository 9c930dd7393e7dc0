use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::account::{Account, UnknownVariant};
use super::category::ExpenseCategory;
use super::money::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum TransactionType {
    #[default]
    Unknown = 0,
    Credit = 1,
    Debit = 2,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionType::Unknown => write!(f, "Unknown"),
            TransactionType::Credit => write!(f, "Credit"),
            TransactionType::Debit => write!(f, "Debit"),
        }
    }
}

/// Only `Credit` and `Debit` are recognised; anything else is the caller's
/// cue to fall back to `Unknown`.
impl FromStr for TransactionType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "credit" => Ok(TransactionType::Credit),
            "debit" => Ok(TransactionType::Debit),
            _ => Err(UnknownVariant::new("transaction type", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDateTime,
    /// Bank-assigned FITID. Not guaranteed unique.
    pub id: String,
    pub amount: Money,
    pub transaction_type: TransactionType,
    pub name: String,
    pub memo: String,
    pub account: Account,
    pub category: Option<ExpenseCategory>,
}
