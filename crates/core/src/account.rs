use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct AccountId(pub i64);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AccountType {
    Checking,
    Savings,
    Creditline,
    #[default]
    Other,
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountType::Checking => write!(f, "Checking"),
            AccountType::Savings => write!(f, "Savings"),
            AccountType::Creditline => write!(f, "Creditline"),
            AccountType::Other => write!(f, "Other"),
        }
    }
}

impl FromStr for AccountType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "checking" => Ok(AccountType::Checking),
            "savings" => Ok(AccountType::Savings),
            "creditline" => Ok(AccountType::Creditline),
            "other" => Ok(AccountType::Other),
            _ => Err(UnknownVariant::new("account type", s)),
        }
    }
}

/// The account a statement section was issued for. Every transaction carries
/// its own copy, taken from the section that contained it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub currency: String,
    pub account_id: AccountId,
    pub account_type: AccountType,
}

impl Account {
    pub fn new(currency: &str, account_id: i64, account_type: AccountType) -> Self {
        Account {
            currency: currency.to_string(),
            account_id: AccountId(account_id),
            account_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown {kind}: '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        UnknownVariant {
            kind,
            value: value.to_string(),
        }
    }
}
