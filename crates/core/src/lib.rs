pub mod account;
pub mod category;
pub mod money;
pub mod transaction;

pub use account::{Account, AccountId, AccountType, UnknownVariant};
pub use category::{ExpenseCategory, ExpenseCategoryType, ExpenseSubcategoryType};
pub use money::Money;
pub use transaction::{Transaction, TransactionType};
