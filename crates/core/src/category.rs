use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExpenseCategoryType {
    Transportation,
    Food,
    Healthcare,
    Housing,
    Children,
    Income,
    Expenses,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExpenseSubcategoryType {
    PublicTransportation,
    Fuel,
    Insurance,
    Maintenance,
    CarPurchase,
    Groceries,
    Restaurants,
    Takeout,
    Coffee,
    Humans,
    Pets,
    Shopping,
    Rent,
    Bills,
    Childcare,
    Education,
    Salary,
    Other,
    Reimbursement,
    Dividend,
    Rsu,
    CreditPay,
    Transfer,
    Services,
    Subscription,
    Investment,
    Entertainment,
    Apparel,
    Travel,
}

/// Classification attached to a transaction by a categorizer. The importer
/// never sets one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseCategory {
    pub category: ExpenseCategoryType,
    pub subcategory: ExpenseSubcategoryType,
    #[serde(default)]
    pub ignore: bool,
}
