//! This module defines the domain data types.

mod category;
mod expense;

pub use category::{
    Category, CategoryChanges, CategoryData, CategoryUpdate, DEFAULT_CATEGORY_COLOR, NewCategory,
};
pub use expense::{Expense, ExpenseChanges, ExpenseData, ExpenseUpdate, NewExpense};

pub(crate) use expense::{parse_end_timestamp, parse_start_timestamp};

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseID = i64;
