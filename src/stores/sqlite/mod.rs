//! SQLite backed implementations of the store traits.

mod category;
mod expense;

pub use category::SQLiteCategoryStore;
pub use expense::SQLiteExpenseStore;
