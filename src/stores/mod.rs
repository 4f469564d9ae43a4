//! Contains traits and implementations for objects that store the domain
//! [models](crate::models).

mod category;
mod expense;

pub mod sqlite;

pub use category::CategoryStore;
pub use expense::{ExpenseFilter, ExpenseQuery, ExpenseStore, SortBy, SortOrder};
