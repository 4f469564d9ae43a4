//! Defines the expense store trait and the query types used to fetch
//! filtered expense sets.

use time::OffsetDateTime;

use crate::{
    Error,
    models::{DatabaseID, Expense, ExpenseChanges, ExpenseData},
};

/// Handles the creation and retrieval of expenses.
///
/// Expenses returned by a store are always joined with their category.
pub trait ExpenseStore {
    /// Create a new expense in the store.
    ///
    /// # Errors
    /// Returns [Error::InvalidCategory] if the category ID does not refer
    /// to an existing category.
    fn create(&self, expense: ExpenseData) -> Result<Expense, Error>;

    /// Retrieve an expense from the store by its ID.
    ///
    /// # Errors
    /// Returns [Error::ExpenseNotFound] if `expense_id` does not refer to
    /// an expense in the store.
    fn get(&self, expense_id: DatabaseID) -> Result<Expense, Error>;

    /// Apply `changes` to the expense with `expense_id` and return the
    /// updated expense.
    ///
    /// # Errors
    /// Returns [Error::ExpenseNotFound] if the expense does not exist, or
    /// [Error::InvalidCategory] if the new category ID is invalid.
    fn update(&self, expense_id: DatabaseID, changes: ExpenseChanges) -> Result<Expense, Error>;

    /// Delete the expense with `expense_id`.
    ///
    /// # Errors
    /// Returns [Error::ExpenseNotFound] if the expense does not exist.
    fn delete(&self, expense_id: DatabaseID) -> Result<(), Error>;

    /// Retrieve the page of expenses selected by `query` along with the
    /// count of all expenses matching the query's filter before pagination.
    fn query(&self, query: &ExpenseQuery) -> Result<(Vec<Expense>, u64), Error>;

    /// Retrieve every expense matching `filter`, in store order.
    ///
    /// This is the fetch used by the analytics aggregator, which does its
    /// own ordering.
    fn get_filtered(&self, filter: &ExpenseFilter) -> Result<Vec<Expense>, Error>;
}

/// Selects the subset of expenses that a query or aggregation runs over.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseFilter {
    /// Include expenses dated on or after this timestamp.
    pub start_date: Option<OffsetDateTime>,
    /// Include expenses dated on or before this timestamp.
    pub end_date: Option<OffsetDateTime>,
    /// Include only expenses belonging to this category.
    pub category_id: Option<DatabaseID>,
    /// Include only expenses whose description or notes contain this text
    /// (case-insensitive).
    pub search: Option<String>,
}

/// The field to sort an expense listing by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortBy {
    /// Sort by the expense timestamp.
    #[default]
    Date,
    /// Sort by the expense amount.
    Amount,
    /// Sort by the name of the expense's category.
    Category,
}

/// The direction to sort an expense listing in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Sort in order of increasing value.
    Ascending,
    /// Sort in order of decreasing value.
    #[default]
    Descending,
}

/// A fully-specified, deterministic fetch against the expense store.
///
/// Ties within an identical sort key keep store order; no secondary sort
/// key is imposed.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseQuery {
    /// The subset of expenses to select from.
    pub filter: ExpenseFilter,
    /// The field to sort by.
    pub sort_by: SortBy,
    /// The direction to sort in.
    pub order: SortOrder,
    /// The 1-based page number to return.
    pub page: u64,
    /// The maximum number of expenses per page. Always positive.
    pub limit: u64,
}

impl ExpenseQuery {
    /// The number of records to skip to reach the requested page.
    ///
    /// Saturates instead of overflowing, so an absurdly large page number
    /// selects an empty window rather than panicking.
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

impl Default for ExpenseQuery {
    fn default() -> Self {
        Self {
            filter: ExpenseFilter::default(),
            sort_by: SortBy::default(),
            order: SortOrder::default(),
            page: 1,
            limit: 50,
        }
    }
}
