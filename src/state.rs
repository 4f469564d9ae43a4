//! Implements the structs that hold the state of the REST server.

use axum::extract::FromRef;

use crate::{
    pagination::PaginationConfig,
    stores::{CategoryStore, ExpenseStore},
};

/// The state of the REST server.
///
/// Cloning is cheap: the SQLite stores share one `Arc`-wrapped connection.
///
/// Two lifecycle strategies are supported and the core logic assumes
/// neither: build one instance at start-up and reuse it for the life of a
/// long-lived server process, or build a fresh instance per invocation in
/// an invocation-per-request deployment.
#[derive(Debug, Clone)]
pub struct AppState<C, E>
where
    C: CategoryStore + Send + Sync,
    E: ExpenseStore + Send + Sync,
{
    /// The store for managing expense [categories](crate::models::Category).
    pub category_store: C,
    /// The store for managing [expenses](crate::models::Expense).
    pub expense_store: E,
    /// The config that controls how to page list data.
    pub pagination_config: PaginationConfig,
}

impl<C, E> AppState<C, E>
where
    C: CategoryStore + Send + Sync,
    E: ExpenseStore + Send + Sync,
{
    /// Create a new [AppState].
    pub fn new(category_store: C, expense_store: E, pagination_config: PaginationConfig) -> Self {
        Self {
            category_store,
            expense_store,
            pagination_config,
        }
    }
}

/// The state needed by the category endpoints.
#[derive(Debug, Clone)]
pub struct CategoryState<C>
where
    C: CategoryStore + Send + Sync,
{
    /// The store for managing expense categories.
    pub category_store: C,
}

impl<C, E> FromRef<AppState<C, E>> for CategoryState<C>
where
    C: CategoryStore + Clone + Send + Sync,
    E: ExpenseStore + Send + Sync,
{
    fn from_ref(state: &AppState<C, E>) -> Self {
        Self {
            category_store: state.category_store.clone(),
        }
    }
}

/// The state needed by the expense and analytics endpoints.
#[derive(Debug, Clone)]
pub struct ExpenseState<E>
where
    E: ExpenseStore + Send + Sync,
{
    /// The store for managing expenses.
    pub expense_store: E,
    /// The config that controls how to page the expense listing.
    pub pagination_config: PaginationConfig,
}

impl<C, E> FromRef<AppState<C, E>> for ExpenseState<E>
where
    C: CategoryStore + Send + Sync,
    E: ExpenseStore + Clone + Send + Sync,
{
    fn from_ref(state: &AppState<C, E>) -> Self {
        Self {
            expense_store: state.expense_store.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}
