//! The route handlers for listing, creating, updating and deleting
//! expenses, including the query-string parsing for the expense listing.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::{
    Error, ExpenseState,
    error::FieldError,
    models::{
        DatabaseID, Expense, ExpenseUpdate, NewExpense, parse_end_timestamp,
        parse_start_timestamp,
    },
    pagination::{PaginationConfig, parse_positive_or, total_pages},
    stores::{ExpenseFilter, ExpenseQuery, ExpenseStore, SortBy, SortOrder},
};

use super::MessageResponse;

/// The raw query string parameters accepted by the expense listing.
///
/// Everything arrives as an optional string: unknown sort fields and
/// malformed page numbers coerce to defaults, while malformed dates and
/// category IDs are rejected with field-level errors.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ExpenseListParams {
    /// Include expenses dated on or after this timestamp or day.
    #[serde(default)]
    pub start_date: Option<String>,
    /// Include expenses dated on or before this timestamp or day.
    #[serde(default)]
    pub end_date: Option<String>,
    /// Include only expenses in this category.
    #[serde(default)]
    pub category_id: Option<String>,
    /// Include only expenses whose description or notes contain this text.
    #[serde(default)]
    pub search: Option<String>,
    /// The field to sort by: `date`, `amount` or `category`.
    #[serde(default)]
    pub sort_by: Option<String>,
    /// The sort direction: `asc` or `desc`.
    #[serde(default)]
    pub order: Option<String>,
    /// The 1-based page number.
    #[serde(default)]
    pub page: Option<String>,
    /// The number of expenses per page.
    #[serde(default)]
    pub limit: Option<String>,
}

/// A JSON body wrapping one page of expenses and the paging stats.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ExpenseListResponse {
    expenses: Vec<Expense>,
    /// The count of expenses matching the filter across all pages.
    total: u64,
    page: u64,
    total_pages: u64,
}

/// A JSON body wrapping a single expense.
#[derive(Debug, Serialize)]
pub(crate) struct ExpenseResponse {
    expense: Expense,
}

/// Parse the filter fields shared by the expense listing and the analytics
/// summary.
///
/// # Errors
/// Returns [Error::InvalidInput] naming each date or ID that failed to
/// parse.
pub(crate) fn parse_filter(
    start_date: Option<&str>,
    end_date: Option<&str>,
    category_id: Option<&str>,
    search: Option<String>,
) -> Result<ExpenseFilter, Error> {
    let mut errors = Vec::new();

    let start_date = match start_date {
        Some(raw) => match parse_start_timestamp(raw) {
            Some(datetime) => Some(datetime),
            None => {
                errors.push(FieldError::new("startDate", "Invalid date format"));
                None
            }
        },
        None => None,
    };

    let end_date = match end_date {
        Some(raw) => match parse_end_timestamp(raw) {
            Some(datetime) => Some(datetime),
            None => {
                errors.push(FieldError::new("endDate", "Invalid date format"));
                None
            }
        },
        None => None,
    };

    let category_id = match category_id {
        Some(raw) => match raw.parse::<DatabaseID>() {
            Ok(category_id) => Some(category_id),
            Err(_) => {
                errors.push(FieldError::new("categoryId", "Invalid category ID"));
                None
            }
        },
        None => None,
    };

    if !errors.is_empty() {
        return Err(Error::InvalidInput(errors));
    }

    Ok(ExpenseFilter {
        start_date,
        end_date,
        category_id,
        search: search.filter(|search| !search.is_empty()),
    })
}

fn parse_expense_query(
    params: ExpenseListParams,
    config: &PaginationConfig,
) -> Result<ExpenseQuery, Error> {
    let filter = parse_filter(
        params.start_date.as_deref(),
        params.end_date.as_deref(),
        params.category_id.as_deref(),
        params.search,
    )?;

    let sort_by = match params.sort_by.as_deref() {
        Some("amount") => SortBy::Amount,
        Some("category") => SortBy::Category,
        _ => SortBy::Date,
    };
    let order = match params.order.as_deref() {
        Some("asc") => SortOrder::Ascending,
        _ => SortOrder::Descending,
    };

    Ok(ExpenseQuery {
        filter,
        sort_by,
        order,
        page: parse_positive_or(params.page.as_deref(), config.default_page),
        limit: parse_positive_or(params.limit.as_deref(), config.default_page_size),
    })
}

/// List the page of expenses selected by the query string.
pub(crate) async fn get_expenses<E>(
    State(state): State<ExpenseState<E>>,
    Query(params): Query<ExpenseListParams>,
) -> Result<Json<ExpenseListResponse>, Error>
where
    E: ExpenseStore + Send + Sync,
{
    let query = parse_expense_query(params, &state.pagination_config)?;
    let (expenses, total) = state.expense_store.query(&query)?;

    Ok(Json(ExpenseListResponse {
        expenses,
        total,
        page: query.page,
        total_pages: total_pages(total, query.limit),
    }))
}

/// Create a new expense from the request payload.
pub(crate) async fn create_expense_endpoint<E>(
    State(state): State<ExpenseState<E>>,
    Json(payload): Json<NewExpense>,
) -> Result<(StatusCode, Json<ExpenseResponse>), Error>
where
    E: ExpenseStore + Send + Sync,
{
    let data = payload.validate()?;
    let expense = state.expense_store.create(data)?;

    Ok((StatusCode::CREATED, Json(ExpenseResponse { expense })))
}

/// Apply a partial update to the expense with the ID in the URL.
pub(crate) async fn update_expense_endpoint<E>(
    State(state): State<ExpenseState<E>>,
    Path(expense_id): Path<DatabaseID>,
    Json(payload): Json<ExpenseUpdate>,
) -> Result<Json<ExpenseResponse>, Error>
where
    E: ExpenseStore + Send + Sync,
{
    let changes = payload.validate()?;
    let expense = state.expense_store.update(expense_id, changes)?;

    Ok(Json(ExpenseResponse { expense }))
}

/// Delete the expense with the ID in the URL.
pub(crate) async fn delete_expense_endpoint<E>(
    State(state): State<ExpenseState<E>>,
    Path(expense_id): Path<DatabaseID>,
) -> Result<Json<MessageResponse>, Error>
where
    E: ExpenseStore + Send + Sync,
{
    state.expense_store.delete(expense_id)?;

    Ok(Json(MessageResponse {
        message: "Expense deleted successfully",
    }))
}
