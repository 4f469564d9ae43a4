//! The route handler for the aggregate analytics summary.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;

use crate::{
    Error, ExpenseState,
    analytics::{Summary, summarize},
    stores::ExpenseStore,
};

use super::expenses::parse_filter;

/// The raw query string parameters accepted by the analytics summary.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AnalyticsParams {
    /// Include expenses dated on or after this timestamp or day.
    #[serde(default)]
    pub start_date: Option<String>,
    /// Include expenses dated on or before this timestamp or day.
    #[serde(default)]
    pub end_date: Option<String>,
    /// Include only expenses in this category.
    #[serde(default)]
    pub category_id: Option<String>,
}

/// Aggregate the expenses selected by the query string into a summary.
pub(crate) async fn get_analytics_summary<E>(
    State(state): State<ExpenseState<E>>,
    Query(params): Query<AnalyticsParams>,
) -> Result<Json<Summary>, Error>
where
    E: ExpenseStore + Send + Sync,
{
    let filter = parse_filter(
        params.start_date.as_deref(),
        params.end_date.as_deref(),
        params.category_id.as_deref(),
        None,
    )?;
    let expenses = state.expense_store.get_filtered(&filter)?;

    Ok(Json(summarize(expenses)))
}
