//! Application router configuration and the JSON plumbing shared by the
//! route handlers.

use axum::{Json, Router, response::Response, routing::get};
use serde::Serialize;
use serde_json::json;

use crate::{
    AppState, Error, endpoints,
    stores::{CategoryStore, ExpenseStore},
};

mod analytics;
mod categories;
mod expenses;

/// Return a router with all the app's routes.
pub fn build_router<C, E>(state: AppState<C, E>) -> Router
where
    C: CategoryStore + Clone + Send + Sync + 'static,
    E: ExpenseStore + Clone + Send + Sync + 'static,
{
    Router::new()
        .route(endpoints::HEALTH, get(get_health))
        .route(endpoints::API_ROOT, get(get_api_status))
        .route(
            endpoints::CATEGORIES,
            get(categories::get_categories::<C, E>)
                .post(categories::create_category_endpoint::<C>),
        )
        .route(
            endpoints::CATEGORY,
            axum::routing::put(categories::update_category_endpoint::<C>)
                .delete(categories::delete_category_endpoint::<C>),
        )
        .route(
            endpoints::EXPENSES,
            get(expenses::get_expenses::<E>).post(expenses::create_expense_endpoint::<E>),
        )
        .route(
            endpoints::EXPENSE,
            axum::routing::put(expenses::update_expense_endpoint::<E>)
                .delete(expenses::delete_expense_endpoint::<E>),
        )
        .route(
            endpoints::ANALYTICS_SUMMARY,
            get(analytics::get_analytics_summary::<E>),
        )
        .fallback(get_route_not_found)
        .with_state(state)
}

/// A JSON body carrying a human-readable confirmation message.
#[derive(Debug, Serialize)]
pub(crate) struct MessageResponse {
    pub message: &'static str,
}

async fn get_health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "message": "Expense Tracker API is running" }))
}

async fn get_api_status() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "message": "Expense Tracker API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn get_route_not_found() -> Response {
    use axum::response::IntoResponse;

    Error::NotFound.into_response()
}
