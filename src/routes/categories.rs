//! The route handlers for creating, listing, updating and deleting
//! categories.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    AppState, CategoryState, Error,
    analytics::group_by_category,
    models::{Category, CategoryUpdate, DatabaseID, NewCategory},
    stores::{CategoryStore, ExpenseFilter, ExpenseStore},
};

use super::MessageResponse;

/// A category decorated with the stats of the expenses assigned to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CategoryWithStats {
    /// The ID of the category in the database.
    pub id: DatabaseID,
    /// The display name of the category.
    pub name: String,
    /// The hex color used to render the category.
    pub color: String,
    /// An optional short glyph or emoji shown next to the name.
    pub icon: Option<String>,
    /// The number of expenses assigned to the category.
    #[serde(rename = "_count")]
    pub count: ExpenseCount,
    /// The exact sum of the amounts of the category's expenses.
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub total_amount: Decimal,
}

/// The count of expenses assigned to a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub(crate) struct ExpenseCount {
    /// The number of expenses.
    pub expenses: u64,
}

/// A JSON body wrapping the list of categories with their stats.
#[derive(Debug, Serialize)]
pub(crate) struct CategoryListResponse {
    categories: Vec<CategoryWithStats>,
}

/// A JSON body wrapping a single category.
#[derive(Debug, Serialize)]
pub(crate) struct CategoryResponse {
    category: Category,
}

/// List all categories, ordered by name, with each category's expense count
/// and total.
pub(crate) async fn get_categories<C, E>(
    State(state): State<AppState<C, E>>,
) -> Result<Json<CategoryListResponse>, Error>
where
    C: CategoryStore + Send + Sync,
    E: ExpenseStore + Send + Sync,
{
    let categories = state.category_store.get_all()?;
    let expenses = state.expense_store.get_filtered(&ExpenseFilter::default())?;
    let groups = group_by_category(&expenses);

    let categories = categories
        .into_iter()
        .map(|category| {
            let (count, total_amount) = groups
                .iter()
                .find(|group| group.category_id == category.id)
                .map(|group| (group.count, group.total))
                .unwrap_or((0, Decimal::ZERO));

            CategoryWithStats {
                id: category.id,
                name: category.name,
                color: category.color,
                icon: category.icon,
                count: ExpenseCount { expenses: count },
                total_amount,
            }
        })
        .collect();

    Ok(Json(CategoryListResponse { categories }))
}

/// Create a new category from the request payload.
pub(crate) async fn create_category_endpoint<C>(
    State(state): State<CategoryState<C>>,
    Json(payload): Json<NewCategory>,
) -> Result<(StatusCode, Json<CategoryResponse>), Error>
where
    C: CategoryStore + Send + Sync,
{
    let data = payload.validate()?;
    let category = state.category_store.create(data)?;

    Ok((StatusCode::CREATED, Json(CategoryResponse { category })))
}

/// Apply a partial update to the category with the ID in the URL.
pub(crate) async fn update_category_endpoint<C>(
    State(state): State<CategoryState<C>>,
    Path(category_id): Path<DatabaseID>,
    Json(payload): Json<CategoryUpdate>,
) -> Result<Json<CategoryResponse>, Error>
where
    C: CategoryStore + Send + Sync,
{
    let changes = payload.validate()?;
    let category = state.category_store.update(category_id, changes)?;

    Ok(Json(CategoryResponse { category }))
}

/// Delete the category with the ID in the URL, along with its expenses.
pub(crate) async fn delete_category_endpoint<C>(
    State(state): State<CategoryState<C>>,
    Path(category_id): Path<DatabaseID>,
) -> Result<Json<MessageResponse>, Error>
where
    C: CategoryStore + Send + Sync,
{
    state.category_store.delete(category_id)?;

    Ok(Json(MessageResponse {
        message: "Category deleted successfully",
    }))
}
