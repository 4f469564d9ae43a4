//! The API endpoint URIs.

/// The health check route.
pub const HEALTH: &str = "/health";
/// The API root, which reports the server status.
pub const API_ROOT: &str = "/api";
/// The route to list and create categories.
pub const CATEGORIES: &str = "/api/categories";
/// The route to update or delete a single category.
pub const CATEGORY: &str = "/api/categories/{category_id}";
/// The route to list and create expenses.
pub const EXPENSES: &str = "/api/expenses";
/// The route to update or delete a single expense.
pub const EXPENSE: &str = "/api/expenses/{expense_id}";
/// The route to fetch the aggregate analytics summary.
pub const ANALYTICS_SUMMARY: &str = "/api/analytics/summary";
