//! Aggregate statistics over a filtered expense set.
//!
//! All of the functions here are pure: they take the already-fetched,
//! category-joined expense set and reduce it. Degenerate inputs (an empty
//! set, a zero total) produce zero values rather than errors, and every
//! monetary reduction runs on [Decimal] so repeated sums stay exact.
//!
//! Day bucketing uses the UTC calendar day of each expense. Timestamps are
//! normalized to UTC on the write path as well, so the same expense always
//! lands in the same bucket.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use serde::Serialize;
use time::{Date, UtcOffset};

use crate::models::{DatabaseID, Expense};

/// The number of records reported in [Summary::top_expenses].
pub const TOP_EXPENSES_COUNT: usize = 10;

/// The aggregate statistics for a filtered expense set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// The number of expenses in the set. Alias of [Summary::expense_count]
    /// kept for older clients.
    pub total_expenses: u64,
    /// The number of expenses in the set.
    pub expense_count: u64,
    /// The exact sum of all expense amounts.
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub total_amount: Decimal,
    /// The mean expense amount, or zero for an empty set.
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub average_expense: Decimal,
    /// Per-category totals, sorted descending by total.
    pub category_breakdown: Vec<CategoryBreakdown>,
    /// Per-day totals, sorted ascending by day.
    pub daily_totals: Vec<DailyTotal>,
    /// The highest-amount expenses in the set, sorted descending by amount.
    pub top_expenses: Vec<Expense>,
}

/// The share of the total spent in one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBreakdown {
    /// The ID of the category.
    pub category_id: DatabaseID,
    /// The display name of the category.
    pub category_name: String,
    /// The exact sum of the category's expense amounts.
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub total: Decimal,
    /// The number of expenses in the category.
    pub count: u64,
    /// The category's share of the overall total, as a percentage rounded
    /// to two decimal places. Zero when the overall total is zero.
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub percentage: Decimal,
}

/// The total spent on one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyTotal {
    /// The day in `YYYY-MM-DD` form (UTC).
    pub date: String,
    /// The exact sum of the day's expense amounts.
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub total: Decimal,
    /// The number of expenses on the day.
    pub count: u64,
}

/// The running totals for one category while grouping an expense set.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryGroup {
    /// The ID of the category.
    pub category_id: DatabaseID,
    /// The display name of the category.
    pub category_name: String,
    /// The exact sum of the category's expense amounts.
    pub total: Decimal,
    /// The number of expenses in the category.
    pub count: u64,
}

/// Reduce a filtered expense set to its aggregate statistics.
pub fn summarize(mut expenses: Vec<Expense>) -> Summary {
    let expense_count = expenses.len() as u64;
    let total_amount: Decimal = expenses.iter().map(|expense| expense.amount).sum();
    let average_expense = if expenses.is_empty() {
        Decimal::ZERO
    } else {
        total_amount / Decimal::from(expense_count)
    };

    let mut groups = group_by_category(&expenses);
    // Stable sort keeps ties in first-encountered order.
    groups.sort_by(|a, b| b.total.cmp(&a.total));
    let category_breakdown = groups
        .into_iter()
        .map(|group| {
            let percentage = if total_amount.is_zero() {
                Decimal::ZERO
            } else {
                (group.total / total_amount * Decimal::ONE_HUNDRED).round_dp(2)
            };

            CategoryBreakdown {
                category_id: group.category_id,
                category_name: group.category_name,
                total: group.total,
                count: group.count,
                percentage,
            }
        })
        .collect();

    let daily_totals = daily_totals(&expenses);

    // The top list is a prefix of the whole set ordered by amount, so sort
    // once and slice.
    expenses.sort_by(|a, b| b.amount.cmp(&a.amount));
    expenses.truncate(TOP_EXPENSES_COUNT);

    Summary {
        total_expenses: expense_count,
        expense_count,
        total_amount,
        average_expense,
        category_breakdown,
        daily_totals,
        top_expenses: expenses,
    }
}

/// Group an expense set by category, accumulating each category's total and
/// count.
///
/// Groups are returned in first-encountered order. This is also the
/// aggregation behind the per-category stats on the category listing.
pub fn group_by_category(expenses: &[Expense]) -> Vec<CategoryGroup> {
    let mut group_index: HashMap<DatabaseID, usize> = HashMap::new();
    let mut groups: Vec<CategoryGroup> = Vec::new();

    for expense in expenses {
        match group_index.get(&expense.category_id) {
            Some(&index) => {
                let group = &mut groups[index];
                group.total += expense.amount;
                group.count += 1;
            }
            None => {
                group_index.insert(expense.category_id, groups.len());
                groups.push(CategoryGroup {
                    category_id: expense.category_id,
                    category_name: expense.category.name.clone(),
                    total: expense.amount,
                    count: 1,
                });
            }
        }
    }

    groups
}

fn daily_totals(expenses: &[Expense]) -> Vec<DailyTotal> {
    let mut days: BTreeMap<Date, (Decimal, u64)> = BTreeMap::new();

    for expense in expenses {
        let day = expense.date.to_offset(UtcOffset::UTC).date();
        let entry = days.entry(day).or_insert((Decimal::ZERO, 0));
        entry.0 += expense.amount;
        entry.1 += 1;
    }

    days.into_iter()
        .map(|(day, (total, count))| DailyTotal {
            date: format_day(day),
            total,
            count,
        })
        .collect()
}

fn format_day(day: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        day.year(),
        u8::from(day.month()),
        day.day()
    )
}
