//! Implements a SQLite backed expense store.
//!
//! Amounts are stored as decimal strings so that no precision is lost
//! round-tripping through the database; timestamps are stored as UTC
//! strings in a fixed-width format so that lexicographic comparison in SQL
//! matches chronological order.

use std::{
    str::FromStr,
    sync::{Arc, Mutex},
};

use rusqlite::{Connection, Row, params_from_iter, types::Value};
use rust_decimal::Decimal;
use time::{
    OffsetDateTime, PrimitiveDateTime, UtcOffset,
    format_description::BorrowedFormatItem,
    macros::format_description,
};

use crate::{
    Error,
    models::{Category, DatabaseID, Expense, ExpenseChanges, ExpenseData},
    stores::{
        ExpenseStore,
        expense::{ExpenseFilter, ExpenseQuery, SortBy, SortOrder},
    },
};

/// The fixed-width storage format for expense timestamps.
///
/// Timestamps are normalized to UTC before formatting, so string ordering
/// in SQL matches chronological ordering.
const SQL_DATETIME_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z");

const SELECT_EXPENSE: &str = "SELECT expense.id, expense.amount, expense.description, \
     expense.date, expense.notes, expense.category_id, \
     category.name, category.color, category.icon \
     FROM expense INNER JOIN category ON expense.category_id = category.id";

/// Stores expenses in a SQLite database.
///
/// Expenses reference the [Category](crate::models::Category) model, so the
/// category table must be set up in the database.
#[derive(Debug, Clone)]
pub struct SQLiteExpenseStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteExpenseStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl ExpenseStore for SQLiteExpenseStore {
    fn create(&self, expense: ExpenseData) -> Result<Expense, Error> {
        let connection = self.connection.lock().unwrap();

        connection.execute(
            "INSERT INTO expense (amount, description, date, category_id, notes)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            (
                expense.amount.to_string(),
                &expense.description,
                datetime_to_sql(expense.date)?,
                expense.category_id,
                &expense.notes,
            ),
        )?;

        let id = connection.last_insert_rowid();

        get_expense(&connection, id)
    }

    fn get(&self, expense_id: DatabaseID) -> Result<Expense, Error> {
        let connection = self.connection.lock().unwrap();

        get_expense(&connection, expense_id)
    }

    fn update(&self, expense_id: DatabaseID, changes: ExpenseChanges) -> Result<Expense, Error> {
        let connection = self.connection.lock().unwrap();

        let existing = get_expense(&connection, expense_id)?;

        let amount = changes.amount.unwrap_or(existing.amount);
        let description = changes.description.unwrap_or(existing.description);
        let date = changes.date.unwrap_or(existing.date);
        let category_id = changes.category_id.unwrap_or(existing.category_id);
        let notes = changes.notes.unwrap_or(existing.notes);

        connection.execute(
            "UPDATE expense
             SET amount = ?1, description = ?2, date = ?3, category_id = ?4, notes = ?5
             WHERE id = ?6;",
            (
                amount.to_string(),
                &description,
                datetime_to_sql(date)?,
                category_id,
                &notes,
                expense_id,
            ),
        )?;

        get_expense(&connection, expense_id)
    }

    fn delete(&self, expense_id: DatabaseID) -> Result<(), Error> {
        let rows_affected = self
            .connection
            .lock()
            .unwrap()
            .execute("DELETE FROM expense WHERE id = ?1;", [expense_id])?;

        if rows_affected == 0 {
            return Err(Error::ExpenseNotFound);
        }

        Ok(())
    }

    fn query(&self, query: &ExpenseQuery) -> Result<(Vec<Expense>, u64), Error> {
        let mut parameters = Vec::new();
        let where_clause = build_where_clause(&query.filter, &mut parameters)?;

        let direction = match query.order {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        };
        // Amounts are stored as TEXT, so ordering casts to REAL. Ties within
        // an identical sort key keep store order.
        let order_clause = match query.sort_by {
            SortBy::Date => format!("ORDER BY expense.date {direction}"),
            SortBy::Amount => format!("ORDER BY CAST(expense.amount AS REAL) {direction}"),
            SortBy::Category => format!("ORDER BY category.name {direction}"),
        };

        let query_string = format!(
            "{SELECT_EXPENSE} {where_clause} {order_clause} LIMIT {} OFFSET {}",
            query.limit,
            query.offset(),
        );

        let connection = self.connection.lock().unwrap();

        let expenses = connection
            .prepare(&query_string)?
            .query_map(params_from_iter(parameters.iter()), map_row)?
            .map(|maybe_expense| maybe_expense.map_err(Error::SqlError))
            .collect::<Result<Vec<_>, _>>()?;

        // rusqlite reads COUNT(*) as i64; the count is never negative.
        let total: i64 = connection
            .prepare(&format!("SELECT COUNT(*) FROM expense {where_clause}"))?
            .query_row(params_from_iter(parameters.iter()), |row| row.get(0))?;

        Ok((expenses, total as u64))
    }

    fn get_filtered(&self, filter: &ExpenseFilter) -> Result<Vec<Expense>, Error> {
        let mut parameters = Vec::new();
        let where_clause = build_where_clause(filter, &mut parameters)?;

        self.connection
            .lock()
            .unwrap()
            .prepare(&format!("{SELECT_EXPENSE} {where_clause}"))?
            .query_map(params_from_iter(parameters.iter()), map_row)?
            .map(|maybe_expense| maybe_expense.map_err(Error::SqlError))
            .collect()
    }
}

fn build_where_clause(
    filter: &ExpenseFilter,
    parameters: &mut Vec<Value>,
) -> Result<String, Error> {
    let mut where_clause_parts = Vec::new();

    if let Some(start_date) = filter.start_date {
        parameters.push(Value::Text(datetime_to_sql(start_date)?));
        where_clause_parts.push(format!("expense.date >= ?{}", parameters.len()));
    }

    if let Some(end_date) = filter.end_date {
        parameters.push(Value::Text(datetime_to_sql(end_date)?));
        where_clause_parts.push(format!("expense.date <= ?{}", parameters.len()));
    }

    if let Some(category_id) = filter.category_id {
        parameters.push(Value::Integer(category_id));
        where_clause_parts.push(format!("expense.category_id = ?{}", parameters.len()));
    }

    if let Some(search) = &filter.search {
        parameters.push(Value::Text(format!("%{}%", escape_like(search))));
        let index = parameters.len();
        where_clause_parts.push(format!(
            "(expense.description LIKE ?{index} ESCAPE '\\' \
             OR expense.notes LIKE ?{index} ESCAPE '\\')"
        ));
    }

    if where_clause_parts.is_empty() {
        Ok(String::new())
    } else {
        Ok(String::from("WHERE ") + &where_clause_parts.join(" AND "))
    }
}

/// Escape the LIKE wildcards in a search term so it matches as a literal
/// substring.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());

    for character in term.chars() {
        if matches!(character, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(character);
    }

    escaped
}

fn get_expense(connection: &Connection, expense_id: DatabaseID) -> Result<Expense, Error> {
    connection
        .prepare(&format!("{SELECT_EXPENSE} WHERE expense.id = :id"))?
        .query_row(&[(":id", &expense_id)], map_row)
        .map_err(|error| match Error::from(error) {
            Error::NotFound => Error::ExpenseNotFound,
            other => other,
        })
}

fn map_row(row: &Row) -> Result<Expense, rusqlite::Error> {
    let raw_amount: String = row.get(1)?;
    let amount = Decimal::from_str(&raw_amount).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(1, rusqlite::types::Type::Text, Box::new(error))
    })?;

    let raw_date: String = row.get(3)?;
    let date = datetime_from_sql(&raw_date).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(error))
    })?;

    let category_id: DatabaseID = row.get(5)?;

    Ok(Expense {
        id: row.get(0)?,
        amount,
        description: row.get(2)?,
        date,
        category_id,
        notes: row.get(4)?,
        category: Category {
            id: category_id,
            name: row.get(6)?,
            color: row.get(7)?,
            icon: row.get(8)?,
        },
    })
}

fn datetime_to_sql(datetime: OffsetDateTime) -> Result<String, Error> {
    datetime
        .to_offset(UtcOffset::UTC)
        .format(&SQL_DATETIME_FORMAT)
        .map_err(|error| Error::TimestampFormat(error.to_string()))
}

fn datetime_from_sql(raw: &str) -> Result<OffsetDateTime, time::error::Parse> {
    PrimitiveDateTime::parse(raw, &SQL_DATETIME_FORMAT).map(PrimitiveDateTime::assume_utc)
}

#[cfg(test)]
mod expense_store_tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use time::{OffsetDateTime, macros::datetime};

    use crate::{
        Error,
        db::initialize,
        models::{
            CategoryData, DEFAULT_CATEGORY_COLOR, DatabaseID, ExpenseChanges, ExpenseData,
        },
        stores::{
            CategoryStore, ExpenseFilter, ExpenseQuery, SortBy, SortOrder,
            sqlite::SQLiteCategoryStore,
        },
    };

    use super::{ExpenseStore, SQLiteExpenseStore};

    struct Fixture {
        category_store: SQLiteCategoryStore,
        expense_store: SQLiteExpenseStore,
    }

    fn get_test_fixture() -> Fixture {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let connection = Arc::new(Mutex::new(connection));

        Fixture {
            category_store: SQLiteCategoryStore::new(connection.clone()),
            expense_store: SQLiteExpenseStore::new(connection),
        }
    }

    impl Fixture {
        fn create_category(&self, name: &str) -> DatabaseID {
            self.category_store
                .create(CategoryData {
                    name: name.to_owned(),
                    color: DEFAULT_CATEGORY_COLOR.to_owned(),
                    icon: None,
                })
                .unwrap()
                .id
        }

        fn create_expense(
            &self,
            amount: Decimal,
            description: &str,
            date: OffsetDateTime,
            category_id: DatabaseID,
            notes: Option<&str>,
        ) -> DatabaseID {
            self.expense_store
                .create(ExpenseData {
                    amount,
                    description: description.to_owned(),
                    date,
                    category_id,
                    notes: notes.map(str::to_owned),
                })
                .unwrap()
                .id
        }
    }

    #[test]
    fn create_expense_round_trips_amount_exactly() {
        let fixture = get_test_fixture();
        let category_id = fixture.create_category("Groceries");

        let expense = fixture
            .expense_store
            .create(ExpenseData {
                amount: dec!(30.005),
                description: "Weekly shop".to_owned(),
                date: datetime!(2024-03-01 12:30:00 UTC),
                category_id,
                notes: None,
            })
            .unwrap();

        assert_eq!(expense.amount, dec!(30.005));
        assert_eq!(expense.date, datetime!(2024-03-01 12:30:00 UTC));
        assert_eq!(expense.category.name, "Groceries");

        let fetched = fixture.expense_store.get(expense.id).unwrap();
        assert_eq!(fetched, expense);
    }

    #[test]
    fn create_expense_with_invalid_category_is_rejected() {
        let fixture = get_test_fixture();

        let result = fixture.expense_store.create(ExpenseData {
            amount: dec!(10),
            description: "Ghost".to_owned(),
            date: datetime!(2024-03-01 12:30:00 UTC),
            category_id: 999,
            notes: None,
        });

        assert_eq!(result, Err(Error::InvalidCategory));
    }

    #[test]
    fn create_normalizes_timestamps_to_utc() {
        let fixture = get_test_fixture();
        let category_id = fixture.create_category("Groceries");

        let expense = fixture
            .expense_store
            .create(ExpenseData {
                amount: dec!(10),
                description: "Offset".to_owned(),
                date: datetime!(2024-03-01 13:30:00 +01:00),
                category_id,
                notes: None,
            })
            .unwrap();

        assert_eq!(expense.date, datetime!(2024-03-01 12:30:00 UTC));
    }

    #[test]
    fn get_missing_expense_returns_not_found() {
        let fixture = get_test_fixture();

        assert_eq!(fixture.expense_store.get(999), Err(Error::ExpenseNotFound));
    }

    #[test]
    fn update_applies_only_requested_changes() {
        let fixture = get_test_fixture();
        let category_id = fixture.create_category("Groceries");
        let id = fixture.create_expense(
            dec!(10.00),
            "Weekly shop",
            datetime!(2024-03-01 12:30:00 UTC),
            category_id,
            Some("receipt in drawer"),
        );

        let updated = fixture
            .expense_store
            .update(
                id,
                ExpenseChanges {
                    amount: Some(dec!(12.34)),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.amount, dec!(12.34));
        assert_eq!(updated.description, "Weekly shop");
        assert_eq!(updated.notes.as_deref(), Some("receipt in drawer"));
    }

    #[test]
    fn update_can_clear_notes() {
        let fixture = get_test_fixture();
        let category_id = fixture.create_category("Groceries");
        let id = fixture.create_expense(
            dec!(10.00),
            "Weekly shop",
            datetime!(2024-03-01 12:30:00 UTC),
            category_id,
            Some("receipt in drawer"),
        );

        let updated = fixture
            .expense_store
            .update(
                id,
                ExpenseChanges {
                    notes: Some(None),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.notes, None);
    }

    #[test]
    fn update_with_invalid_category_is_rejected() {
        let fixture = get_test_fixture();
        let category_id = fixture.create_category("Groceries");
        let id = fixture.create_expense(
            dec!(10.00),
            "Weekly shop",
            datetime!(2024-03-01 12:30:00 UTC),
            category_id,
            None,
        );

        let result = fixture.expense_store.update(
            id,
            ExpenseChanges {
                category_id: Some(999),
                ..Default::default()
            },
        );

        assert_eq!(result, Err(Error::InvalidCategory));
    }

    #[test]
    fn update_missing_expense_returns_not_found() {
        let fixture = get_test_fixture();

        let result = fixture.expense_store.update(999, ExpenseChanges::default());

        assert_eq!(result, Err(Error::ExpenseNotFound));
    }

    #[test]
    fn delete_missing_expense_returns_not_found() {
        let fixture = get_test_fixture();

        assert_eq!(fixture.expense_store.delete(999), Err(Error::ExpenseNotFound));
    }

    #[test]
    fn deleting_category_cascades_to_expenses() {
        let fixture = get_test_fixture();
        let category_id = fixture.create_category("Groceries");
        fixture.create_expense(
            dec!(10.00),
            "Weekly shop",
            datetime!(2024-03-01 12:30:00 UTC),
            category_id,
            None,
        );

        fixture.category_store.delete(category_id).unwrap();

        let (expenses, total) = fixture
            .expense_store
            .query(&ExpenseQuery::default())
            .unwrap();
        assert!(expenses.is_empty());
        assert_eq!(total, 0);
    }

    #[test]
    fn query_date_range_bounds_are_inclusive() {
        let fixture = get_test_fixture();
        let category_id = fixture.create_category("Groceries");
        for (day, description) in [(1, "before"), (2, "start"), (3, "middle"), (4, "end")] {
            fixture.create_expense(
                dec!(1),
                description,
                datetime!(2024-03-01 00:00:00 UTC) + time::Duration::days(day - 1),
                category_id,
                None,
            );
        }

        let query = ExpenseQuery {
            filter: ExpenseFilter {
                start_date: Some(datetime!(2024-03-02 00:00:00 UTC)),
                end_date: Some(datetime!(2024-03-04 00:00:00 UTC)),
                ..Default::default()
            },
            ..Default::default()
        };

        let (expenses, total) = fixture.expense_store.query(&query).unwrap();

        assert_eq!(total, 3);
        let descriptions: Vec<_> = expenses
            .iter()
            .map(|expense| expense.description.as_str())
            .collect();
        assert_eq!(descriptions, vec!["end", "middle", "start"]);
    }

    #[test]
    fn query_search_matches_description_and_notes_case_insensitively() {
        let fixture = get_test_fixture();
        let category_id = fixture.create_category("Food & Dining");
        fixture.create_expense(
            dec!(4.50),
            "Morning COFFEE",
            datetime!(2024-03-01 08:00:00 UTC),
            category_id,
            None,
        );
        fixture.create_expense(
            dec!(12.00),
            "Lunch",
            datetime!(2024-03-01 12:00:00 UTC),
            category_id,
            Some("included a coffee to go"),
        );
        fixture.create_expense(
            dec!(30.00),
            "Dinner",
            datetime!(2024-03-01 19:00:00 UTC),
            category_id,
            None,
        );

        let query = ExpenseQuery {
            filter: ExpenseFilter {
                search: Some("coffee".to_owned()),
                ..Default::default()
            },
            ..Default::default()
        };

        let (expenses, total) = fixture.expense_store.query(&query).unwrap();

        assert_eq!(total, 2);
        assert!(
            expenses
                .iter()
                .all(|expense| expense.description != "Dinner")
        );
    }

    #[test]
    fn query_search_treats_like_wildcards_literally() {
        let fixture = get_test_fixture();
        let category_id = fixture.create_category("Shopping");
        fixture.create_expense(
            dec!(10),
            "100 things from the dollar store",
            datetime!(2024-03-01 12:00:00 UTC),
            category_id,
            None,
        );
        fixture.create_expense(
            dec!(50),
            "50% deposit on the venue",
            datetime!(2024-03-01 13:00:00 UTC),
            category_id,
            None,
        );
        fixture.create_expense(
            dec!(5),
            "item a_b",
            datetime!(2024-03-01 14:00:00 UTC),
            category_id,
            None,
        );
        fixture.create_expense(
            dec!(5),
            "item axb",
            datetime!(2024-03-01 15:00:00 UTC),
            category_id,
            None,
        );

        // '%' must not act as a wildcard.
        let query = ExpenseQuery {
            filter: ExpenseFilter {
                search: Some("100%".to_owned()),
                ..Default::default()
            },
            ..Default::default()
        };
        let (_, total) = fixture.expense_store.query(&query).unwrap();
        assert_eq!(total, 0);

        let query = ExpenseQuery {
            filter: ExpenseFilter {
                search: Some("50%".to_owned()),
                ..Default::default()
            },
            ..Default::default()
        };
        let (expenses, total) = fixture.expense_store.query(&query).unwrap();
        assert_eq!(total, 1);
        assert_eq!(expenses[0].description, "50% deposit on the venue");

        // '_' must not match an arbitrary character.
        let query = ExpenseQuery {
            filter: ExpenseFilter {
                search: Some("a_b".to_owned()),
                ..Default::default()
            },
            ..Default::default()
        };
        let (expenses, total) = fixture.expense_store.query(&query).unwrap();
        assert_eq!(total, 1);
        assert_eq!(expenses[0].description, "item a_b");
    }

    #[test]
    fn query_filters_by_category() {
        let fixture = get_test_fixture();
        let groceries = fixture.create_category("Groceries");
        let transport = fixture.create_category("Transport");
        fixture.create_expense(
            dec!(10),
            "Weekly shop",
            datetime!(2024-03-01 12:00:00 UTC),
            groceries,
            None,
        );
        fixture.create_expense(
            dec!(2.50),
            "Bus fare",
            datetime!(2024-03-01 09:00:00 UTC),
            transport,
            None,
        );

        let query = ExpenseQuery {
            filter: ExpenseFilter {
                category_id: Some(transport),
                ..Default::default()
            },
            ..Default::default()
        };

        let (expenses, total) = fixture.expense_store.query(&query).unwrap();

        assert_eq!(total, 1);
        assert_eq!(expenses[0].description, "Bus fare");
    }

    #[test]
    fn query_sorts_by_exact_decimal_amount() {
        let fixture = get_test_fixture();
        let category_id = fixture.create_category("Groceries");
        for (amount, description) in [(dec!(9.5), "b"), (dec!(10), "c"), (dec!(2), "a")] {
            fixture.create_expense(
                amount,
                description,
                datetime!(2024-03-01 12:00:00 UTC),
                category_id,
                None,
            );
        }

        let query = ExpenseQuery {
            sort_by: SortBy::Amount,
            order: SortOrder::Ascending,
            ..Default::default()
        };

        let (expenses, _) = fixture.expense_store.query(&query).unwrap();

        let descriptions: Vec<_> = expenses
            .iter()
            .map(|expense| expense.description.as_str())
            .collect();
        assert_eq!(descriptions, vec!["a", "b", "c"]);
    }

    #[test]
    fn query_sorts_by_category_name() {
        let fixture = get_test_fixture();
        let transport = fixture.create_category("Transport");
        let bills = fixture.create_category("Bills");
        fixture.create_expense(
            dec!(2.50),
            "Bus fare",
            datetime!(2024-03-01 09:00:00 UTC),
            transport,
            None,
        );
        fixture.create_expense(
            dec!(80),
            "Power",
            datetime!(2024-03-02 09:00:00 UTC),
            bills,
            None,
        );

        let query = ExpenseQuery {
            sort_by: SortBy::Category,
            order: SortOrder::Ascending,
            ..Default::default()
        };

        let (expenses, _) = fixture.expense_store.query(&query).unwrap();

        let categories: Vec<_> = expenses
            .iter()
            .map(|expense| expense.category.name.as_str())
            .collect();
        assert_eq!(categories, vec!["Bills", "Transport"]);
    }

    #[test]
    fn query_pages_through_results() {
        let fixture = get_test_fixture();
        let category_id = fixture.create_category("Groceries");
        for i in 1..=5 {
            fixture.create_expense(
                Decimal::from(i),
                &format!("expense #{i}"),
                datetime!(2024-03-01 00:00:00 UTC) + time::Duration::days(i),
                category_id,
                None,
            );
        }

        let query = ExpenseQuery {
            page: 2,
            limit: 2,
            ..Default::default()
        };

        let (expenses, total) = fixture.expense_store.query(&query).unwrap();

        assert_eq!(total, 5);
        // Default sort is date descending, so page 2 holds expenses #3 and #2.
        let descriptions: Vec<_> = expenses
            .iter()
            .map(|expense| expense.description.as_str())
            .collect();
        assert_eq!(descriptions, vec!["expense #3", "expense #2"]);
    }

    #[test]
    fn query_page_beyond_last_returns_empty_not_error() {
        let fixture = get_test_fixture();
        let category_id = fixture.create_category("Groceries");
        fixture.create_expense(
            dec!(10),
            "Weekly shop",
            datetime!(2024-03-01 12:00:00 UTC),
            category_id,
            None,
        );

        let query = ExpenseQuery {
            page: 99,
            limit: 20,
            ..Default::default()
        };

        let (expenses, total) = fixture.expense_store.query(&query).unwrap();

        assert!(expenses.is_empty());
        assert_eq!(total, 1);
    }

    #[test]
    fn get_filtered_returns_all_matches_without_pagination() {
        let fixture = get_test_fixture();
        let category_id = fixture.create_category("Groceries");
        for i in 1..=60 {
            fixture.create_expense(
                Decimal::from(i),
                &format!("expense #{i}"),
                datetime!(2024-03-01 12:00:00 UTC),
                category_id,
                None,
            );
        }

        let expenses = fixture
            .expense_store
            .get_filtered(&ExpenseFilter::default())
            .unwrap();

        assert_eq!(expenses.len(), 60);
    }
}
