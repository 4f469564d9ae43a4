//! Defines the `Expense` type and the request payloads used to create and
//! update expenses.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime, Time, format_description::well_known::Rfc3339, macros::format_description};

use crate::{
    Error,
    error::FieldError,
    models::{Category, DatabaseID},
};

const MAX_DESCRIPTION_LENGTH: usize = 200;
const MAX_NOTES_LENGTH: usize = 1000;

/// A single expense record, joined with its category.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    /// The ID of the expense in the database.
    pub id: DatabaseID,
    /// The monetary amount of the expense. Always positive.
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub amount: Decimal,
    /// A short description of what the expense was for.
    pub description: String,
    /// When the expense occurred.
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    /// The ID of the category the expense belongs to.
    pub category_id: DatabaseID,
    /// Optional free-form notes.
    pub notes: Option<String>,
    /// The category the expense belongs to.
    pub category: Category,
}

/// The client payload for creating an expense.
///
/// All fields are optional at the serde level so that missing fields
/// surface as field-level validation errors rather than a deserialization
/// failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExpense {
    /// The monetary amount. Must be greater than zero.
    #[serde(default, with = "rust_decimal::serde::arbitrary_precision_option")]
    pub amount: Option<Decimal>,
    /// A short description of the expense.
    #[serde(default)]
    pub description: Option<String>,
    /// When the expense occurred, as an RFC 3339 timestamp or a plain
    /// `YYYY-MM-DD` date.
    #[serde(default)]
    pub date: Option<String>,
    /// The ID of the category the expense belongs to.
    #[serde(default)]
    pub category_id: Option<DatabaseID>,
    /// Optional free-form notes. Empty strings are treated as absent.
    #[serde(default)]
    pub notes: Option<String>,
}

/// A validated expense ready to be written to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseData {
    /// The monetary amount of the expense.
    pub amount: Decimal,
    /// A short description of the expense.
    pub description: String,
    /// When the expense occurred.
    pub date: OffsetDateTime,
    /// The ID of the category the expense belongs to.
    pub category_id: DatabaseID,
    /// Optional free-form notes.
    pub notes: Option<String>,
}

impl NewExpense {
    /// Validate the payload and normalize it into an [ExpenseData].
    ///
    /// # Errors
    /// Returns [Error::InvalidInput] with one entry per offending field.
    pub fn validate(self) -> Result<ExpenseData, Error> {
        let mut errors = Vec::new();

        let amount = match self.amount {
            Some(amount) => {
                validate_amount(amount, &mut errors);
                amount
            }
            None => {
                errors.push(FieldError::new("amount", "Amount is required"));
                Decimal::ZERO
            }
        };

        let description = self.description.unwrap_or_default();
        validate_description(&description, &mut errors);

        let date = match self.date.as_deref() {
            Some(raw) => match parse_start_timestamp(raw) {
                Some(date) => date,
                None => {
                    errors.push(FieldError::new("date", "Invalid date format"));
                    OffsetDateTime::UNIX_EPOCH
                }
            },
            None => {
                errors.push(FieldError::new("date", "Date is required"));
                OffsetDateTime::UNIX_EPOCH
            }
        };

        let category_id = match self.category_id {
            Some(category_id) => category_id,
            None => {
                errors.push(FieldError::new("categoryId", "Category is required"));
                0
            }
        };

        validate_notes(self.notes.as_deref(), &mut errors);

        if !errors.is_empty() {
            return Err(Error::InvalidInput(errors));
        }

        Ok(ExpenseData {
            amount,
            description,
            date,
            category_id,
            notes: self.notes.filter(|notes| !notes.is_empty()),
        })
    }
}

/// The client payload for partially updating an expense.
///
/// Absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseUpdate {
    /// The new amount, if it should change.
    #[serde(default, with = "rust_decimal::serde::arbitrary_precision_option")]
    pub amount: Option<Decimal>,
    /// The new description, if it should change.
    #[serde(default)]
    pub description: Option<String>,
    /// The new timestamp, if it should change.
    #[serde(default)]
    pub date: Option<String>,
    /// The new category, if it should change.
    #[serde(default)]
    pub category_id: Option<DatabaseID>,
    /// The new notes, if they should change. An empty string clears the
    /// stored notes.
    #[serde(default)]
    pub notes: Option<String>,
}

/// The validated field changes to apply to an existing expense.
///
/// `None` means the field keeps its current value. For `notes`,
/// `Some(None)` clears the stored notes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseChanges {
    /// The new amount.
    pub amount: Option<Decimal>,
    /// The new description.
    pub description: Option<String>,
    /// The new timestamp.
    pub date: Option<OffsetDateTime>,
    /// The new category ID.
    pub category_id: Option<DatabaseID>,
    /// The new notes, or `Some(None)` to clear them.
    pub notes: Option<Option<String>>,
}

impl ExpenseUpdate {
    /// Validate the payload and normalize it into an [ExpenseChanges].
    ///
    /// # Errors
    /// Returns [Error::InvalidInput] with one entry per offending field.
    pub fn validate(self) -> Result<ExpenseChanges, Error> {
        let mut errors = Vec::new();

        if let Some(amount) = self.amount {
            validate_amount(amount, &mut errors);
        }

        if let Some(description) = &self.description {
            validate_description(description, &mut errors);
        }

        let date = match self.date.as_deref() {
            Some(raw) => match parse_start_timestamp(raw) {
                Some(date) => Some(date),
                None => {
                    errors.push(FieldError::new("date", "Invalid date format"));
                    None
                }
            },
            None => None,
        };

        validate_notes(self.notes.as_deref(), &mut errors);

        if !errors.is_empty() {
            return Err(Error::InvalidInput(errors));
        }

        Ok(ExpenseChanges {
            amount: self.amount,
            description: self.description,
            date,
            category_id: self.category_id,
            notes: self.notes.map(|notes| {
                if notes.is_empty() { None } else { Some(notes) }
            }),
        })
    }
}

fn validate_amount(amount: Decimal, errors: &mut Vec<FieldError>) {
    if amount <= Decimal::ZERO {
        errors.push(FieldError::new("amount", "Amount must be greater than 0"));
    }
}

fn validate_description(description: &str, errors: &mut Vec<FieldError>) {
    if description.is_empty() {
        errors.push(FieldError::new("description", "Description is required"));
    } else if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        errors.push(FieldError::new(
            "description",
            "Description must be less than 200 characters",
        ));
    }
}

fn validate_notes(notes: Option<&str>, errors: &mut Vec<FieldError>) {
    if let Some(notes) = notes
        && notes.chars().count() > MAX_NOTES_LENGTH
    {
        errors.push(FieldError::new(
            "notes",
            "Notes must be less than 1000 characters",
        ));
    }
}

/// Parse a timestamp used as the start of an inclusive range.
///
/// Accepts an RFC 3339 timestamp or a plain `YYYY-MM-DD` date; a plain date
/// resolves to the start of that calendar day in UTC.
pub(crate) fn parse_start_timestamp(raw: &str) -> Option<OffsetDateTime> {
    if let Ok(datetime) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(datetime);
    }

    parse_date_only(raw).map(|date| date.midnight().assume_utc())
}

/// Parse a timestamp used as the end of an inclusive range.
///
/// Accepts an RFC 3339 timestamp or a plain `YYYY-MM-DD` date; a plain date
/// resolves to the end of that calendar day in UTC so that the whole day is
/// covered by the range.
pub(crate) fn parse_end_timestamp(raw: &str) -> Option<OffsetDateTime> {
    if let Ok(datetime) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(datetime);
    }

    parse_date_only(raw).map(|date| date.with_time(Time::MAX).assume_utc())
}

fn parse_date_only(raw: &str) -> Option<Date> {
    Date::parse(raw, format_description!("[year]-[month]-[day]")).ok()
}
