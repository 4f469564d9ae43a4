//! Sets up the application's SQLite database schema.

use rusqlite::Connection;

use crate::Error;

/// Create the application tables if they do not already exist.
///
/// Also enables foreign key enforcement for `connection`, which SQLite
/// scopes to the connection rather than the database file. Deleting a
/// category cascades to its expenses.
///
/// # Errors
/// Returns an [Error::SqlError] if the schema could not be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.execute_batch(
        "PRAGMA foreign_keys = ON;

        CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            color TEXT NOT NULL,
            icon TEXT
        );

        CREATE TABLE IF NOT EXISTS expense (
            id INTEGER PRIMARY KEY,
            amount TEXT NOT NULL,
            description TEXT NOT NULL,
            date TEXT NOT NULL,
            category_id INTEGER NOT NULL,
            notes TEXT,
            FOREIGN KEY (category_id) REFERENCES category(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_expense_date ON expense(date);
        CREATE INDEX IF NOT EXISTS idx_expense_category_id ON expense(category_id);",
    )?;

    Ok(())
}
