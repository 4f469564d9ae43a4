//! Implements a SQLite backed category store.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row};

use crate::{
    Error,
    models::{Category, CategoryChanges, CategoryData, DatabaseID},
    stores::CategoryStore,
};

/// Creates and retrieves expense categories to/from a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteCategoryStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteCategoryStore {
    /// Create a new category store with a SQLite database.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl CategoryStore for SQLiteCategoryStore {
    fn create(&self, category: CategoryData) -> Result<Category, Error> {
        let connection = self.connection.lock().unwrap();

        connection.execute(
            "INSERT INTO category (name, color, icon) VALUES (?1, ?2, ?3);",
            (&category.name, &category.color, &category.icon),
        )?;

        let id = connection.last_insert_rowid();

        Ok(Category {
            id,
            name: category.name,
            color: category.color,
            icon: category.icon,
        })
    }

    fn get(&self, category_id: DatabaseID) -> Result<Category, Error> {
        let connection = self.connection.lock().unwrap();

        get_category(&connection, category_id)
    }

    fn get_all(&self) -> Result<Vec<Category>, Error> {
        self.connection
            .lock()
            .unwrap()
            .prepare("SELECT id, name, color, icon FROM category ORDER BY name ASC;")?
            .query_map([], map_row)?
            .map(|maybe_category| maybe_category.map_err(|error| error.into()))
            .collect()
    }

    fn update(
        &self,
        category_id: DatabaseID,
        changes: CategoryChanges,
    ) -> Result<Category, Error> {
        let connection = self.connection.lock().unwrap();

        let existing = get_category(&connection, category_id)?;

        let name = changes.name.unwrap_or(existing.name);
        let color = changes.color.unwrap_or(existing.color);
        let icon = changes.icon.unwrap_or(existing.icon);

        connection.execute(
            "UPDATE category SET name = ?1, color = ?2, icon = ?3 WHERE id = ?4;",
            (&name, &color, &icon, category_id),
        )?;

        Ok(Category {
            id: category_id,
            name,
            color,
            icon,
        })
    }

    fn delete(&self, category_id: DatabaseID) -> Result<(), Error> {
        let rows_affected = self
            .connection
            .lock()
            .unwrap()
            .execute("DELETE FROM category WHERE id = ?1;", [category_id])?;

        if rows_affected == 0 {
            return Err(Error::CategoryNotFound);
        }

        Ok(())
    }
}

fn get_category(connection: &Connection, category_id: DatabaseID) -> Result<Category, Error> {
    connection
        .prepare("SELECT id, name, color, icon FROM category WHERE id = :id;")?
        .query_row(&[(":id", &category_id)], map_row)
        .map_err(|error| match Error::from(error) {
            Error::NotFound => Error::CategoryNotFound,
            other => other,
        })
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        color: row.get(2)?,
        icon: row.get(3)?,
    })
}
