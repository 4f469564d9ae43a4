//! Defines the category store trait.

use crate::{
    Error,
    models::{Category, CategoryChanges, CategoryData, DatabaseID},
};

/// Creates and retrieves the categories that expenses are grouped into.
pub trait CategoryStore {
    /// Create a new category and add it to the store.
    ///
    /// # Errors
    /// Returns [Error::DuplicateCategoryName] if a category with the same
    /// name already exists.
    fn create(&self, category: CategoryData) -> Result<Category, Error>;

    /// Get a category by its ID.
    ///
    /// # Errors
    /// Returns [Error::CategoryNotFound] if `category_id` does not refer to
    /// a category in the store.
    fn get(&self, category_id: DatabaseID) -> Result<Category, Error>;

    /// Get all categories, ordered by name ascending.
    fn get_all(&self) -> Result<Vec<Category>, Error>;

    /// Apply `changes` to the category with `category_id` and return the
    /// updated category.
    ///
    /// # Errors
    /// Returns [Error::CategoryNotFound] if the category does not exist, or
    /// [Error::DuplicateCategoryName] if the new name is already taken.
    fn update(&self, category_id: DatabaseID, changes: CategoryChanges)
    -> Result<Category, Error>;

    /// Delete the category with `category_id`.
    ///
    /// Deleting a category also deletes every expense that references it.
    ///
    /// # Errors
    /// Returns [Error::CategoryNotFound] if the category does not exist.
    fn delete(&self, category_id: DatabaseID) -> Result<(), Error>;
}
