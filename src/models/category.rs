//! Defines the `Category` type and the request payloads used to create and
//! update categories.

use serde::{Deserialize, Serialize};

use crate::{Error, error::FieldError, models::DatabaseID};

/// The color assigned to a category when the client does not choose one.
pub const DEFAULT_CATEGORY_COLOR: &str = "#3B82F6";

const MAX_NAME_LENGTH: usize = 50;
const MAX_ICON_LENGTH: usize = 10;

/// A category that groups related expenses, e.g., 'Groceries', 'Transport'.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    /// The ID of the category in the database.
    pub id: DatabaseID,
    /// The display name of the category. Unique across all categories.
    pub name: String,
    /// The hex color (`#RRGGBB`) used to render the category.
    pub color: String,
    /// An optional short glyph or emoji shown next to the name.
    pub icon: Option<String>,
}

/// The client payload for creating a category.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    /// The display name of the category.
    pub name: String,
    /// The hex color for the category. Empty or absent falls back to
    /// [DEFAULT_CATEGORY_COLOR].
    #[serde(default)]
    pub color: Option<String>,
    /// An optional short glyph or emoji. Empty strings are treated as
    /// absent.
    #[serde(default)]
    pub icon: Option<String>,
}

/// A validated, normalized category ready to be written to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryData {
    /// The display name of the category.
    pub name: String,
    /// The hex color for the category.
    pub color: String,
    /// An optional short glyph or emoji.
    pub icon: Option<String>,
}

impl NewCategory {
    /// Validate the payload and normalize it into a [CategoryData].
    ///
    /// # Errors
    /// Returns [Error::InvalidInput] with one entry per offending field.
    pub fn validate(self) -> Result<CategoryData, Error> {
        let mut errors = Vec::new();

        validate_name(&self.name, &mut errors);
        validate_color(self.color.as_deref(), &mut errors);
        validate_icon(self.icon.as_deref(), &mut errors);

        if !errors.is_empty() {
            return Err(Error::InvalidInput(errors));
        }

        Ok(CategoryData {
            name: self.name,
            color: normalize_color(self.color),
            icon: normalize_optional_text(self.icon),
        })
    }
}

/// The client payload for partially updating a category.
///
/// Absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryUpdate {
    /// The new display name, if it should change.
    #[serde(default)]
    pub name: Option<String>,
    /// The new hex color, if it should change. An empty string resets the
    /// color to [DEFAULT_CATEGORY_COLOR].
    #[serde(default)]
    pub color: Option<String>,
    /// The new icon, if it should change. An empty string clears the icon.
    #[serde(default)]
    pub icon: Option<String>,
}

/// The validated field changes to apply to an existing category.
///
/// `None` means the field keeps its current value. For `icon`,
/// `Some(None)` clears the stored icon.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryChanges {
    /// The new display name.
    pub name: Option<String>,
    /// The new hex color.
    pub color: Option<String>,
    /// The new icon, or `Some(None)` to clear it.
    pub icon: Option<Option<String>>,
}

impl CategoryUpdate {
    /// Validate the payload and normalize it into a [CategoryChanges].
    ///
    /// # Errors
    /// Returns [Error::InvalidInput] with one entry per offending field.
    pub fn validate(self) -> Result<CategoryChanges, Error> {
        let mut errors = Vec::new();

        if let Some(name) = &self.name {
            validate_name(name, &mut errors);
        }
        validate_color(self.color.as_deref(), &mut errors);
        validate_icon(self.icon.as_deref(), &mut errors);

        if !errors.is_empty() {
            return Err(Error::InvalidInput(errors));
        }

        Ok(CategoryChanges {
            name: self.name,
            color: self.color.map(|color| {
                if color.is_empty() {
                    DEFAULT_CATEGORY_COLOR.to_owned()
                } else {
                    color
                }
            }),
            icon: self.icon.map(|icon| {
                if icon.is_empty() { None } else { Some(icon) }
            }),
        })
    }
}

fn validate_name(name: &str, errors: &mut Vec<FieldError>) {
    if name.is_empty() {
        errors.push(FieldError::new("name", "Category name is required"));
    } else if name.chars().count() > MAX_NAME_LENGTH {
        errors.push(FieldError::new(
            "name",
            "Category name must be less than 50 characters",
        ));
    }
}

fn validate_color(color: Option<&str>, errors: &mut Vec<FieldError>) {
    if let Some(color) = color
        && !color.is_empty()
        && !is_hex_color(color)
    {
        errors.push(FieldError::new("color", "Color must be a valid hex color"));
    }
}

fn validate_icon(icon: Option<&str>, errors: &mut Vec<FieldError>) {
    if let Some(icon) = icon
        && icon.chars().count() > MAX_ICON_LENGTH
    {
        errors.push(FieldError::new(
            "icon",
            "Icon must be less than 10 characters",
        ));
    }
}

fn is_hex_color(value: &str) -> bool {
    let Some(digits) = value.strip_prefix('#') else {
        return false;
    };

    digits.len() == 6 && digits.chars().all(|c| c.is_ascii_hexdigit())
}

fn normalize_color(color: Option<String>) -> String {
    match color {
        Some(color) if !color.is_empty() => color,
        _ => DEFAULT_CATEGORY_COLOR.to_owned(),
    }
}

fn normalize_optional_text(text: Option<String>) -> Option<String> {
    text.filter(|text| !text.is_empty())
}

#[cfg(test)]
mod category_validation_tests {
    use crate::Error;

    use super::{CategoryUpdate, DEFAULT_CATEGORY_COLOR, NewCategory};

    fn new_category(name: &str, color: Option<&str>, icon: Option<&str>) -> NewCategory {
        NewCategory {
            name: name.to_owned(),
            color: color.map(str::to_owned),
            icon: icon.map(str::to_owned),
        }
    }

    #[test]
    fn valid_payload_passes_through() {
        let data = new_category("Groceries", Some("#FF6B6B"), Some("🍔"))
            .validate()
            .unwrap();

        assert_eq!(data.name, "Groceries");
        assert_eq!(data.color, "#FF6B6B");
        assert_eq!(data.icon.as_deref(), Some("🍔"));
    }

    #[test]
    fn missing_color_falls_back_to_default() {
        let data = new_category("Groceries", None, None).validate().unwrap();

        assert_eq!(data.color, DEFAULT_CATEGORY_COLOR);
        assert_eq!(data.icon, None);
    }

    #[test]
    fn empty_color_and_icon_are_treated_as_absent() {
        let data = new_category("Groceries", Some(""), Some(""))
            .validate()
            .unwrap();

        assert_eq!(data.color, DEFAULT_CATEGORY_COLOR);
        assert_eq!(data.icon, None);
    }

    #[test]
    fn empty_name_is_rejected() {
        let result = new_category("", None, None).validate();

        let Err(Error::InvalidInput(errors)) = result else {
            panic!("want invalid input error, got {result:?}");
        };
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "name");
    }

    #[test]
    fn overlong_name_is_rejected() {
        let name = "x".repeat(51);

        let result = new_category(&name, None, None).validate();

        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn malformed_color_is_rejected() {
        for color in ["3B82F6", "#3B82F", "#GGGGGG", "#3B82F6A"] {
            let result = new_category("Groceries", Some(color), None).validate();

            assert!(
                matches!(result, Err(Error::InvalidInput(_))),
                "color {color:?} should be rejected"
            );
        }
    }

    #[test]
    fn multiple_failures_report_each_field() {
        let result = new_category("", Some("nope"), Some("12345678901")).validate();

        let Err(Error::InvalidInput(errors)) = result else {
            panic!("want invalid input error, got {result:?}");
        };
        let fields: Vec<_> = errors.iter().map(|error| error.field).collect();
        assert_eq!(fields, vec!["name", "color", "icon"]);
    }

    #[test]
    fn update_with_empty_icon_clears_it() {
        let update = CategoryUpdate {
            icon: Some(String::new()),
            ..Default::default()
        };

        let changes = update.validate().unwrap();

        assert_eq!(changes.icon, Some(None));
        assert_eq!(changes.name, None);
    }

    #[test]
    fn update_with_empty_name_is_rejected() {
        let update = CategoryUpdate {
            name: Some(String::new()),
            ..Default::default()
        };

        assert!(matches!(update.validate(), Err(Error::InvalidInput(_))));
    }
}
