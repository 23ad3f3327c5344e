//! Core category domain types.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

/// A validated, non-empty category name.
///
/// Names are compared case-insensitively by the database, so "food" and
/// "Food" refer to the same category.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryName(String);

impl CategoryName {
    /// Create a category name.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyCategoryName] if `name` is an empty string.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyCategoryName)
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a category name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because if the non-empty invariant is violated it will cause incorrect behaviour but not affect memory safety.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for CategoryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for CategoryName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CategoryName::new(s)
    }
}

impl Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A validated display color in the form `#rrggbb`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct CategoryColor(String);

impl CategoryColor {
    /// Create a category color from a hex code such as `#1f77b4`.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::InvalidColor] if `color` is not
    /// a `#` followed by six hex digits.
    pub fn new(color: &str) -> Result<Self, Error> {
        let color = color.trim();

        let is_hex_code = color.len() == 7
            && color.starts_with('#')
            && color.chars().skip(1).all(|c| c.is_ascii_hexdigit());

        if is_hex_code {
            Ok(Self(color.to_ascii_lowercase()))
        } else {
            Err(Error::InvalidColor(color.to_string()))
        }
    }

    /// Create a category color without validation.
    ///
    /// The caller should ensure that the string is a valid hex code.
    pub fn new_unchecked(color: &str) -> Self {
        Self(color.to_string())
    }
}

impl AsRef<str> for CategoryColor {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for CategoryColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Database identifier for a category.
pub type CategoryId = i64;

/// A user-defined label with a color, used to classify expenses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct Category {
    /// The ID of the category.
    pub id: CategoryId,
    /// The name of the category, unique ignoring case.
    pub name: CategoryName,
    /// The display color used for the category in tables and charts.
    pub color: CategoryColor,
}

/// The categories seeded into an empty database, from the original
/// D-Tracker defaults.
pub const DEFAULT_CATEGORIES: [(&str, &str); 8] = [
    ("Food", "#ff7f0e"),
    ("Transport", "#2ca02c"),
    ("Housing", "#d62728"),
    ("Health", "#9467bd"),
    ("Leisure", "#8c564b"),
    ("Shopping", "#e377c2"),
    ("Education", "#7f7f7f"),
    ("Other", "#bcbd22"),
];

/// Form data for category creation and editing.
#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryFormData {
    pub name: String,
    pub color: String,
}

/// Form data for merging one category into another.
#[derive(Debug, Serialize, Deserialize)]
pub struct MergeFormData {
    pub target_id: CategoryId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

/// Form data for reassigning a category's expenses before deleting it.
#[derive(Debug, Serialize, Deserialize)]
pub struct ReassignFormData {
    pub target_id: CategoryId,
}


#[cfg(test)]
mod category_color_tests {
    use crate::{Error, category::CategoryColor};

    #[test]
    fn new_accepts_hex_code() {
        let color = CategoryColor::new("#1f77b4").unwrap();

        assert_eq!(color.as_ref(), "#1f77b4");
    }

    #[test]
    fn new_lowercases_hex_code() {
        let color = CategoryColor::new("#FF7F0E").unwrap();

        assert_eq!(color.as_ref(), "#ff7f0e");
    }

    #[test]
    fn new_rejects_missing_hash() {
        let color = CategoryColor::new("1f77b4");

        assert_eq!(color, Err(Error::InvalidColor("1f77b4".to_string())));
    }

    #[test]
    fn new_rejects_short_code() {
        let color = CategoryColor::new("#fff");

        assert_eq!(color, Err(Error::InvalidColor("#fff".to_string())));
    }

    #[test]
    fn new_rejects_non_hex_digits() {
        let color = CategoryColor::new("#12345g");

        assert_eq!(color, Err(Error::InvalidColor("#12345g".to_string())));
    }
}
