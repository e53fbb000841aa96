//! Core types used throughout the project.

use std::collections::{
    BTreeMap,
    HashMap,
};
use std::fmt;

use serde::{
    Deserialize,
    Serialize,
};

/// Separator between key path segments in a flattened key.
pub const KEY_SEPARATOR: char = '.';

/// A translated value: either a single string or an ordered list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Leaf {
    Text(String),
    List(Vec<String>),
}

impl Leaf {
    /// Returns true for the sequence form.
    #[must_use]
    pub const fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }
}

impl From<&str> for Leaf {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Leaf {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<String>> for Leaf {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

/// A node of a translation tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Node {
    Leaf(Leaf),
    Branch(Tree),
}

/// Nested translation data.
///
/// `BTreeMap` keeps keys sorted at every level so serialized files diff cleanly.
pub type Tree = BTreeMap<String, Node>;

/// Flattened translation key map (e.g., "site.title" -> "Title").
pub type FlatMap = HashMap<String, Leaf>;

/// A language offered by the upstream platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageRecord {
    /// Lowercase language code, e.g. "pt-br".
    pub code: String,
    pub name: String,
}

impl LanguageRecord {
    #[must_use]
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self { code: code.into().to_lowercase(), name: name.into() }
    }
}

impl fmt::Display for LanguageRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.code, self.name)
    }
}

/// Converts an upstream language code to the local file naming convention.
///
/// The segment after the first hyphen is uppercased.
///
/// # Examples
/// ```
/// use locale_sync::types::destination_code;
///
/// assert_eq!(destination_code("pt-br"), "pt-BR");
/// assert_eq!(destination_code("de"), "de");
/// ```
#[must_use]
pub fn destination_code(code: &str) -> String {
    match code.split_once('-') {
        Some((language, region)) => format!("{language}-{}", region.to_uppercase()),
        None => code.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("de", "de")]
    #[case("pt-br", "pt-BR")]
    #[case("zh-hant", "zh-HANT")]
    #[case("be-tarask", "be-TARASK")]
    fn test_destination_code(#[case] code: &str, #[case] expected: &str) {
        assert_eq!(destination_code(code), expected);
    }

    #[test]
    fn test_language_record_lowercases_code() {
        let record = LanguageRecord::new("PT-BR", "Português do Brasil");

        assert_eq!(record.code, "pt-br");
        assert_eq!(record.to_string(), "pt-br (Português do Brasil)");
    }

    #[test]
    fn test_leaf_is_list() {
        assert!(Leaf::List(vec!["a".to_string()]).is_list());
        assert!(!Leaf::from("a").is_list());
    }
}
