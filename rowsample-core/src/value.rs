//! Raw field values as delivered by an upstream row source

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A single untyped field value in an incoming row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    /// No value
    Null,

    /// Boolean value
    Boolean(bool),

    /// 64-bit signed integer
    Integer(i64),

    /// 64-bit floating point number
    Number(f64),

    /// UTF-8 string
    String(String),

    /// Calendar date and time without timezone
    Date(NaiveDateTime),
}

/// An ordered sequence of field values, one per schema column
pub type RawRow = Vec<FieldValue>;

impl FieldValue {
    /// Check whether this value counts as absent (null or the empty string)
    pub fn is_missing(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::String(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Canonical string form used to key categorical dictionaries.
    ///
    /// Returns `None` for missing values, which never enter a dictionary.
    pub fn canonical_string(&self) -> Option<String> {
        match self {
            FieldValue::Null => None,
            FieldValue::String(s) if s.is_empty() => None,
            FieldValue::String(s) => Some(s.clone()),
            FieldValue::Boolean(b) => Some(b.to_string()),
            FieldValue::Integer(i) => Some(i.to_string()),
            FieldValue::Number(n) => Some(n.to_string()),
            FieldValue::Date(d) => Some(d.format("%Y-%m-%dT%H:%M:%S%.f").to_string()),
        }
    }

    /// Short name of the variant, used in error messages
    pub fn variant_name(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Boolean(_) => "boolean",
            FieldValue::Integer(_) => "integer",
            FieldValue::Number(_) => "number",
            FieldValue::String(_) => "string",
            FieldValue::Date(_) => "date",
        }
    }
}

/// Decode a textual boolean: `true`/`y`/`yes`/`1` or `false`/`n`/`no`/`0`,
/// ignoring case and surrounding whitespace
pub fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "y" | "yes" | "1" => Some(true),
        "false" | "n" | "no" | "0" => Some(false),
        _ => None,
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.canonical_string() {
            Some(s) => write!(f, "{}", s),
            None => write!(f, "<null>"),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<NaiveDateTime> for FieldValue {
    fn from(value: NaiveDateTime) -> Self {
        FieldValue::Date(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_missing_values() {
        assert!(FieldValue::Null.is_missing());
        assert!(FieldValue::from("").is_missing());
        assert!(!FieldValue::from("x").is_missing());
        assert!(!FieldValue::Number(0.0).is_missing());
        assert!(!FieldValue::Number(f64::NAN).is_missing());
    }

    #[test]
    fn test_canonical_string() {
        assert_eq!(FieldValue::from("red").canonical_string().as_deref(), Some("red"));
        assert_eq!(FieldValue::Integer(-3).canonical_string().as_deref(), Some("-3"));
        assert_eq!(FieldValue::Number(1.5).canonical_string().as_deref(), Some("1.5"));
        assert_eq!(FieldValue::Boolean(true).canonical_string().as_deref(), Some("true"));
        assert_eq!(FieldValue::Null.canonical_string(), None);
        assert_eq!(FieldValue::from("").canonical_string(), None);

        let date = NaiveDate::from_ymd_opt(2019, 3, 4)
            .unwrap()
            .and_hms_opt(5, 6, 7)
            .unwrap();
        assert_eq!(
            FieldValue::Date(date).canonical_string().as_deref(),
            Some("2019-03-04T05:06:07")
        );
    }

    #[test]
    fn test_parse_bool() {
        for text in ["true", "Y", " yes ", "1"] {
            assert_eq!(parse_bool(text), Some(true), "{}", text);
        }
        for text in ["FALSE", "n", "No", "0"] {
            assert_eq!(parse_bool(text), Some(false), "{}", text);
        }
        assert_eq!(parse_bool("maybe"), None);
        assert_eq!(parse_bool(""), None);
    }

    #[test]
    fn test_option_conversion() {
        assert_eq!(FieldValue::from(None::<i64>), FieldValue::Null);
        assert_eq!(FieldValue::from(Some(2.0)), FieldValue::Number(2.0));
    }
}
