//! Restricted scalar domains.
//!
//! [`Identifier`] and [`Singleton`] wrap a primitive but only accept a
//! validated subset of its values. Each domain also exposes a membership
//! predicate that works on raw values, so a field typed as `identifier` can
//! accept plain text that happens to match the grammar without the producer
//! wrapping it first.
//!
//! # Examples
//!
//! ```
//! use node_schema_core::{is_identifier, Identifier, Singleton, Value};
//!
//! assert!(is_identifier("虎"));
//! assert!(!is_identifier("in_valid._attr_"));
//!
//! let name = Identifier::new("valid_name").unwrap();
//! assert_eq!(name, "valid_name");
//! assert_eq!(name.to_string(), "'valid_name'");
//!
//! assert!(Singleton::admits(&Value::Null));
//! assert!(!Singleton::admits(&Value::Int(0)));
//! ```

use std::fmt;
use std::ops::Deref;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::WrongValueError;
use crate::value::{Value, quote};

/// Returns `true` if `text` matches identifier grammar.
///
/// The first character must be a letter (any script) or `_`; the rest may
/// be letters, digits, or `_`. The empty string is not an identifier.
///
/// # Examples
///
/// ```
/// use node_schema_core::is_identifier;
///
/// assert!(is_identifier("Valid_1_name"));
/// assert!(is_identifier("_valid_name_"));
/// assert!(!is_identifier("Invalid name"));
/// assert!(!is_identifier("invalid.attr"));
/// assert!(!is_identifier("1st"));
/// assert!(!is_identifier(""));
/// ```
pub fn is_identifier(text: &str) -> bool {
    // SAFETY: compile-time constant pattern, covered by tests.
    static IDENTIFIER_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^[\p{L}_][\p{L}\p{Nd}_]*$").expect("static regex must compile")
    });
    IDENTIFIER_RE.is_match(text)
}

/// Text constrained to identifier grammar.
///
/// Compares equal to the raw text it wraps and renders in quoted form.
///
/// # Examples
///
/// ```
/// use node_schema_core::Identifier;
///
/// let id = Identifier::new("camelCase").unwrap();
/// assert_eq!(id, "camelCase");
/// assert_eq!(id.len(), 9);
/// assert_eq!(format!("{id}"), "'camelCase'");
///
/// assert!(Identifier::new("Invalid name").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier(String);

impl Identifier {
    /// Validates `text` and wraps it.
    ///
    /// # Errors
    ///
    /// Returns [`WrongValueError`] if `text` does not match identifier
    /// grammar.
    pub fn new(text: impl Into<String>) -> Result<Self, WrongValueError> {
        let text = text.into();
        if is_identifier(&text) {
            Ok(Self(text))
        } else {
            Err(WrongValueError::new("identifier", quote(&text)))
        }
    }

    /// Returns `true` if a raw value belongs to the identifier domain.
    ///
    /// Accepts wrapped identifiers and text matching the grammar.
    pub fn admits(value: &Value) -> bool {
        match value {
            Value::Identifier(_) => true,
            Value::Text(text) => is_identifier(text),
            _ => false,
        }
    }

    /// Borrows the wrapped text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Unwraps into the underlying text.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Deref for Identifier {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}'", self.0)
    }
}

impl PartialEq<str> for Identifier {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for Identifier {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl PartialEq<String> for Identifier {
    fn eq(&self, other: &String) -> bool {
        &self.0 == other
    }
}

impl PartialEq<Identifier> for str {
    fn eq(&self, other: &Identifier) -> bool {
        self == other.0
    }
}

impl PartialEq<Identifier> for &str {
    fn eq(&self, other: &Identifier) -> bool {
        *self == other.0
    }
}

impl TryFrom<String> for Identifier {
    type Error = WrongValueError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        Self::new(text)
    }
}

impl TryFrom<&str> for Identifier {
    type Error = WrongValueError;

    fn try_from(text: &str) -> Result<Self, Self::Error> {
        Self::new(text)
    }
}

impl TryFrom<Value> for Identifier {
    type Error = WrongValueError;

    /// Fails for any value that is not text, and for text outside the
    /// grammar.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Identifier(id) => Ok(id),
            Value::Text(text) => Self::new(text),
            other => Err(WrongValueError::new("identifier", other.to_string())),
        }
    }
}

impl From<Identifier> for String {
    fn from(id: Identifier) -> Self {
        id.0
    }
}

/// One of `true`, `false`, or the null value.
///
/// Nothing else is a singleton: not `0`, not `1`, not empty text or an empty
/// sequence, whatever their truthiness elsewhere.
///
/// # Examples
///
/// ```
/// use node_schema_core::{Singleton, Value};
///
/// assert_eq!(Singleton::new(Some(true)), true);
/// assert_eq!(Singleton::NULL.to_string(), "None");
///
/// assert!(Singleton::try_from(Value::Bool(false)).is_ok());
/// assert!(Singleton::try_from(Value::Int(0)).is_err());
/// assert!(Singleton::try_from(Value::Seq(vec![])).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Singleton(Option<bool>);

impl Singleton {
    /// `true`.
    pub const TRUE: Self = Self(Some(true));
    /// `false`.
    pub const FALSE: Self = Self(Some(false));
    /// The null value.
    pub const NULL: Self = Self(None);

    /// Wraps a boolean or the null value. Every input is in the domain.
    pub const fn new(value: Option<bool>) -> Self {
        Self(value)
    }

    /// Returns `true` if a raw value belongs to the singleton domain.
    pub fn admits(value: &Value) -> bool {
        matches!(value, Value::Singleton(_) | Value::Bool(_) | Value::Null)
    }

    /// Returns the wrapped value.
    pub const fn get(self) -> Option<bool> {
        self.0
    }

    /// Returns `true` for the null value.
    pub const fn is_null(self) -> bool {
        self.0.is_none()
    }
}

impl fmt::Display for Singleton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(true) => write!(f, "True"),
            Some(false) => write!(f, "False"),
            None => write!(f, "None"),
        }
    }
}

impl From<bool> for Singleton {
    fn from(value: bool) -> Self {
        Self(Some(value))
    }
}

impl From<Option<bool>> for Singleton {
    fn from(value: Option<bool>) -> Self {
        Self(value)
    }
}

impl PartialEq<bool> for Singleton {
    fn eq(&self, other: &bool) -> bool {
        self.0 == Some(*other)
    }
}

impl PartialEq<Option<bool>> for Singleton {
    fn eq(&self, other: &Option<bool>) -> bool {
        self.0 == *other
    }
}

impl TryFrom<Value> for Singleton {
    type Error = WrongValueError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Singleton(s) => Ok(s),
            Value::Bool(b) => Ok(Self(Some(b))),
            Value::Null => Ok(Self::NULL),
            other => Err(WrongValueError::new("singleton", other.to_string())),
        }
    }
}
