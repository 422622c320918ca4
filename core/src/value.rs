//! Raw values written into node fields.
//!
//! A [`Value`] is whatever a producer (typically the parser) hands to a node:
//! a primitive, a wrapped scalar domain value, an explicit ordered sequence,
//! or a sub-node. Text is never a sequence; only [`Value::Seq`] is.
//!
//! Equality delegates to the wrapped primitive, so a wrapped
//! [`Identifier`] equals the same raw text and a [`Singleton`] equals the
//! same boolean or null.

use std::fmt;

use crate::domain::{Identifier, Singleton};
use crate::node::Node;

/// A value that can be stored in a node field.
///
/// # Examples
///
/// ```
/// use node_schema_core::{Identifier, Singleton, Value};
///
/// assert_eq!(Value::from("name"), Value::from(Identifier::new("name").unwrap()));
/// assert_eq!(Value::from(true), Value::from(Singleton::TRUE));
/// assert_ne!(Value::from(0), Value::from(false));
///
/// let seq = Value::seq(["a", "b"]);
/// assert_eq!(seq.to_string(), "['a', 'b']");
/// ```
#[derive(Debug, Clone)]
pub enum Value {
    /// The null value.
    Null,
    /// A boolean.
    Bool(bool),
    /// An integer.
    Int(i64),
    /// A floating point number.
    Float(f64),
    /// Raw text.
    Text(String),
    /// A validated identifier.
    Identifier(Identifier),
    /// A validated singleton.
    Singleton(Singleton),
    /// An explicit ordered sequence.
    Seq(Vec<Value>),
    /// A sub-node, exclusively owned by the slot holding it.
    Node(Box<Node>),
}

impl Value {
    /// Builds a [`Value::Seq`] from anything convertible into values.
    pub fn seq<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Self::Seq(items.into_iter().map(Into::into).collect())
    }

    /// Short name of the value's type, used in diagnostics.
    pub fn type_name(&self) -> &str {
        match self {
            Self::Null => "None",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Identifier(_) => "identifier",
            Self::Singleton(_) => "singleton",
            Self::Seq(_) => "sequence",
            Self::Node(node) => node.kind(),
        }
    }

    /// Returns `true` for [`Value::Seq`].
    pub fn is_seq(&self) -> bool {
        matches!(self, Self::Seq(_))
    }

    /// Borrows the text of a [`Value::Text`] or [`Value::Identifier`].
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Identifier(id) => Some(id.as_str()),
            _ => None,
        }
    }

    /// Returns the boolean-or-null payload of a singleton-domain value.
    pub fn as_singleton(&self) -> Option<Singleton> {
        match self {
            Self::Null => Some(Singleton::NULL),
            Self::Bool(b) => Some(Singleton::from(*b)),
            Self::Singleton(s) => Some(*s),
            _ => None,
        }
    }

    /// Borrows the elements of a [`Value::Seq`].
    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Self::Seq(items) => Some(items),
            _ => None,
        }
    }

    /// Borrows the sub-node of a [`Value::Node`].
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Self::Node(node) => Some(node),
            _ => None,
        }
    }

    /// Mutably borrows the sub-node of a [`Value::Node`].
    pub fn as_node_mut(&mut self) -> Option<&mut Node> {
        match self {
            Self::Node(node) => Some(node),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        if let (Some(a), Some(b)) = (self.as_text(), other.as_text()) {
            return a == b;
        }
        if let (Some(a), Some(b)) = (self.as_singleton(), other.as_singleton()) {
            return a == b;
        }
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Seq(a), Self::Seq(b)) => a == b,
            (Self::Node(a), Self::Node(b)) => a == b,
            _ => false,
        }
    }
}

impl PartialEq<&str> for Value {
    fn eq(&self, other: &&str) -> bool {
        self.as_text() == Some(*other)
    }
}

/// Renders text in single quotes, escaping backslashes and single quotes.
pub(crate) fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('\'');
    for c in text.chars() {
        if matches!(c, '\\' | '\'') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('\'');
    out
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "None"),
            Self::Bool(true) => write!(f, "True"),
            Self::Bool(false) => write!(f, "False"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::Text(text) => write!(f, "{}", quote(text)),
            Self::Identifier(id) => write!(f, "{id}"),
            Self::Singleton(s) => write!(f, "{s}"),
            Self::Seq(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Self::Node(node) => write!(f, "{node}"),
        }
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<Identifier> for Value {
    fn from(id: Identifier) -> Self {
        Self::Identifier(id)
    }
}

impl From<Singleton> for Value {
    fn from(s: Singleton) -> Self {
        Self::Singleton(s)
    }
}

impl From<Node> for Value {
    fn from(node: Node) -> Self {
        Self::Node(Box::new(node))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::Seq(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_is_not_a_sequence() {
        let text = Value::from("abc");
        assert!(!text.is_seq());
        assert!(text.as_seq().is_none());
    }

    #[test]
    fn test_singleton_equality_is_not_truthiness() {
        assert_eq!(Value::Null, Value::from(Singleton::NULL));
        assert_ne!(Value::Null, Value::from(false));
        assert_ne!(Value::from(1), Value::from(true));
        assert_ne!(Value::Seq(vec![]), Value::Null);
    }

    #[test]
    fn test_display_renders_like_literals() {
        let value = Value::seq(vec![
            Value::Null,
            Value::from(true),
            Value::from(2),
            Value::from(0.5),
            Value::from("x"),
        ]);
        assert_eq!(value.to_string(), "[None, True, 2, 0.5, 'x']");
    }

    #[test]
    fn test_display_escapes_quotes_in_text() {
        assert_eq!(Value::from("it's").to_string(), r"'it\'s'");
        assert_eq!(Value::from(r"a\b").to_string(), r"'a\\b'");
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Value::from(1.0).type_name(), "float");
        assert_eq!(Value::seq(Vec::<Value>::new()).type_name(), "sequence");
        assert_eq!(Value::from("t").type_name(), "text");
    }
}
