use std::fmt;

use crate::value::Value;

/// Stored state of one node field.
///
/// The variant always matches the field's multiplicity class: single-valued
/// fields hold [`Slot::Unset`] or [`Slot::Single`], sequence fields always
/// hold [`Slot::Many`], even when empty.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
    /// Single-valued field that was never written.
    Unset,
    /// Single-valued field holding one value.
    Single(Value),
    /// Sequence field holding zero or more values.
    Many(Vec<Value>),
}

impl Slot {
    /// Returns `true` unless the slot is [`Slot::Unset`].
    pub fn is_set(&self) -> bool {
        !matches!(self, Self::Unset)
    }

    /// Borrows the value of a [`Slot::Single`].
    pub fn as_single(&self) -> Option<&Value> {
        match self {
            Self::Single(value) => Some(value),
            _ => None,
        }
    }

    /// Borrows the elements of a [`Slot::Many`].
    pub fn as_many(&self) -> Option<&[Value]> {
        match self {
            Self::Many(items) => Some(items),
            _ => None,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unset => write!(f, "<unset>"),
            Self::Single(value) => write!(f, "{value}"),
            Self::Many(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl PartialEq<Value> for Slot {
    /// A single slot equals its value; a sequence slot equals a
    /// [`Value::Seq`] with the same elements.
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Self::Single(value), other) => value == other,
            (Self::Many(items), Value::Seq(other)) => items == other,
            _ => false,
        }
    }
}

impl PartialEq<&str> for Slot {
    fn eq(&self, other: &&str) -> bool {
        self.as_single().is_some_and(|value| value == other)
    }
}
