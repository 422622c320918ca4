//! Error taxonomy for domain values, field writes, and tree structure.
//!
//! Three tiers, from narrowest to broadest:
//!
//! - [`WrongValueError`]: a scalar domain ([`Identifier`](crate::Identifier),
//!   [`Singleton`](crate::Singleton)) was constructed from a value outside
//!   the domain.
//! - [`WrongTypeError`]: a field write supplied a value whose type or shape
//!   does not match the field specification.
//! - [`TreeError`]: the base category. Covers finalize-time cardinality
//!   failures, unknown fields and kinds, registry declaration problems, and
//!   wraps the two narrower errors so callers can handle everything at once.
//!
//! # Examples
//!
//! ```
//! use node_schema_core::{Identifier, TreeError};
//!
//! let err = Identifier::new("not an identifier").unwrap_err();
//! let tree_err: TreeError = err.into();
//! assert!(tree_err.is_wrong_value());
//! ```

use thiserror::Error;

/// A scalar domain rejected the supplied primitive.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{value} is not a valid {domain}")]
pub struct WrongValueError {
    /// Domain that rejected the value (`"identifier"`, `"singleton"`).
    pub domain: &'static str,
    /// Rendering of the rejected value.
    pub value: String,
}

impl WrongValueError {
    pub(crate) fn new(domain: &'static str, value: impl Into<String>) -> Self {
        Self {
            domain,
            value: value.into(),
        }
    }
}

/// Why a field write was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WrongTypeReason {
    /// A sequence field received a bare value (text included).
    ExpectedSequence,
    /// A single-valued field received a sequence.
    ExpectedSingle,
    /// The value is not a member of any accepted type.
    NotAdmitted {
        /// Accepted types, rendered as in the declaration.
        expected: String,
    },
    /// One element of a sequence is not a member of any accepted type.
    ElementNotAdmitted {
        /// Position of the offending element.
        index: usize,
        /// Accepted types, rendered as in the declaration.
        expected: String,
    },
}

impl std::fmt::Display for WrongTypeReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ExpectedSequence => write!(f, "expected a sequence"),
            Self::ExpectedSingle => write!(f, "expected a single value, got a sequence"),
            Self::NotAdmitted { expected } => write!(f, "expected {expected}"),
            Self::ElementNotAdmitted { index, expected } => {
                write!(f, "element {index} is not {expected}")
            }
        }
    }
}

/// A field write was rejected because of a type or shape mismatch.
///
/// The field keeps its previous value whenever this error is returned.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}.{field}: {reason} (got {value})")]
pub struct WrongTypeError {
    /// Node kind owning the field.
    pub kind: String,
    /// Field that was written.
    pub field: String,
    /// Rendering of the offending value or element.
    pub value: String,
    /// What was wrong with it.
    pub reason: WrongTypeReason,
}

/// Base error category for node trees and schemas.
///
/// # Examples
///
/// ```
/// use node_schema_core::*;
///
/// let mut registry = SchemaRegistry::new();
/// registry
///     .register(NodeSchema::new("Name").with_field(FieldSpec::needed("id", FieldType::Identifier)))
///     .unwrap();
/// let registry = registry.seal().unwrap();
///
/// let node = registry.node("Name").unwrap();
/// match node.finalize() {
///     Err(TreeError::Incomplete { kind, fields }) => {
///         assert_eq!(kind, "Name");
///         assert_eq!(fields, vec!["id".to_string()]);
///     }
///     other => panic!("unexpected: {other:?}"),
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TreeError {
    /// Required fields are unset or empty at finalize time.
    #[error("{kind} is incomplete: missing {}", fields.join(", "))]
    Incomplete {
        /// Node kind that failed the check.
        kind: String,
        /// Every offending field, in schema order.
        fields: Vec<String>,
    },
    /// A field name is not part of the node's schema.
    #[error("{kind} has no field named {field:?}")]
    UnknownField {
        /// Node kind that was addressed.
        kind: String,
        /// Requested field name.
        field: String,
    },
    /// No schema is registered for the kind.
    #[error("unknown node kind: {0}")]
    UnknownKind(String),
    /// The kind was registered twice.
    #[error("duplicate node kind: {0}")]
    DuplicateKind(String),
    /// A schema declares the same field name twice.
    #[error("{kind} declares field {field:?} more than once")]
    DuplicateField {
        /// Offending schema.
        kind: String,
        /// Repeated field name.
        field: String,
    },
    /// A kind or field name is not a valid identifier.
    #[error("invalid name in declaration: {0:?}")]
    InvalidName(String),
    /// A field accepts no types at all.
    #[error("{kind}.{field} accepts no types")]
    EmptyTypeSet {
        /// Offending schema.
        kind: String,
        /// Field with the empty type set.
        field: String,
    },
    /// A field type or parent refers to a kind that is not registered.
    #[error("{kind} refers to unknown node kind {target}")]
    DanglingReference {
        /// Schema holding the reference.
        kind: String,
        /// Unregistered target kind.
        target: String,
    },
    /// A parent chain loops back on itself.
    #[error("inheritance cycle through {0}")]
    InheritanceCycle(String),
    /// More positional values were supplied than the schema has fields.
    #[error("{kind} takes {expected} fields but {got} positional values were given")]
    TooManyValues {
        /// Constructed kind.
        kind: String,
        /// Number of declared fields.
        expected: usize,
        /// Number of positional values supplied.
        got: usize,
    },
    /// A constructor supplied a field more than once.
    #[error("{kind}.{field} was given more than one value")]
    DuplicateValue {
        /// Constructed kind.
        kind: String,
        /// Field supplied twice.
        field: String,
    },
    /// The process-wide registry is already installed.
    #[error("a global schema registry is already installed")]
    AlreadyInstalled,
    /// A sub-node failed its own check during a recursive finalize.
    #[error("at {path}: {source}")]
    Nested {
        /// Field path from the root node, e.g. `body[1].value`.
        path: String,
        /// Failure reported by the sub-node.
        source: Box<TreeError>,
    },
    /// A field write was rejected.
    #[error(transparent)]
    WrongType(#[from] WrongTypeError),
    /// A scalar domain rejected its value.
    #[error(transparent)]
    WrongValue(#[from] WrongValueError),
}

impl TreeError {
    /// Returns `true` for field write type/shape failures.
    pub fn is_wrong_type(&self) -> bool {
        matches!(self.innermost(), Self::WrongType(_))
    }

    /// Returns `true` for scalar domain failures.
    pub fn is_wrong_value(&self) -> bool {
        matches!(self.innermost(), Self::WrongValue(_))
    }

    /// Unwraps [`TreeError::Nested`] layers down to the originating error.
    pub fn innermost(&self) -> &TreeError {
        match self {
            Self::Nested { source, .. } => source.innermost(),
            other => other,
        }
    }
}
