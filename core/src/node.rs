//! Node instances: eager write validation and lazy completeness checks.
//!
//! Validation happens in two phases:
//!
//! 1. Every write ([`Node::set`], [`Node::push`], construction) checks the
//!    value's type and shape against the field spec immediately. A rejected
//!    write leaves the field untouched, so no value on a node ever violates
//!    its field's type.
//! 2. [`Node::finalize`] checks presence across all fields at once. A node
//!    may be incomplete while it is being populated.
//!
//! # Examples
//!
//! ```
//! use node_schema_core::*;
//!
//! let mut registry = SchemaRegistry::new();
//! registry
//!     .register(
//!         NodeSchema::new("Import")
//!             .with_field(FieldSpec::one_or_more("names", FieldType::Identifier)),
//!     )
//!     .unwrap();
//! let registry = registry.seal().unwrap();
//!
//! let mut node = registry.node("Import").unwrap();
//! assert!(node.finalize().is_err());
//!
//! // A bare text value is never split into characters.
//! assert!(node.set("names", "os").unwrap_err().is_wrong_type());
//!
//! node.set("names", Value::seq(["os", "sys"])).unwrap();
//! node.finalize().unwrap();
//! assert_eq!(node.to_string(), "Import(names=['os', 'sys'])");
//! ```

use std::fmt;

use tracing::{debug, trace};

use crate::error::{TreeError, WrongTypeError, WrongTypeReason};
use crate::registry::SchemaRegistry;
use crate::schema::{FieldSpec, NodeSchema};
use crate::slot::Slot;
use crate::value::Value;

/// A node of some registered kind.
///
/// Holds one [`Slot`] per schema field. The schema itself lives in the
/// sealed [`SchemaRegistry`]; the node only keeps references into it.
#[derive(Clone)]
pub struct Node {
    registry: &'static SchemaRegistry,
    schema: &'static NodeSchema,
    slots: Vec<Slot>,
}

impl Node {
    pub(crate) fn empty(registry: &'static SchemaRegistry, schema: &'static NodeSchema) -> Self {
        Self {
            registry,
            schema,
            slots: schema
                .fields
                .iter()
                .map(|f| f.multiplicity.default_slot())
                .collect(),
        }
    }

    /// Creates an empty node through the installed global registry.
    ///
    /// # Errors
    ///
    /// [`TreeError::UnknownKind`] if no global registry is installed or it
    /// does not know `kind`.
    pub fn new(kind: &str) -> Result<Self, TreeError> {
        global(kind)?.node(kind)
    }

    /// Creates a node from positional values through the global registry.
    ///
    /// See [`SchemaRegistry::construct`].
    pub fn construct<I>(kind: &str, args: I) -> Result<Self, TreeError>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        global(kind)?.construct(kind, args)
    }

    /// The node's kind.
    pub fn kind(&self) -> &str {
        &self.schema.kind
    }

    /// The node's schema.
    pub fn schema(&self) -> &'static NodeSchema {
        self.schema
    }

    /// The registry the node was created from.
    pub fn registry(&self) -> &'static SchemaRegistry {
        self.registry
    }

    /// Borrows the slot of a field.
    ///
    /// # Errors
    ///
    /// [`TreeError::UnknownField`] if the schema has no such field.
    pub fn get(&self, field: &str) -> Result<&Slot, TreeError> {
        let index = self.position(field)?;
        Ok(&self.slots[index])
    }

    /// Edits the sub-node stored in a single-valued field in place.
    ///
    /// The edited child is checked against the field's accepted types again
    /// before the edit is kept; if it no longer fits, the previous child is
    /// restored. Returns `Ok(None)` without calling `edit` when the field is
    /// unset or holds a non-node value.
    ///
    /// # Errors
    ///
    /// [`TreeError::UnknownField`], or [`TreeError::WrongType`] if the edited
    /// child is not admitted by the field.
    pub fn with_child_mut<R>(
        &mut self,
        field: &str,
        edit: impl FnOnce(&mut Node) -> R,
    ) -> Result<Option<R>, TreeError> {
        let index = self.position(field)?;
        let spec = &self.schema.fields[index];
        let Slot::Single(Value::Node(child)) = &mut self.slots[index] else {
            return Ok(None);
        };

        let previous = child.clone();
        let result = edit(&mut **child);
        let edited = Value::Node(std::mem::replace(child, previous));
        if !spec.admits(&edited, self.registry) {
            let reason = WrongTypeReason::NotAdmitted {
                expected: spec.type_names(),
            };
            return Err(self.reject(spec, &edited, reason).into());
        }
        self.slots[index] = Slot::Single(edited);
        Ok(Some(result))
    }

    /// Replaces the value of a field after validating it.
    ///
    /// Single-valued fields take exactly one admitted value. Sequence fields
    /// take a [`Value::Seq`] whose every element is admitted; anything else,
    /// text included, is a shape mismatch. The write is atomic: on error the
    /// previous value is kept.
    ///
    /// # Errors
    ///
    /// [`TreeError::UnknownField`] or [`TreeError::WrongType`].
    pub fn set(&mut self, field: &str, value: impl Into<Value>) -> Result<(), TreeError> {
        let index = self.position(field)?;
        self.write_at(index, value.into())
    }

    /// Appends one validated element to a sequence field.
    ///
    /// # Errors
    ///
    /// [`TreeError::UnknownField`], or [`TreeError::WrongType`] if the field
    /// is single-valued or the element is not admitted.
    pub fn push(&mut self, field: &str, value: impl Into<Value>) -> Result<(), TreeError> {
        let index = self.position(field)?;
        let spec = &self.schema.fields[index];
        let value = value.into();

        if !spec.multiplicity.is_sequence() {
            return Err(self.reject(spec, &value, WrongTypeReason::ExpectedSequence).into());
        }
        let len = self.slots[index].as_many().map_or(0, <[Value]>::len);
        if value.is_seq() || !spec.admits(&value, self.registry) {
            let reason = WrongTypeReason::ElementNotAdmitted {
                index: len,
                expected: spec.type_names(),
            };
            return Err(self.reject(spec, &value, reason).into());
        }

        trace!(kind = self.kind(), field, "Appended element");
        if let Slot::Many(items) = &mut self.slots[index] {
            items.push(value);
        }
        Ok(())
    }

    /// Restores a field to its initial state: unset, or an empty sequence.
    ///
    /// # Errors
    ///
    /// [`TreeError::UnknownField`].
    pub fn clear(&mut self, field: &str) -> Result<(), TreeError> {
        let index = self.position(field)?;
        self.slots[index] = self.schema.fields[index].multiplicity.default_slot();
        Ok(())
    }

    /// Iterates `(spec, slot)` pairs in schema order.
    pub fn fields(&self) -> impl Iterator<Item = (&FieldSpec, &Slot)> {
        self.schema.fields.iter().zip(&self.slots)
    }

    /// Checks presence and arity of every field.
    ///
    /// Fails if any `NEEDED` field is unset or any `ONE_OR_MORE` field is
    /// empty, naming every offending field in schema order. Does not change
    /// the node, so repeated calls give the same answer. Sub-nodes are not
    /// visited; see [`finalize_tree`](Self::finalize_tree).
    ///
    /// # Errors
    ///
    /// [`TreeError::Incomplete`].
    pub fn finalize(&self) -> Result<(), TreeError> {
        let missing: Vec<String> = self
            .fields()
            .filter(|(spec, slot)| !spec.multiplicity.is_satisfied_by(slot))
            .map(|(spec, _)| spec.name.clone())
            .collect();

        if missing.is_empty() {
            return Ok(());
        }
        debug!(kind = self.kind(), missing = ?missing, "Node failed finalize");
        Err(TreeError::Incomplete {
            kind: self.kind().to_string(),
            fields: missing,
        })
    }

    /// Finalizes this node, then every sub-node depth-first.
    ///
    /// The first failure is reported as [`TreeError::Nested`] carrying the
    /// field path from this node, e.g. `body[1].value`. A failure on this
    /// node itself is returned unwrapped.
    ///
    /// # Errors
    ///
    /// [`TreeError::Incomplete`] or [`TreeError::Nested`].
    pub fn finalize_tree(&self) -> Result<(), TreeError> {
        self.finalize()?;
        for (spec, slot) in self.fields() {
            match slot {
                Slot::Single(Value::Node(child)) => {
                    child
                        .finalize_tree()
                        .map_err(|err| nest(spec.name.clone(), err))?;
                }
                Slot::Many(items) => {
                    for (i, item) in items.iter().enumerate() {
                        if let Value::Node(child) = item {
                            child
                                .finalize_tree()
                                .map_err(|err| nest(format!("{}[{i}]", spec.name), err))?;
                        }
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn position(&self, field: &str) -> Result<usize, TreeError> {
        self.schema
            .position(field)
            .ok_or_else(|| TreeError::UnknownField {
                kind: self.kind().to_string(),
                field: field.to_string(),
            })
    }

    fn write_at(&mut self, index: usize, value: Value) -> Result<(), TreeError> {
        let spec = &self.schema.fields[index];
        let slot = self.check(spec, value)?;
        trace!(kind = self.kind(), field = %spec.name, "Accepted field write");
        self.slots[index] = slot;
        Ok(())
    }

    fn check(&self, spec: &FieldSpec, value: Value) -> Result<Slot, WrongTypeError> {
        if !spec.multiplicity.is_sequence() {
            if value.is_seq() {
                return Err(self.reject(spec, &value, WrongTypeReason::ExpectedSingle));
            }
            if !spec.admits(&value, self.registry) {
                let reason = WrongTypeReason::NotAdmitted {
                    expected: spec.type_names(),
                };
                return Err(self.reject(spec, &value, reason));
            }
            return Ok(Slot::Single(value));
        }

        let items = match value {
            Value::Seq(items) => items,
            other => return Err(self.reject(spec, &other, WrongTypeReason::ExpectedSequence)),
        };
        let bad = items
            .iter()
            .position(|item| item.is_seq() || !spec.admits(item, self.registry));
        if let Some(index) = bad {
            let reason = WrongTypeReason::ElementNotAdmitted {
                index,
                expected: spec.type_names(),
            };
            return Err(self.reject(spec, &items[index], reason));
        }
        Ok(Slot::Many(items))
    }

    fn reject(&self, spec: &FieldSpec, value: &Value, reason: WrongTypeReason) -> WrongTypeError {
        debug!(kind = self.kind(), field = %spec.name, %reason, "Rejected field write");
        WrongTypeError {
            kind: self.kind().to_string(),
            field: spec.name.clone(),
            value: value.to_string(),
            reason,
        }
    }
}

fn global(kind: &str) -> Result<&'static SchemaRegistry, TreeError> {
    SchemaRegistry::global().ok_or_else(|| TreeError::UnknownKind(kind.to_string()))
}

fn nest(prefix: String, err: TreeError) -> TreeError {
    match err {
        TreeError::Nested { path, source } => TreeError::Nested {
            path: format!("{prefix}.{path}"),
            source,
        },
        other => TreeError::Nested {
            path: prefix,
            source: Box::new(other),
        },
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.kind() == other.kind() && self.slots == other.slots
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("kind", &self.kind())
            .field("slots", &self.slots)
            .finish()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.kind())?;
        for (i, (spec, slot)) in self.fields().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={slot}", spec.name)?;
        }
        write!(f, ")")
    }
}

/// Collects positional and named values, then validates them into a
/// [`Node`].
///
/// Positional values fill fields in schema order; named values may follow
/// for the remaining fields. All values pass through the same validation as
/// [`Node::set`].
///
/// # Examples
///
/// ```
/// use node_schema_core::*;
///
/// let mut registry = SchemaRegistry::new();
/// registry
///     .register(
///         NodeSchema::new("alias")
///             .with_field(FieldSpec::needed("name", FieldType::Identifier))
///             .with_field(FieldSpec::optional("asname", FieldType::Identifier)),
///     )
///     .unwrap();
/// let registry = registry.seal().unwrap();
///
/// let node = registry.build("alias").arg("numpy").field("asname", "np").finish().unwrap();
/// assert_eq!(node.get("asname").unwrap(), &"np");
///
/// let err = registry.build("alias").arg("numpy").field("name", "np").finish().unwrap_err();
/// assert!(matches!(err, TreeError::DuplicateValue { .. }));
/// ```
#[must_use]
pub struct NodeBuilder {
    registry: &'static SchemaRegistry,
    kind: String,
    positional: Vec<Value>,
    named: Vec<(String, Value)>,
}

impl NodeBuilder {
    pub(crate) fn new(registry: &'static SchemaRegistry, kind: &str) -> Self {
        Self {
            registry,
            kind: kind.to_string(),
            positional: Vec::new(),
            named: Vec::new(),
        }
    }

    /// Supplies the next field in schema order.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Supplies a field by name.
    pub fn field(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.named.push((name.to_string(), value.into()));
        self
    }

    /// Validates every supplied value and returns the node.
    ///
    /// # Errors
    ///
    /// [`TreeError::UnknownKind`], [`TreeError::TooManyValues`],
    /// [`TreeError::UnknownField`], [`TreeError::DuplicateValue`], or the
    /// first rejected write.
    pub fn finish(self) -> Result<Node, TreeError> {
        let mut node = self.registry.node(&self.kind)?;
        let field_count = node.schema.fields.len();
        if self.positional.len() > field_count {
            return Err(TreeError::TooManyValues {
                kind: self.kind,
                expected: field_count,
                got: self.positional.len(),
            });
        }

        let mut filled = vec![false; field_count];
        for (index, value) in self.positional.into_iter().enumerate() {
            node.write_at(index, value)?;
            filled[index] = true;
        }
        for (name, value) in self.named {
            let index = node.position(&name)?;
            if filled[index] {
                return Err(TreeError::DuplicateValue {
                    kind: self.kind,
                    field: name,
                });
            }
            node.write_at(index, value)?;
            filled[index] = true;
        }
        Ok(node)
    }
}
