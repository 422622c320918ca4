//! Field specifications and node schemas.
//!
//! A [`NodeSchema`] is an ordered list of [`FieldSpec`]s for one node kind.
//! Each field spec pairs a name with the set of [`FieldType`]s it accepts and
//! a [`Multiplicity`]. These types are purely declarative; validation
//! happens in [`Node`](crate::Node) writes and
//! [`finalize`](crate::Node::finalize).
//!
//! The serde representation is meant for declaration files:
//!
//! ```
//! use node_schema_core::*;
//!
//! let json = r#"{
//!     "kind": "Attribute",
//!     "extends": "expr",
//!     "fields": [
//!         { "name": "value", "types": ["expr"], "multiplicity": "NEEDED" },
//!         { "name": "attr", "types": ["identifier"], "multiplicity": "NEEDED" }
//!     ]
//! }"#;
//! let schema: NodeSchema = serde_json::from_str(json).unwrap();
//! assert_eq!(schema.extends.as_deref(), Some("expr"));
//! assert_eq!(schema.fields[0].types, vec![FieldType::Node("expr".into())]);
//! assert_eq!(schema.fields[1].to_string(), "attr: identifier");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{Identifier, Singleton};
use crate::registry::SchemaRegistry;
use crate::slot::Slot;
use crate::value::Value;

/// Cardinality class of a field.
///
/// | Multiplicity | Stored shape | Required at finalize |
/// |---|---|---|
/// | `Needed` | single value | must be set |
/// | `Optional` | single value or unset | no |
/// | `ZeroOrMore` | sequence, default empty | no |
/// | `OneOrMore` | sequence, default empty | at least one element |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Multiplicity {
    /// Exactly one value, which must be set before finalize.
    Needed,
    /// At most one value.
    Optional,
    /// Any number of values.
    ZeroOrMore,
    /// At least one value by finalize time.
    OneOrMore,
}

impl Multiplicity {
    /// Returns `true` if the field stores an ordered sequence.
    pub fn is_sequence(self) -> bool {
        matches!(self, Self::ZeroOrMore | Self::OneOrMore)
    }

    /// Returns `true` if finalize requires the field to be populated.
    pub fn is_required(self) -> bool {
        matches!(self, Self::Needed | Self::OneOrMore)
    }

    /// The slot a fresh node holds for a field of this multiplicity.
    pub fn default_slot(self) -> Slot {
        if self.is_sequence() {
            Slot::Many(Vec::new())
        } else {
            Slot::Unset
        }
    }

    /// Returns `true` if `slot` meets the presence requirement.
    pub fn is_satisfied_by(self, slot: &Slot) -> bool {
        match self {
            Self::Needed => slot.is_set(),
            Self::OneOrMore => slot.as_many().is_some_and(|items| !items.is_empty()),
            Self::Optional | Self::ZeroOrMore => true,
        }
    }

    /// Type-suffix notation: none, `?`, `*`, `+`.
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Needed => "",
            Self::Optional => "?",
            Self::ZeroOrMore => "*",
            Self::OneOrMore => "+",
        }
    }
}

/// One member of a field's accepted type set.
///
/// Serialized as a bare string: the built-in names `identifier`,
/// `singleton`, `text`, `int`, `float`, or any other name, which refers to a
/// node kind.
///
/// # Examples
///
/// ```
/// use node_schema_core::FieldType;
///
/// assert_eq!(FieldType::from("identifier"), FieldType::Identifier);
/// assert_eq!(FieldType::from("expr"), FieldType::Node("expr".into()));
/// assert_eq!(FieldType::Node("stmt".into()).to_string(), "stmt");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    /// Identifier-grammar text, wrapped or raw.
    Identifier,
    /// `true`, `false`, or null.
    Singleton,
    /// Any text, identifiers included.
    Text,
    /// Integers.
    Int,
    /// Floating point numbers.
    Float,
    /// Nodes of the named kind or any kind extending it.
    Node(String),
}

/// Names reserved for built-in field types.
pub const BUILTIN_TYPE_NAMES: [&str; 5] = ["identifier", "singleton", "text", "int", "float"];

impl FieldType {
    /// Returns `true` if `value` is a member of this type.
    ///
    /// Node kinds are resolved against `registry` so that a field typed with
    /// an abstract kind accepts every kind extending it. A node built from a
    /// different registry is never admitted, even if a kind of the same name
    /// exists in both.
    pub fn admits(&self, value: &Value, registry: &SchemaRegistry) -> bool {
        match self {
            Self::Identifier => Identifier::admits(value),
            Self::Singleton => Singleton::admits(value),
            Self::Text => matches!(value, Value::Text(_) | Value::Identifier(_)),
            Self::Int => matches!(value, Value::Int(_)),
            Self::Float => matches!(value, Value::Float(_)),
            Self::Node(kind) => match value {
                Value::Node(node) => {
                    std::ptr::eq(node.registry(), registry) && registry.is_a(node.kind(), kind)
                }
                _ => false,
            },
        }
    }

    /// The declaration name of this type.
    pub fn name(&self) -> &str {
        match self {
            Self::Identifier => "identifier",
            Self::Singleton => "singleton",
            Self::Text => "text",
            Self::Int => "int",
            Self::Float => "float",
            Self::Node(kind) => kind,
        }
    }
}

impl From<&str> for FieldType {
    fn from(name: &str) -> Self {
        match name {
            "identifier" => Self::Identifier,
            "singleton" => Self::Singleton,
            "text" => Self::Text,
            "int" => Self::Int,
            "float" => Self::Float,
            kind => Self::Node(kind.to_string()),
        }
    }
}

impl From<String> for FieldType {
    fn from(name: String) -> Self {
        Self::from(name.as_str())
    }
}

impl From<FieldType> for String {
    fn from(ty: FieldType) -> Self {
        ty.name().to_string()
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Declarative description of one node field.
///
/// # Examples
///
/// ```
/// use node_schema_core::{FieldSpec, FieldType, Multiplicity};
///
/// let targets = FieldSpec::one_or_more("targets", FieldType::Node("expr".into()));
/// assert_eq!(targets.multiplicity, Multiplicity::OneOrMore);
/// assert_eq!(targets.to_string(), "targets: expr+");
///
/// let value = FieldSpec::optional("value", FieldType::Int).or(FieldType::Float);
/// assert_eq!(value.to_string(), "value: (int | float)?");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field name, unique within its schema.
    pub name: String,
    /// Accepted types; a value must be a member of at least one.
    pub types: Vec<FieldType>,
    /// Cardinality class.
    pub multiplicity: Multiplicity,
    /// Optional human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FieldSpec {
    /// Creates a field spec accepting a single type.
    pub fn new(name: &str, ty: FieldType, multiplicity: Multiplicity) -> Self {
        Self {
            name: name.to_string(),
            types: vec![ty],
            multiplicity,
            description: None,
        }
    }

    /// Creates a [`Multiplicity::Needed`] field.
    pub fn needed(name: &str, ty: FieldType) -> Self {
        Self::new(name, ty, Multiplicity::Needed)
    }

    /// Creates a [`Multiplicity::Optional`] field.
    pub fn optional(name: &str, ty: FieldType) -> Self {
        Self::new(name, ty, Multiplicity::Optional)
    }

    /// Creates a [`Multiplicity::ZeroOrMore`] field.
    pub fn zero_or_more(name: &str, ty: FieldType) -> Self {
        Self::new(name, ty, Multiplicity::ZeroOrMore)
    }

    /// Creates a [`Multiplicity::OneOrMore`] field.
    pub fn one_or_more(name: &str, ty: FieldType) -> Self {
        Self::new(name, ty, Multiplicity::OneOrMore)
    }

    /// Adds another accepted type.
    pub fn or(mut self, ty: FieldType) -> Self {
        self.types.push(ty);
        self
    }

    /// Adds a description.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Returns `true` if any accepted type admits `value`.
    pub fn admits(&self, value: &Value, registry: &SchemaRegistry) -> bool {
        self.types.iter().any(|ty| ty.admits(value, registry))
    }

    /// Accepted types joined with ` | `.
    pub fn type_names(&self) -> String {
        self.types
            .iter()
            .map(FieldType::name)
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

impl fmt::Display for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suffix = self.multiplicity.suffix();
        if self.types.len() > 1 && !suffix.is_empty() {
            write!(f, "{}: ({}){suffix}", self.name, self.type_names())
        } else {
            write!(f, "{}: {}{suffix}", self.name, self.type_names())
        }
    }
}

/// Ordered field list for one node kind.
///
/// # Examples
///
/// ```
/// use node_schema_core::{FieldSpec, FieldType, NodeSchema};
///
/// let schema = NodeSchema::new("Name")
///     .extends("expr")
///     .with_field(FieldSpec::needed("id", FieldType::Identifier))
///     .with_field(FieldSpec::optional("ctx", FieldType::Node("expr_context".into())));
///
/// assert_eq!(schema.position("ctx"), Some(1));
/// assert_eq!(schema.field_names().collect::<Vec<_>>(), vec!["id", "ctx"]);
/// assert!(schema.field("missing").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSchema {
    /// Node kind name.
    pub kind: String,
    /// Parent kind this kind can stand in for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    /// Optional human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Fields in declaration order.
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

impl NodeSchema {
    /// Creates a schema with no fields.
    pub fn new(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            extends: None,
            description: None,
            fields: Vec::new(),
        }
    }

    /// Sets the parent kind.
    pub fn extends(mut self, parent: &str) -> Self {
        self.extends = Some(parent.to_string());
        self
    }

    /// Adds a description.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Appends a field.
    pub fn with_field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Finds a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns the declaration index of a field.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Iterates field names in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }
}

impl fmt::Display for NodeSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(parent) = &self.extends {
            write!(f, "({parent})")?;
        }
        write!(f, ":")?;
        for field in &self.fields {
            write!(f, "\n    {field}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_slots_match_shape() {
        assert_eq!(Multiplicity::Needed.default_slot(), Slot::Unset);
        assert_eq!(Multiplicity::Optional.default_slot(), Slot::Unset);
        assert_eq!(Multiplicity::ZeroOrMore.default_slot(), Slot::Many(vec![]));
        assert_eq!(Multiplicity::OneOrMore.default_slot(), Slot::Many(vec![]));
    }

    #[test]
    fn test_presence_requirements() {
        let empty = Slot::Many(vec![]);
        let one = Slot::Many(vec![Value::from("x")]);
        let null = Slot::Single(Value::Null);

        assert!(!Multiplicity::Needed.is_satisfied_by(&Slot::Unset));
        assert!(Multiplicity::Needed.is_satisfied_by(&null));
        assert!(Multiplicity::Optional.is_satisfied_by(&Slot::Unset));
        assert!(Multiplicity::ZeroOrMore.is_satisfied_by(&empty));
        assert!(!Multiplicity::OneOrMore.is_satisfied_by(&empty));
        assert!(Multiplicity::OneOrMore.is_satisfied_by(&one));
    }

    #[test]
    fn test_multiplicity_serde_names() {
        let json = serde_json::to_string(&Multiplicity::ZeroOrMore).unwrap();
        assert_eq!(json, "\"ZERO_OR_MORE\"");
        let parsed: Multiplicity = serde_json::from_str("\"ONE_OR_MORE\"").unwrap();
        assert_eq!(parsed, Multiplicity::OneOrMore);
    }

    #[test]
    fn test_field_type_serializes_as_name() {
        let types = vec![FieldType::Singleton, FieldType::Node("stmt".into())];
        let json = serde_json::to_string(&types).unwrap();
        assert_eq!(json, r#"["singleton","stmt"]"#);
    }

    #[test]
    fn test_schema_display() {
        let schema = NodeSchema::new("If")
            .extends("stmt")
            .with_field(FieldSpec::needed("test", FieldType::Node("expr".into())))
            .with_field(FieldSpec::one_or_more("body", FieldType::Node("stmt".into())))
            .with_field(FieldSpec::zero_or_more("orelse", FieldType::Node("stmt".into())));
        assert_eq!(
            schema.to_string(),
            "If(stmt):\n    test: expr\n    body: stmt+\n    orelse: stmt*"
        );
    }

    #[test]
    fn test_node_type_rejects_nodes_from_another_registry() {
        fn seal_with_name(name: NodeSchema) -> &'static SchemaRegistry {
            let mut registry = SchemaRegistry::new();
            registry.register(NodeSchema::new("expr")).unwrap();
            registry.register(name.extends("expr")).unwrap();
            registry
                .register(
                    NodeSchema::new("Call")
                        .with_field(FieldSpec::needed("func", FieldType::Node("expr".into()))),
                )
                .unwrap();
            registry.seal().unwrap()
        }
        let loose = seal_with_name(NodeSchema::new("Name"));
        let strict = seal_with_name(
            NodeSchema::new("Name").with_field(FieldSpec::needed("id", FieldType::Identifier)),
        );

        let expr = FieldType::Node("expr".into());
        let foreign = Value::from(loose.node("Name").unwrap());
        let native = Value::from(strict.node("Name").unwrap());
        assert!(!expr.admits(&foreign, strict));
        assert!(expr.admits(&native, strict));

        let mut call = strict.node("Call").unwrap();
        let err = call.set("func", loose.node("Name").unwrap()).unwrap_err();
        assert!(err.is_wrong_type());
        assert_eq!(call.get("func").unwrap(), &Slot::Unset);
    }
}
