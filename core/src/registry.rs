//! Process-wide schema registry.
//!
//! Schemas are registered while node kinds are being declared, then the
//! registry is sealed into a `&'static` reference and never mutated again.
//! Nodes resolve every field behavior through the sealed registry.
//!
//! Two ways to seal:
//!
//! - [`SchemaRegistry::install`] stores the registry in the process-wide
//!   slot used by [`Node::new`](crate::Node::new). It can only happen once.
//! - [`SchemaRegistry::seal`] leaks a standalone registry, for tools that
//!   work with several schema sets side by side.
//!
//! # Examples
//!
//! ```
//! use node_schema_core::*;
//!
//! let mut registry = SchemaRegistry::new();
//! registry.register(NodeSchema::new("expr")).unwrap();
//! registry
//!     .register(
//!         NodeSchema::new("Name")
//!             .extends("expr")
//!             .with_field(FieldSpec::needed("id", FieldType::Identifier)),
//!     )
//!     .unwrap();
//! let registry = registry.seal().unwrap();
//!
//! assert!(registry.is_a("Name", "expr"));
//! assert_eq!(registry.kinds().collect::<Vec<_>>(), vec!["expr", "Name"]);
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use tracing::debug;

use crate::domain::is_identifier;
use crate::error::TreeError;
use crate::node::{Node, NodeBuilder};
use crate::schema::{BUILTIN_TYPE_NAMES, FieldType, NodeSchema};
use crate::value::Value;

static GLOBAL: OnceLock<SchemaRegistry> = OnceLock::new();

/// Mapping from node kind to its schema, in registration order.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: Vec<NodeSchema>,
    index: HashMap<String, usize>,
}

impl SchemaRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the installed process-wide registry, if any.
    pub fn global() -> Option<&'static SchemaRegistry> {
        GLOBAL.get()
    }

    /// Adds a schema.
    ///
    /// Checks everything that can be judged from the schema alone: kind and
    /// field names are identifiers, the kind does not shadow a built-in type
    /// name, field names are unique, and every field accepts at least one
    /// type. References to other kinds are checked by
    /// [`validate`](Self::validate), so declarations may come in any order.
    ///
    /// # Errors
    ///
    /// [`TreeError::InvalidName`], [`TreeError::DuplicateKind`],
    /// [`TreeError::DuplicateField`] or [`TreeError::EmptyTypeSet`].
    pub fn register(&mut self, schema: NodeSchema) -> Result<(), TreeError> {
        if !is_identifier(&schema.kind) || BUILTIN_TYPE_NAMES.contains(&schema.kind.as_str()) {
            return Err(TreeError::InvalidName(schema.kind));
        }
        if self.index.contains_key(&schema.kind) {
            return Err(TreeError::DuplicateKind(schema.kind));
        }
        if let Some(parent) = &schema.extends {
            if !is_identifier(parent) {
                return Err(TreeError::InvalidName(parent.clone()));
            }
        }

        {
            let mut seen = HashSet::new();
            for field in &schema.fields {
                if !is_identifier(&field.name) {
                    return Err(TreeError::InvalidName(field.name.clone()));
                }
                if !seen.insert(field.name.as_str()) {
                    return Err(TreeError::DuplicateField {
                        kind: schema.kind.clone(),
                        field: field.name.clone(),
                    });
                }
                if field.types.is_empty() {
                    return Err(TreeError::EmptyTypeSet {
                        kind: schema.kind.clone(),
                        field: field.name.clone(),
                    });
                }
            }
        }

        self.index.insert(schema.kind.clone(), self.schemas.len());
        self.schemas.push(schema);
        Ok(())
    }

    /// Checks cross-schema consistency.
    ///
    /// Every parent and every node-kind field type must name a registered
    /// kind, and parent chains must not loop.
    ///
    /// # Errors
    ///
    /// [`TreeError::DanglingReference`] or [`TreeError::InheritanceCycle`].
    pub fn validate(&self) -> Result<(), TreeError> {
        for schema in &self.schemas {
            if let Some(parent) = &schema.extends {
                if !self.contains(parent) {
                    return Err(TreeError::DanglingReference {
                        kind: schema.kind.clone(),
                        target: parent.clone(),
                    });
                }
            }
            for field in &schema.fields {
                for ty in &field.types {
                    if let FieldType::Node(target) = ty {
                        if !self.contains(target) {
                            return Err(TreeError::DanglingReference {
                                kind: schema.kind.clone(),
                                target: target.clone(),
                            });
                        }
                    }
                }
            }
        }

        for schema in &self.schemas {
            let mut visited = HashSet::new();
            let mut current = Some(schema);
            while let Some(s) = current {
                if !visited.insert(s.kind.as_str()) {
                    return Err(TreeError::InheritanceCycle(schema.kind.clone()));
                }
                current = s.extends.as_deref().and_then(|p| self.get(p));
            }
        }

        Ok(())
    }

    /// Validates and leaks the registry, returning a `'static` reference.
    ///
    /// # Errors
    ///
    /// Any error from [`validate`](Self::validate).
    pub fn seal(self) -> Result<&'static SchemaRegistry, TreeError> {
        self.validate()?;
        debug!(kinds = self.len(), "Sealed schema registry");
        Ok(Box::leak(Box::new(self)))
    }

    /// Validates the registry and installs it as the process-wide registry.
    ///
    /// # Errors
    ///
    /// Any error from [`validate`](Self::validate), or
    /// [`TreeError::AlreadyInstalled`] on a second install.
    pub fn install(self) -> Result<&'static SchemaRegistry, TreeError> {
        self.validate()?;
        let kinds = self.len();
        GLOBAL.set(self).map_err(|_| TreeError::AlreadyInstalled)?;
        debug!(kinds, "Installed global schema registry");
        GLOBAL.get().ok_or(TreeError::AlreadyInstalled)
    }

    /// Looks up a schema by kind.
    pub fn get(&self, kind: &str) -> Option<&NodeSchema> {
        self.index.get(kind).map(|&i| &self.schemas[i])
    }

    /// Looks up a schema by kind, failing with [`TreeError::UnknownKind`].
    pub fn schema(&self, kind: &str) -> Result<&NodeSchema, TreeError> {
        self.get(kind)
            .ok_or_else(|| TreeError::UnknownKind(kind.to_string()))
    }

    /// Returns `true` if `kind` is registered.
    pub fn contains(&self, kind: &str) -> bool {
        self.index.contains_key(kind)
    }

    /// Iterates kinds in registration order.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.schemas.iter().map(|s| s.kind.as_str())
    }

    /// Iterates schemas in registration order.
    pub fn schemas(&self) -> impl Iterator<Item = &NodeSchema> {
        self.schemas.iter()
    }

    /// Returns the number of registered kinds.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Returns `true` if no kinds are registered.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Returns `true` if `kind` is `ancestor` or extends it, transitively.
    pub fn is_a(&self, kind: &str, ancestor: &str) -> bool {
        let mut current = Some(kind);
        // Bounded so an unvalidated cyclic chain cannot loop forever.
        for _ in 0..=self.schemas.len() {
            match current {
                Some(k) if k == ancestor => return true,
                Some(k) => current = self.get(k).and_then(|s| s.extends.as_deref()),
                None => return false,
            }
        }
        false
    }

    /// Creates an empty node of `kind`.
    ///
    /// # Errors
    ///
    /// [`TreeError::UnknownKind`] if `kind` is not registered.
    pub fn node(&'static self, kind: &str) -> Result<Node, TreeError> {
        Ok(Node::empty(self, self.schema(kind)?))
    }

    /// Creates a node from positional values in schema field order.
    ///
    /// # Errors
    ///
    /// [`TreeError::UnknownKind`], [`TreeError::TooManyValues`], or the
    /// first write failure.
    pub fn construct<I>(&'static self, kind: &str, args: I) -> Result<Node, TreeError>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        args.into_iter()
            .fold(self.build(kind), |builder, value| builder.arg(value))
            .finish()
    }

    /// Creates a node from `(field, value)` pairs.
    ///
    /// # Errors
    ///
    /// [`TreeError::UnknownKind`], [`TreeError::UnknownField`],
    /// [`TreeError::DuplicateValue`], or the first write failure.
    pub fn construct_with<I, K, V>(&'static self, kind: &str, fields: I) -> Result<Node, TreeError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        fields
            .into_iter()
            .fold(self.build(kind), |builder, (name, value)| {
                builder.field(name.as_ref(), value)
            })
            .finish()
    }

    /// Starts a builder mixing positional and named values.
    pub fn build(&'static self, kind: &str) -> NodeBuilder {
        NodeBuilder::new(self, kind)
    }
}
