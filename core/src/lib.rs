//! Schema-driven syntax-tree nodes.
//!
//! This crate is the substrate a compiler frontend uses to build and check
//! tree nodes before later stages read them:
//!
//! - [`Identifier`] and [`Singleton`]: scalar domains that wrap a primitive
//!   but accept only a validated subset of its values.
//! - [`FieldSpec`] and [`NodeSchema`]: declarative per-kind field lists,
//!   each field with an accepted type set and a [`Multiplicity`].
//! - [`SchemaRegistry`]: the read-only kind → schema mapping, sealed once.
//! - [`Node`]: an instance whose field writes are type-checked eagerly and
//!   whose completeness is checked by [`Node::finalize`].
//!
//! Errors form a small taxonomy: [`WrongValueError`] for scalar domains,
//! [`WrongTypeError`] for field writes, and [`TreeError`] as the base
//! category that wraps both.
//!
//! # Example
//!
//! ```
//! use node_schema_core::*;
//!
//! let mut registry = SchemaRegistry::new();
//! registry
//!     .register(
//!         NodeSchema::new("AllModifiers")
//!             .with_field(FieldSpec::needed("f1", FieldType::Identifier))
//!             .with_field(FieldSpec::optional("f2", FieldType::Identifier))
//!             .with_field(FieldSpec::zero_or_more("f3", FieldType::Identifier))
//!             .with_field(FieldSpec::one_or_more("f4", FieldType::Identifier)),
//!     )
//!     .unwrap();
//! let registry = registry.seal().unwrap();
//!
//! let node = registry
//!     .construct(
//!         "AllModifiers",
//!         [Value::from("foo"), Value::from("bar"), Value::Seq(vec![]), Value::seq(["baz"])],
//!     )
//!     .unwrap();
//! node.finalize().unwrap();
//! assert_eq!(node.get("f1").unwrap(), &"foo");
//! ```

mod domain;
mod error;
mod node;
mod registry;
mod schema;
mod slot;
mod value;

pub use domain::{Identifier, Singleton, is_identifier};
pub use error::{TreeError, WrongTypeError, WrongTypeReason, WrongValueError};
pub use node::{Node, NodeBuilder};
pub use registry::SchemaRegistry;
pub use schema::{BUILTIN_TYPE_NAMES, FieldSpec, FieldType, Multiplicity, NodeSchema};
pub use slot::Slot;
pub use value::Value;
