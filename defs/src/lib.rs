//! Node-kind declarations loaded from files.
//!
//! This crate turns YAML or JSON declaration files into a
//! [`SchemaRegistry`](node_schema_core::SchemaRegistry), so a compiler can
//! keep its tree definitions as data instead of code.
//!
//! # Quick start
//!
//! ```no_run
//! use node_schema_defs::{Declarations, ToolConfig};
//!
//! // Load declarations and seal them into a registry
//! let decls = Declarations::from_file("declarations/python.yml").unwrap();
//! println!("schema fingerprint: {}", decls.fingerprint().unwrap());
//! let registry = decls.into_registry().unwrap().install().unwrap();
//!
//! // Or go through a tool configuration file
//! let config = ToolConfig::load(".node-schema.yml").unwrap();
//! let decls = config.load_declarations().unwrap();
//! ```

mod config;
mod error;
mod loader;

pub use config::ToolConfig;
pub use error::{DeclarationError, Result};
pub use loader::{DeclarationFormat, Declarations};
