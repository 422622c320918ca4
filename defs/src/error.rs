//! Error types for declaration loading.
//!
//! Covers every failure between a declaration file on disk and a validated
//! registry: I/O, parsing, unsupported formats, empty sources, and schema
//! problems reported by the core crate.

use std::path::PathBuf;

use node_schema_core::TreeError;
use thiserror::Error;

/// Errors that can occur while loading declarations.
#[derive(Debug, Error)]
pub enum DeclarationError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// The file extension is not `.yml`, `.yaml`, or `.json`.
    #[error("unsupported declaration format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    /// A directory or path list contained no declaration files.
    #[error("no declarations found in {}", .0.display())]
    NoDeclarations(PathBuf),

    /// An empty list of declaration sources was given.
    #[error("no declaration sources given")]
    NoSources,

    /// The declared schemas are inconsistent.
    #[error("invalid declarations: {0}")]
    SchemaError(#[from] TreeError),
}

/// Convenience alias for results with [`DeclarationError`].
pub type Result<T> = std::result::Result<T, DeclarationError>;
