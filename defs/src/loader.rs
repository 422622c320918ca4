//! Declaration files and registry construction.
//!
//! A declaration file lists node kinds the way a compiler keeps its AST
//! definitions in a data file. YAML and JSON are both accepted:
//!
//! ```yaml
//! version: "1.0"
//! name: python
//! nodes:
//!   - kind: expr
//!   - kind: Name
//!     extends: expr
//!     fields:
//!       - { name: id, types: [identifier], multiplicity: NEEDED }
//! ```
//!
//! # Loading patterns
//!
//! ```no_run
//! use node_schema_defs::Declarations;
//!
//! // A single file
//! let decls = Declarations::from_file("declarations/python.yml").unwrap();
//!
//! // Every `.yml`/`.yaml`/`.json` file in a directory, in file-name order
//! let decls = Declarations::from_dir("declarations/").unwrap();
//!
//! let registry = decls.into_registry().unwrap().seal().unwrap();
//! assert!(registry.contains("Module"));
//! ```

use std::fs;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use node_schema_core::{NodeSchema, SchemaRegistry};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{DeclarationError, Result};

/// Format of a declaration file, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationFormat {
    /// `.yml` or `.yaml`.
    Yaml,
    /// `.json`.
    Json,
}

impl DeclarationFormat {
    /// Detects the format from a path's extension.
    ///
    /// # Examples
    ///
    /// ```
    /// use node_schema_defs::DeclarationFormat;
    ///
    /// assert_eq!(DeclarationFormat::from_path("a/python.yml"), Some(DeclarationFormat::Yaml));
    /// assert_eq!(DeclarationFormat::from_path("nodes.json"), Some(DeclarationFormat::Json));
    /// assert_eq!(DeclarationFormat::from_path("README.md"), None);
    /// ```
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        match path.as_ref().extension().and_then(|e| e.to_str()) {
            Some("yml" | "yaml") => Some(Self::Yaml),
            Some("json") => Some(Self::Json),
            _ => None,
        }
    }
}

/// A set of node-kind declarations.
///
/// # Examples
///
/// ```
/// use node_schema_core::{FieldSpec, FieldType, NodeSchema};
/// use node_schema_defs::Declarations;
///
/// let mut decls = Declarations::new("1.0");
/// decls.nodes.push(NodeSchema::new("expr"));
/// decls.nodes.push(
///     NodeSchema::new("Name")
///         .extends("expr")
///         .with_field(FieldSpec::needed("id", FieldType::Identifier)),
/// );
///
/// let registry = decls.into_registry().unwrap();
/// assert_eq!(registry.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Declarations {
    /// Declaration format version.
    pub version: String,
    /// Optional name of the declared language or tree family.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Node kinds, in declaration order.
    #[serde(default)]
    pub nodes: Vec<NodeSchema>,
}

impl Declarations {
    /// Creates an empty declaration set.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            name: None,
            nodes: Vec::new(),
        }
    }

    /// Parses declarations from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`DeclarationError::YamlError`] if parsing fails.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Parses declarations from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`DeclarationError::JsonError`] if parsing fails.
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Loads one declaration file, choosing the parser by extension.
    ///
    /// # Errors
    ///
    /// Returns [`DeclarationError::UnsupportedFormat`] for unknown
    /// extensions, [`DeclarationError::IoError`] if the file cannot be read,
    /// or a parse error.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let format = DeclarationFormat::from_path(path)
            .ok_or_else(|| DeclarationError::UnsupportedFormat(path.to_path_buf()))?;

        let reader = BufReader::new(fs::File::open(path)?);
        let decls: Self = match format {
            DeclarationFormat::Yaml => serde_yaml::from_reader(reader)?,
            DeclarationFormat::Json => serde_json::from_reader(reader)?,
        };
        debug!(path = %path.display(), nodes = decls.nodes.len(), "Loaded declarations");
        Ok(decls)
    }

    /// Loads and merges every declaration file in a directory.
    ///
    /// Files are read in file-name order; the first file's version and name
    /// are kept. Files with other extensions are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`DeclarationError::NoDeclarations`] if the directory holds no
    /// declaration files, or any error from [`from_file`](Self::from_file).
    pub fn from_dir(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut files = Vec::new();
        for entry in fs::read_dir(path)? {
            let file_path = entry?.path();
            if file_path.is_file() && DeclarationFormat::from_path(&file_path).is_some() {
                files.push(file_path);
            }
        }
        files.sort();

        let mut merged: Option<Self> = None;
        for file in files {
            let decls = Self::from_file(&file)?;
            match merged.as_mut() {
                Some(acc) => acc.merge(decls),
                None => merged = Some(decls),
            }
        }
        merged.ok_or_else(|| DeclarationError::NoDeclarations(path.to_path_buf()))
    }

    /// Loads and merges a list of files and directories, in order.
    ///
    /// # Errors
    ///
    /// Returns [`DeclarationError::NoSources`] for an empty list, or any
    /// error from [`from_file`](Self::from_file) or
    /// [`from_dir`](Self::from_dir).
    pub fn from_paths<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        let mut merged: Option<Self> = None;
        for path in paths {
            let path = path.as_ref();
            let decls = if path.is_dir() {
                Self::from_dir(path)?
            } else {
                Self::from_file(path)?
            };
            match merged.as_mut() {
                Some(acc) => acc.merge(decls),
                None => merged = Some(decls),
            }
        }
        merged.ok_or(DeclarationError::NoSources)
    }

    /// Appends another set's nodes after this set's nodes.
    pub fn merge(&mut self, other: Declarations) {
        self.nodes.extend(other.nodes);
    }

    /// Saves the declarations, choosing the format by extension.
    ///
    /// # Errors
    ///
    /// Returns [`DeclarationError::UnsupportedFormat`] for unknown
    /// extensions, or an I/O or serialization error.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let format = DeclarationFormat::from_path(path)
            .ok_or_else(|| DeclarationError::UnsupportedFormat(path.to_path_buf()))?;
        let writer = BufWriter::new(fs::File::create(path)?);
        match format {
            DeclarationFormat::Yaml => serde_yaml::to_writer(writer, self)?,
            DeclarationFormat::Json => serde_json::to_writer_pretty(writer, self)?,
        }
        Ok(())
    }

    /// Finds a declared node kind.
    pub fn get(&self, kind: &str) -> Option<&NodeSchema> {
        self.nodes.iter().find(|n| n.kind == kind)
    }

    /// Registers every node in order and validates cross-references.
    ///
    /// The returned registry is not sealed yet; call
    /// [`seal`](SchemaRegistry::seal) or [`install`](SchemaRegistry::install).
    ///
    /// # Errors
    ///
    /// Returns [`DeclarationError::SchemaError`] for the first registration
    /// or validation failure.
    pub fn into_registry(self) -> Result<SchemaRegistry> {
        let mut registry = SchemaRegistry::new();
        for node in self.nodes {
            registry.register(node)?;
        }
        registry.validate()?;
        Ok(registry)
    }

    /// SHA-256 hex digest of the canonical JSON form.
    ///
    /// Two declaration sets have the same fingerprint exactly when they
    /// declare the same kinds, fields, and order, whatever file format they
    /// were loaded from.
    ///
    /// # Errors
    ///
    /// Returns [`DeclarationError::JsonError`] if serialization fails.
    pub fn fingerprint(&self) -> Result<String> {
        let bytes = serde_json::to_vec(self)?;
        let hash = Sha256::digest(&bytes);
        Ok(format!("{:x}", hash))
    }
}

#[cfg(test)]
mod tests {
    use node_schema_core::{FieldType, Multiplicity, TreeError};

    use super::*;

    fn sample_yaml() -> &'static str {
        r#"
version: "1.0"
name: mini
nodes:
  - kind: expr
  - kind: Name
    extends: expr
    fields:
      - name: id
        types: [identifier]
        multiplicity: NEEDED
  - kind: Call
    extends: expr
    description: Function call
    fields:
      - { name: func, types: [expr], multiplicity: NEEDED }
      - { name: args, types: [expr], multiplicity: ZERO_OR_MORE }
"#
    }

    #[test]
    fn test_empty_source_list_is_rejected() {
        let err = Declarations::from_paths::<&Path>(&[]).unwrap_err();
        assert!(matches!(err, DeclarationError::NoSources));
        assert_eq!(err.to_string(), "no declaration sources given");
    }

    #[test]
    fn test_parse_yaml() {
        let decls = Declarations::from_yaml_str(sample_yaml()).unwrap();
        assert_eq!(decls.version, "1.0");
        assert_eq!(decls.name.as_deref(), Some("mini"));
        assert_eq!(decls.nodes.len(), 3);

        let call = decls.get("Call").unwrap();
        assert_eq!(call.extends.as_deref(), Some("expr"));
        assert_eq!(call.fields[1].multiplicity, Multiplicity::ZeroOrMore);
        assert_eq!(call.fields[0].types, vec![FieldType::Node("expr".into())]);
    }

    #[test]
    fn test_yaml_and_json_fingerprints_match() {
        let from_yaml = Declarations::from_yaml_str(sample_yaml()).unwrap();
        let json = serde_json::to_string(&from_yaml).unwrap();
        let from_json = Declarations::from_json_str(&json).unwrap();
        assert_eq!(from_yaml, from_json);
        assert_eq!(
            from_yaml.fingerprint().unwrap(),
            from_json.fingerprint().unwrap()
        );
        assert_eq!(from_yaml.fingerprint().unwrap().len(), 64);
    }

    #[test]
    fn test_fingerprint_changes_with_content() {
        let base = Declarations::from_yaml_str(sample_yaml()).unwrap();
        let mut changed = base.clone();
        changed.nodes[1].fields[0].multiplicity = Multiplicity::Optional;
        assert_ne!(base.fingerprint().unwrap(), changed.fingerprint().unwrap());
    }

    #[test]
    fn test_into_registry_reports_dangling_reference() {
        let yaml = r#"
version: "1.0"
nodes:
  - kind: Call
    fields:
      - { name: func, types: [expr], multiplicity: NEEDED }
"#;
        let err = Declarations::from_yaml_str(yaml)
            .unwrap()
            .into_registry()
            .unwrap_err();
        assert!(matches!(
            err,
            DeclarationError::SchemaError(TreeError::DanglingReference { .. })
        ));
    }

    #[test]
    fn test_unknown_multiplicity_is_a_parse_error() {
        let yaml = r#"
version: "1.0"
nodes:
  - kind: Name
    fields:
      - { name: id, types: [identifier], multiplicity: MANY }
"#;
        assert!(matches!(
            Declarations::from_yaml_str(yaml).unwrap_err(),
            DeclarationError::YamlError(_)
        ));
    }

    #[test]
    fn test_unsupported_extension() {
        let err = Declarations::from_file("nodes.toml").unwrap_err();
        assert!(matches!(err, DeclarationError::UnsupportedFormat(_)));
    }
}
