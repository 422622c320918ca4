//! Tool configuration.
//!
//! Read from a YAML file (typically `.node-schema.yml` next to the
//! declarations) so that tools agree on which declarations make up a tree
//! family.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! declarations:
//!   - declarations/python.yml
//! log_level: info
//! ```

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::loader::Declarations;

fn default_log_level() -> String {
    "warn".to_string()
}

/// Top-level tool configuration.
///
/// # Examples
///
/// ```
/// # use node_schema_defs::ToolConfig;
/// let config: ToolConfig = serde_yaml::from_str("version: \"1.0\"").unwrap();
/// assert!(config.declarations.is_empty());
/// assert_eq!(config.log_level, "warn");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Configuration format version (e.g., `"1.0"`).
    pub version: String,
    /// Declaration files or directories, relative to the config file.
    #[serde(default)]
    pub declarations: Vec<PathBuf>,
    /// Default `tracing` filter directive.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            declarations: Vec::new(),
            log_level: default_log_level(),
        }
    }
}

impl ToolConfig {
    /// Loads configuration from a YAML file.
    ///
    /// Relative declaration paths are resolved against the directory holding
    /// the config file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::DeclarationError::IoError) if the file
    /// cannot be read, or [`YamlError`](crate::DeclarationError::YamlError)
    /// if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let mut config: Self = serde_yaml::from_reader(reader)?;

        if let Some(base) = path.parent() {
            config.declarations = config
                .declarations
                .into_iter()
                .map(|p| if p.is_relative() { base.join(p) } else { p })
                .collect();
        }
        Ok(config)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::DeclarationError::IoError) if the file
    /// cannot be written, or [`YamlError`](crate::DeclarationError::YamlError)
    /// if serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Loads and merges every configured declaration source.
    ///
    /// # Errors
    ///
    /// Any error from [`Declarations::from_paths`].
    pub fn load_declarations(&self) -> Result<Declarations> {
        Declarations::from_paths(&self.declarations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_yaml() -> &'static str {
        r#"
version: "1.0"
declarations:
  - defs/python.yml
  - /abs/extra.json
log_level: debug
"#
    }

    #[test]
    fn test_deserialize_complete() {
        let config: ToolConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.declarations.len(), 2);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_load_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("node-schema.yml");
        std::fs::write(&path, sample_yaml()).unwrap();

        let config = ToolConfig::load(&path).unwrap();
        assert_eq!(config.declarations[0], dir.path().join("defs/python.yml"));
        assert_eq!(config.declarations[1], PathBuf::from("/abs/extra.json"));
    }

    #[test]
    fn test_load_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");

        let original = ToolConfig {
            declarations: vec![PathBuf::from("/opt/defs")],
            ..ToolConfig::default()
        };
        original.save(&path).unwrap();

        let loaded = ToolConfig::load(&path).unwrap();
        assert_eq!(loaded, original);
    }
}
