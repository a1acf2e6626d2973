//! Engine configuration loaded from TOML.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::builder::NodeCreation;
use crate::parser::{DEFAULT_SEPARATOR, DEPENDS_ON_LABEL};

/// Settings that control how dependency references are read and how the
/// graph is built.
///
/// # Example
///
/// ```
/// use catalog_callgraph::config::EngineConfig;
///
/// let config: EngineConfig = toml::from_str(r#"separator = "::""#).unwrap();
/// assert_eq!(config.separator, "::");
/// assert_eq!(config.depends_on_label, "depends_on");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_separator")]
    pub separator: String,
    #[serde(default = "default_depends_on_label")]
    pub depends_on_label: String,
    #[serde(default)]
    pub node_creation: NodeCreation,
    #[serde(default)]
    pub skip_malformed_references: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            separator: default_separator(),
            depends_on_label: default_depends_on_label(),
            node_creation: NodeCreation::default(),
            skip_malformed_references: false,
        }
    }
}

fn default_separator() -> String {
    DEFAULT_SEPARATOR.to_string()
}

fn default_depends_on_label() -> String {
    DEPENDS_ON_LABEL.to_string()
}

/// Loads an [`EngineConfig`] from `path`, or the defaults when `path` is `None`.
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let config = toml::from_str::<EngineConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    if config.separator.is_empty() {
        anyhow::bail!("Invalid {}: separator must not be empty", path.display());
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_without_file() {
        let config = load_config(None).unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.separator, "/");
        assert_eq!(config.node_creation, NodeCreation::WithDependenciesOnly);
        assert!(!config.skip_malformed_references);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let file = write_config("node_creation = \"all_objects\"\n");
        let config = load_config(Some(file.path())).unwrap();

        assert_eq!(config.node_creation, NodeCreation::AllObjects);
        assert_eq!(config.depends_on_label, "depends_on");
    }

    #[test]
    fn test_full_file() {
        let file = write_config(
            r#"
separator = "::"
depends_on_label = "requires"
node_creation = "with_dependencies_only"
skip_malformed_references = true
"#,
        );
        let config = load_config(Some(file.path())).unwrap();

        assert_eq!(config.separator, "::");
        assert_eq!(config.depends_on_label, "requires");
        assert!(config.skip_malformed_references);
    }

    #[test]
    fn test_missing_file_is_error() {
        let err = load_config(Some(Path::new("/nonexistent/engine.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let file = write_config("node_creation = \"sometimes\"\n");
        let err = load_config(Some(file.path())).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn test_empty_separator_is_error() {
        let file = write_config("separator = \"\"\n");
        assert!(load_config(Some(file.path())).is_err());
    }
}
