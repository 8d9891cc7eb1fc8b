//! Simplifier configuration.
//!
//! ```toml
//! max_iterations = 10
//! canonicalize = true
//! virtualize = true
//! eliminate_redundant_guards = true
//! narrow_after_guards = true
//! ```
//!
//! Every key is optional; missing keys take their default.

use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

/// Configuration for the simplification pipeline
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimplifierConfig {
    /// Upper bound on pipeline rounds before giving up on a fixpoint
    pub max_iterations: usize,
    /// Replace type tests by their synonyms
    pub canonicalize: bool,
    /// Fold type tests against virtualized allocations
    pub virtualize: bool,
    /// Remove guards implied by earlier guards
    pub eliminate_redundant_guards: bool,
    /// Narrow operand stamps with facts established by earlier guards
    pub narrow_after_guards: bool,
}

impl Default for SimplifierConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            canonicalize: true,
            virtualize: true,
            eliminate_redundant_guards: true,
            narrow_after_guards: true,
        }
    }
}

impl SimplifierConfig {
    /// Parse and validate a TOML configuration.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: SimplifierConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_iterations == 0 {
            return Err(ConfigError::ZeroIterations);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = SimplifierConfig::from_toml_str("").unwrap();
        assert_eq!(config, SimplifierConfig::default());
        assert_eq!(config.max_iterations, 10);
        assert!(config.narrow_after_guards);
    }

    #[test]
    fn test_partial_config() {
        let config = SimplifierConfig::from_toml_str(
            "max_iterations = 3\nvirtualize = false\n",
        )
        .unwrap();
        assert_eq!(config.max_iterations, 3);
        assert!(!config.virtualize);
        assert!(config.canonicalize);
    }

    #[test]
    fn test_zero_iterations_rejected() {
        let err = SimplifierConfig::from_toml_str("max_iterations = 0").unwrap_err();
        assert!(matches!(err, ConfigError::ZeroIterations), "got {:?}", err);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = SimplifierConfig::from_toml_str("inline = true").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)), "got {:?}", err);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "eliminate_redundant_guards = false").unwrap();
        let config = SimplifierConfig::load(file.path()).unwrap();
        assert!(!config.eliminate_redundant_guards);

        let missing = file.path().with_extension("missing");
        let err = SimplifierConfig::load(&missing).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }), "got {:?}", err);
    }
}
