//! Registry configuration, read from a TOML file.
//!
//! ```toml
//! [registry]
//! id-scheme = "v7"          # v7 | v4 | sequential
//! sequential-start = 1
//! run-hook-on-replace = true
//! ```

use crate::error::CodexResult;
use codex_types::{IdGenerator, IdScheme};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// How a registry is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CodexConfig {
    /// Which identifier generator backs the registry.
    pub id_scheme: IdScheme,
    /// First value handed out by the sequential scheme.
    pub sequential_start: u64,
    /// Whether an entry replaced by an identifier collision gets its
    /// removal hook run.
    pub run_hook_on_replace: bool,
}

impl Default for CodexConfig {
    fn default() -> Self {
        Self {
            id_scheme: IdScheme::default(),
            sequential_start: 1,
            run_hook_on_replace: true,
        }
    }
}

/// On-disk layout: everything lives under `[registry]`.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    registry: CodexConfig,
}

impl CodexConfig {
    /// Parses a configuration document.
    pub fn from_toml_str(contents: &str) -> CodexResult<Self> {
        let file: ConfigFile = toml::from_str(contents)?;
        Ok(file.registry)
    }

    /// Reads and parses `path`, failing on a missing or malformed file.
    pub fn try_load_from(path: &Path) -> CodexResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&contents)?;
        info!(path = %path.display(), id_scheme = %config.id_scheme, "Loaded registry config");
        Ok(config)
    }

    /// Reads `path` if it exists.
    /// Falls back to the defaults, with a warning, on read or parse errors.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            info!(path = %path.display(), "No registry config found, using defaults");
            return Self::default();
        }

        match Self::try_load_from(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    path = %path.display(),
                    "Failed to load registry config: {}. Falling back to defaults.",
                    e
                );
                Self::default()
            }
        }
    }

    /// Builds the identifier generator this configuration selects.
    #[must_use]
    pub fn generator(&self) -> Box<dyn IdGenerator> {
        self.id_scheme.generator(self.sequential_start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CodexError;

    #[test]
    fn defaults() {
        let config = CodexConfig::default();
        assert_eq!(config.id_scheme, IdScheme::V7);
        assert_eq!(config.sequential_start, 1);
        assert!(config.run_hook_on_replace);
    }

    #[test]
    fn parses_full_document() {
        let toml_str = r#"
[registry]
id-scheme = "sequential"
sequential-start = 100
run-hook-on-replace = false
"#;
        let config = CodexConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.id_scheme, IdScheme::Sequential);
        assert_eq!(config.sequential_start, 100);
        assert!(!config.run_hook_on_replace);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let toml_str = r#"
[registry]
id-scheme = "v4"
"#;
        let config = CodexConfig::from_toml_str(toml_str).unwrap();
        assert_eq!(config.id_scheme, IdScheme::V4);
        assert_eq!(config.sequential_start, 1);
        assert!(config.run_hook_on_replace);
    }

    #[test]
    fn empty_document_is_default() {
        let config = CodexConfig::from_toml_str("").unwrap();
        assert_eq!(config, CodexConfig::default());
    }

    #[test]
    fn unknown_scheme_is_rejected() {
        let toml_str = r#"
[registry]
id-scheme = "v1"
"#;
        let err = CodexConfig::from_toml_str(toml_str).unwrap_err();
        assert!(matches!(err, CodexError::Config(_)));
    }

    #[test]
    fn generator_follows_scheme() {
        let config = CodexConfig {
            id_scheme: IdScheme::Sequential,
            sequential_start: 7,
            ..Default::default()
        };
        let generator = config.generator();
        assert_eq!(generator.name(), "sequential");
        assert_eq!(generator.generate().unwrap().as_uuid().as_u128(), 7);
    }

    #[test]
    fn load_from_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = CodexConfig::load_from(&dir.path().join("codex.toml"));
        assert_eq!(config, CodexConfig::default());
    }

    #[test]
    fn load_from_malformed_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("codex.toml");
        std::fs::write(&path, "[registry\nid-scheme = ").unwrap();
        let config = CodexConfig::load_from(&path);
        assert_eq!(config, CodexConfig::default());
    }

    #[test]
    fn load_from_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("codex.toml");
        std::fs::write(&path, "[registry]\nid-scheme = \"v4\"\n").unwrap();
        let config = CodexConfig::load_from(&path);
        assert_eq!(config.id_scheme, IdScheme::V4);
    }

    #[test]
    fn try_load_from_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = CodexConfig::try_load_from(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, CodexError::Io(_)));
    }
}
