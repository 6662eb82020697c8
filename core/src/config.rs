//! Storage configuration.
//!
//! The only knob is whether development diagnostics are emitted. It defaults
//! to on in debug builds and off in release builds; `TODO_STORE_DIAGNOSTICS`
//! overrides it when loading with [`StorageConfig::from_env`].

use serde::Deserialize;

/// Settings shared by the loader, saver and normalizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_diagnostics")]
    pub diagnostics: bool,
}

fn default_diagnostics() -> bool {
    cfg!(debug_assertions)
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            diagnostics: default_diagnostics(),
        }
    }
}

impl StorageConfig {
    /// Built-in defaults layered with `TODO_STORE_*` environment variables.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .set_default("diagnostics", default_diagnostics())?
            .add_source(config::Environment::with_prefix("TODO_STORE").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    pub fn with_diagnostics(mut self, diagnostics: bool) -> Self {
        self.diagnostics = diagnostics;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_follows_build_profile() {
        assert_eq!(StorageConfig::default().diagnostics, cfg!(debug_assertions));
    }

    #[test]
    fn with_diagnostics_overrides() {
        let config = StorageConfig::default().with_diagnostics(false);
        assert!(!config.diagnostics);
        assert!(config.with_diagnostics(true).diagnostics);
    }

    #[test]
    fn deserializes_with_missing_field() {
        let config: StorageConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, StorageConfig::default());
        let config: StorageConfig = serde_json::from_str(r#"{"diagnostics":false}"#).unwrap();
        assert!(!config.diagnostics);
    }

    #[test]
    fn from_env_builds_without_variables() {
        // Only checks that the layered sources deserialize; the environment
        // may legitimately set the variable either way.
        assert!(StorageConfig::from_env().is_ok());
    }
}
