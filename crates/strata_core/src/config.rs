//! # Engine Configuration
//!
//! Capacity and drain limits, loaded once at startup.
//!
//! ```toml
//! max_entities = 50000
//! max_actions_per_drain = 100000
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::{EcsError, EcsResult};

/// Default maximum number of entity ids a registry may issue.
pub const DEFAULT_MAX_ENTITIES: u32 = 100_000;

/// Configuration for a [`Universe`](crate::Universe).
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EcsConfig {
    /// Maximum number of entity ids issued over the registry's lifetime.
    ///
    /// Also bounds the number of live components per storage.
    pub max_entities: u32,
    /// Cap on actions executed by one drain. `None` means unbounded: an action
    /// that keeps re-enqueueing itself then never lets the drain finish.
    pub max_actions_per_drain: Option<usize>,
}

impl Default for EcsConfig {
    fn default() -> Self {
        Self {
            max_entities: DEFAULT_MAX_ENTITIES,
            max_actions_per_drain: None,
        }
    }
}

impl EcsConfig {
    /// Creates a configuration with the given entity capacity.
    #[must_use]
    pub fn with_max_entities(max_entities: u32) -> Self {
        Self {
            max_entities,
            ..Self::default()
        }
    }

    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::ConfigParse`] on malformed input and
    /// [`EcsError::InvalidConfig`] on out-of-range values.
    pub fn from_toml_str(source: &str) -> EcsResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::ConfigIo`] if the file cannot be read, otherwise
    /// the same errors as [`EcsConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> EcsResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| EcsError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Checks that all values are in range.
    ///
    /// `max_entities` must leave room for the null sentinel.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] describing the first bad value.
    pub fn validate(&self) -> EcsResult<()> {
        if self.max_entities == 0 {
            return Err(EcsError::InvalidConfig(
                "max_entities must be greater than zero".into(),
            ));
        }
        if self.max_entities == u32::MAX {
            return Err(EcsError::InvalidConfig(
                "max_entities must be below u32::MAX".into(),
            ));
        }
        if self.max_actions_per_drain == Some(0) {
            return Err(EcsError::InvalidConfig(
                "max_actions_per_drain must be greater than zero when set".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EcsConfig::default();
        assert_eq!(config.max_entities, DEFAULT_MAX_ENTITIES);
        assert_eq!(config.max_actions_per_drain, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_document() {
        let config = EcsConfig::from_toml_str("max_entities = 64").unwrap();
        assert_eq!(config.max_entities, 64);
        assert_eq!(config.max_actions_per_drain, None);

        let config = EcsConfig::from_toml_str("max_actions_per_drain = 8").unwrap();
        assert_eq!(config.max_entities, DEFAULT_MAX_ENTITIES);
        assert_eq!(config.max_actions_per_drain, Some(8));
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            EcsConfig::from_toml_str("max_entities = 0"),
            Err(EcsError::InvalidConfig(_))
        ));
        assert!(matches!(
            EcsConfig::from_toml_str("max_actions_per_drain = 0"),
            Err(EcsError::InvalidConfig(_))
        ));
        assert!(matches!(
            EcsConfig::from_toml_str("max_entities = \"lots\""),
            Err(EcsError::ConfigParse(_))
        ));
        assert!(matches!(
            EcsConfig::from_toml_str("unknown_key = 1"),
            Err(EcsError::ConfigParse(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let path = std::env::temp_dir().join("strata_missing_config_file.toml");
        assert!(matches!(
            EcsConfig::load(&path),
            Err(EcsError::ConfigIo { .. })
        ));
    }
}
