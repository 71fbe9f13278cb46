//! Engine configuration.
//!
//! Configuration is plain data loaded from TOML. Limits here may only narrow
//! the hard ceilings compiled into the crate (`MAX_KEY_BYTES`,
//! `MAX_VALUE_BYTES`), never widen them.

use crate::{
    MAX_KEY_BYTES, MAX_VALUE_BYTES,
    error::{ErrorClass, ErrorOrigin, InternalError},
};
use serde::Deserialize;
use thiserror::Error as ThisError;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(String),

    #[error("config value '{field}' must be between 1 and {max} (got {value})")]
    OutOfRange {
        field: &'static str,
        value: u64,
        max: u64,
    },
}

impl From<ConfigError> for InternalError {
    fn from(err: ConfigError) -> Self {
        Self::new(ErrorClass::Validation, ErrorOrigin::Config, err.to_string())
    }
}

///
/// EngineConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Largest encoded key (prefix included) accepted by a batch.
    pub max_key_bytes: u32,

    /// Largest stored value accepted by a batch.
    pub max_value_bytes: u32,

    /// Page size used by `ListOptions::first_page`.
    pub default_page_limit: u32,

    /// Whether storage operations emit metrics events.
    pub metrics_enabled: bool,
}

impl EngineConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(src: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(src).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("max_key_bytes", self.max_key_bytes, MAX_KEY_BYTES)?;
        check_range("max_value_bytes", self.max_value_bytes, MAX_VALUE_BYTES)?;
        check_range("default_page_limit", self.default_page_limit, u32::MAX)?;

        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_key_bytes: MAX_KEY_BYTES,
            max_value_bytes: MAX_VALUE_BYTES,
            default_page_limit: 100,
            metrics_enabled: true,
        }
    }
}

fn check_range(field: &'static str, value: u32, max: u32) -> Result<(), ConfigError> {
    if value == 0 || value > max {
        return Err(ConfigError::OutOfRange {
            field,
            value: u64::from(value),
            max: u64::from(max),
        });
    }

    Ok(())
}

///
/// TESTS
///
