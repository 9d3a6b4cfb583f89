//! Configuration for the SSI engine

use crate::domain::errors::ConfigError;
use crate::domain::value_objects::Value;
use serde::{Deserialize, Serialize};

/// Engine configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of sites, numbered from 1
    pub site_count: u32,
    /// Number of variables, numbered from 1
    pub variable_count: u32,
    /// Seed value of `x_i` is `initial_value_scale * i`
    pub initial_value_scale: Value,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.site_count == 0 {
            return Err(ConfigError::NoSites);
        }
        if self.variable_count == 0 {
            return Err(ConfigError::NoVariables);
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            site_count: 10,
            variable_count: 20,
            initial_value_scale: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.site_count, 10);
        assert_eq!(config.variable_count, 20);
        assert_eq!(config.initial_value_scale, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_empty_layout() {
        let config = EngineConfig {
            site_count: 0,
            ..EngineConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::NoSites));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"site_count": 4}"#).unwrap();
        assert_eq!(config.site_count, 4);
        assert_eq!(config.variable_count, 20);
    }
}
