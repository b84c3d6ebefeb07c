//! Engine configuration.
//!
//! Configuration is plain data loaded from TOML:
//!
//! ```toml
//! [naming]
//! mode = "optimized"
//! prefix = "n"
//! first_id = 1
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::naming::NamingMode;
use crate::{Error, Result};

/// Name generation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    /// Readable or optimized names.
    pub mode: NamingMode,
    /// Prefix of optimized names.
    pub prefix: String,
    /// First value of the unique-id counter.
    pub first_id: u64,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            mode: NamingMode::Readable,
            prefix: "n".to_string(),
            first_id: 1,
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Name generation.
    pub naming: NamingConfig,
}

impl EngineConfig {
    /// Parse configuration from TOML text. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::config(e.to_string()))
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_toml_str(&text)
    }

    /// Serialize to TOML text.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| Error::config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_take_defaults() {
        let config = EngineConfig::from_toml_str("[naming]\nmode = \"optimized\"\n").unwrap();
        assert_eq!(config.naming.mode, NamingMode::Optimized);
        assert_eq!(config.naming.prefix, "n");
        assert_eq!(config.naming.first_id, 1);

        assert_eq!(EngineConfig::from_toml_str("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn invalid_mode_is_a_config_error() {
        let err = EngineConfig::from_toml_str("[naming]\nmode = \"short\"\n").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn toml_round_trip() {
        let mut config = EngineConfig::default();
        config.naming.prefix = "css".into();
        let text = config.to_toml_string().unwrap();
        assert_eq!(EngineConfig::from_toml_str(&text).unwrap(), config);
    }
}
