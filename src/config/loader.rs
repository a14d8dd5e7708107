use std::fs;
use std::path::Path;

use crate::config::types::FactoryOptions;
use crate::error::ConfigError;

impl FactoryOptions {
    /// Parses options from TOML text. Does not validate.
    ///
    /// Missing fields take their defaults, so an empty document is valid.
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Loads options from a TOML file.
    ///
    /// - If the file doesn't exist, returns `FactoryOptions::default()`.
    /// - Returns an error if reading, parsing, or validation fails.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(FactoryOptions::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let options = Self::from_toml_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        options.validate()?;
        Ok(options)
    }

    /// Checks that the provided key is usable as a prop name.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.provided_key.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                message: "provided_key must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
