//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::RebaseConfig;
use std::path::Path;

/// File name looked up by [`load_config`].
pub const CONFIG_FILE_NAME: &str = "strata.toml";

/// Loads and validates `<dir>/strata.toml`.
pub fn load_config(dir: &Path) -> Result<RebaseConfig, ConfigError> {
    let content = std::fs::read_to_string(dir.join(CONFIG_FILE_NAME))?;
    load_config_from_str(&content)
}

/// Parses and validates a configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<RebaseConfig, ConfigError> {
    let config: RebaseConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &RebaseConfig) -> Result<(), ConfigError> {
    let prefix = &config.naming.view_prefix;
    let valid_start = prefix
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if !valid_start || !prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ConfigError::ValidationError(format!(
            "naming.view_prefix `{prefix}` is not an identifier"
        )));
    }
    if config.limits.max_hierarchy_depth == 0 {
        return Err(ConfigError::ValidationError(
            "limits.max_hierarchy_depth must be > 0".to_string(),
        ));
    }
    Ok(())
}
