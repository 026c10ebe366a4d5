//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::runtime::{apply_override, RuntimeOverride};
use crate::config::schema::InjectorConfig;
use crate::config::validation::{validate_config, ConfigError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ConfigError>),
}

fn join_errors(errors: &[ConfigError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Resolve the runtime override on an already-parsed config and validate it.
pub fn finalize_config(
    mut config: InjectorConfig,
    runtime: &RuntimeOverride,
) -> Result<InjectorConfig, LoadError> {
    config.gtm = apply_override(config.gtm, runtime);

    validate_config(&config.gtm).map_err(LoadError::Validation)?;

    Ok(config)
}

/// Parse a config from TOML text, resolve the runtime override and validate.
pub fn parse_config(content: &str, runtime: &RuntimeOverride) -> Result<InjectorConfig, LoadError> {
    finalize_config(toml::from_str(content)?, runtime)
}

/// Load and validate configuration from a TOML file.
///
/// The `[runtime]` table and the `GTM_ID` environment variable are merged
/// before validation.
pub fn load_config(path: &Path) -> Result<InjectorConfig, LoadError> {
    let content = fs::read_to_string(path)?;
    let config: InjectorConfig = toml::from_str(&content)?;
    let runtime = RuntimeOverride::from_env(&config.runtime);

    finalize_config(config, &runtime)
}
