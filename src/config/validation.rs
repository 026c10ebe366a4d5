//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Container id format (`GTM-` followed by uppercase alphanumerics)
//! - Reserved seed-event keys in initial variables
//! - Layer name usable as a JavaScript identifier
//! - Script and noscript URLs parse as absolute URLs
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GtmConfig → Result<(), Vec<ConfigError>>
//! - Runs before a config is accepted by the injector

use thiserror::Error;
use url::Url;

use crate::config::schema::GtmConfig;

/// Prefix every container id carries.
pub const CONTAINER_PREFIX: &str = "GTM-";

/// Keys owned by the seed event; user variables may not shadow them.
pub const RESERVED_KEYS: [&str; 2] = ["event", "gtm.start"];

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Container id is missing or does not look like `GTM-XXXXXXX`.
    #[error("invalid container id {0:?}: expected GTM- followed by uppercase letters or digits")]
    InvalidContainerId(String),

    /// An initial variable collides with a reserved seed-event key.
    #[error("initial variable {0:?} collides with a reserved event key")]
    ReservedVariable(String),

    /// Layer name cannot be used as a page-global identifier.
    #[error("invalid layer name {0:?}")]
    InvalidLayerName(String),

    /// A configured URL does not parse.
    #[error("invalid {field}: {reason}")]
    InvalidUrl { field: &'static str, reason: String },
}

/// Check a container id against the `GTM-XXXXXXX` shape.
pub fn validate_container_id(id: &str) -> Result<(), ConfigError> {
    let valid = id
        .strip_prefix(CONTAINER_PREFIX)
        .map(|rest| {
            !rest.is_empty()
                && rest
                    .chars()
                    .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        })
        .unwrap_or(false);

    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidContainerId(id.to_string()))
    }
}

fn is_js_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn check_url(field: &'static str, raw: &str, errors: &mut Vec<ConfigError>) {
    if let Err(e) = Url::parse(raw) {
        errors.push(ConfigError::InvalidUrl {
            field,
            reason: e.to_string(),
        });
    }
}

/// Validate a container configuration, collecting every problem.
pub fn validate_config(config: &GtmConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if let Err(e) = validate_container_id(&config.container_id) {
        errors.push(e);
    }

    for key in RESERVED_KEYS {
        if config.initial_variables.contains_key(key) {
            errors.push(ConfigError::ReservedVariable(key.to_string()));
        }
    }

    if !is_js_identifier(&config.layer_name) {
        errors.push(ConfigError::InvalidLayerName(config.layer_name.clone()));
    }

    check_url("script_url", &config.script_url, &mut errors);
    if config.noscript {
        check_url("noscript_url", &config.noscript_url, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
