//! Runtime override resolution.
//!
//! The container id is the only field that can change after build time.
//! Resolution is a two-step pure function so it can be tested apart from
//! injection.

use crate::config::schema::{GtmConfig, RuntimeConfig};

/// Environment variable carrying a runtime container id.
pub const CONTAINER_ENV_VAR: &str = "GTM_ID";

/// Container id supplied at process or request start.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeOverride {
    pub container_id: Option<String>,
}

impl RuntimeOverride {
    /// Override carrying a specific container id.
    pub fn container(id: impl Into<String>) -> Self {
        Self {
            container_id: Some(id.into()),
        }
    }

    /// Build from the `[runtime]` config table, then let the environment win.
    ///
    /// Precedence is `GTM_ID`, then `[runtime].container_id`, then the static
    /// id. Nuxt's gtm module orders the first two the other way round
    /// (`publicRuntimeConfig.gtm.id` over `GTM_ID`).
    pub fn from_sources(runtime: &RuntimeConfig, env_value: Option<String>) -> Self {
        let container_id = env_value
            .filter(|v| !v.trim().is_empty())
            .or_else(|| runtime.container_id.clone().filter(|v| !v.trim().is_empty()));
        Self { container_id }
    }

    /// Same as [`from_sources`](Self::from_sources) reading `GTM_ID`.
    pub fn from_env(runtime: &RuntimeConfig) -> Self {
        Self::from_sources(runtime, std::env::var(CONTAINER_ENV_VAR).ok())
    }
}

/// Pick the effective container id: the override if present, else the static one.
pub fn resolve_container_id(static_config: &GtmConfig, runtime: &RuntimeOverride) -> String {
    match &runtime.container_id {
        Some(id) => id.trim().to_string(),
        None => static_config.container_id.clone(),
    }
}

/// Apply an override to a static config. Only `container_id` changes.
pub fn apply_override(mut static_config: GtmConfig, runtime: &RuntimeOverride) -> GtmConfig {
    let resolved = resolve_container_id(&static_config, runtime);
    if resolved != static_config.container_id {
        tracing::debug!(
            from = %static_config.container_id,
            to = %resolved,
            "Container id overridden at runtime"
        );
    }
    static_config.container_id = resolved;
    static_config
}
