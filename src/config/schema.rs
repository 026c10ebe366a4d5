//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the injector.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default name of the page-global event queue.
pub const DEFAULT_LAYER_NAME: &str = "dataLayer";

/// Default event name pushed on route changes.
pub const DEFAULT_PAGE_VIEW_EVENT: &str = "nuxtRoute";

/// Default container script location.
pub const DEFAULT_SCRIPT_URL: &str = "https://www.googletagmanager.com/gtm.js";

/// Default iframe fallback location for clients without JavaScript.
pub const DEFAULT_NOSCRIPT_URL: &str = "https://www.googletagmanager.com/ns.html";

/// Root configuration file layout.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct InjectorConfig {
    /// Static (build-time) container configuration.
    pub gtm: GtmConfig,

    /// Values resolvable at process start.
    pub runtime: RuntimeConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Tag manager container configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GtmConfig {
    /// Container id (e.g., "GTM-KLQB72K").
    pub container_id: String,

    /// Load the container script with `defer` instead of `async`.
    pub defer_script_load: bool,

    /// Push a page view event on every route change.
    pub enable_auto_page_tracking: bool,

    /// Name of the page-global event queue.
    pub layer_name: String,

    /// Variables merged into the seed event.
    pub initial_variables: BTreeMap<String, Value>,

    /// Inject anything at all. Events are still recorded when disabled.
    pub enabled: bool,

    /// Skip injection when the page reports Do-Not-Track.
    pub respect_do_not_track: bool,

    /// Event name used for automatic page views.
    pub page_view_event_name: String,

    /// Container script location.
    pub script_url: String,

    /// Emit the `<noscript>` iframe fallback.
    pub noscript: bool,

    /// Iframe fallback location.
    pub noscript_url: String,

    /// Extra query parameters (gtm_auth, gtm_preview, ...).
    pub query_params: BTreeMap<String, String>,

    /// Value of the script's `crossorigin` attribute, if any.
    pub crossorigin: Option<String>,
}

impl Default for GtmConfig {
    fn default() -> Self {
        Self {
            container_id: String::new(),
            defer_script_load: false,
            enable_auto_page_tracking: false,
            layer_name: DEFAULT_LAYER_NAME.to_string(),
            initial_variables: BTreeMap::new(),
            enabled: true,
            respect_do_not_track: true,
            page_view_event_name: DEFAULT_PAGE_VIEW_EVENT.to_string(),
            script_url: DEFAULT_SCRIPT_URL.to_string(),
            noscript: true,
            noscript_url: DEFAULT_NOSCRIPT_URL.to_string(),
            query_params: BTreeMap::new(),
            crossorigin: None,
        }
    }
}

impl GtmConfig {
    /// Convenience constructor with every other field defaulted.
    pub fn new(container_id: impl Into<String>) -> Self {
        Self {
            container_id: container_id.into(),
            ..Self::default()
        }
    }
}

/// Runtime-resolvable configuration.
///
/// Only the container id can be overridden here; everything else in
/// [`GtmConfig`] is fixed at build time.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Container id superseding `gtm.container_id`.
    pub container_id: Option<String>,
}

/// Observability configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
