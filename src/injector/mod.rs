//! Tag manager injection.
//!
//! # Data Flow
//! ```text
//! GtmConfig (+ RuntimeOverride)
//!     → initialize: validate, seed the layer → InjectedHandle
//!     → install: one <script> (+ <noscript>) per container, layer exposed on the page
//!     → push / track_page_view: append to the layer the handle is bound to
//! ```
//!
//! # Design Decisions
//! - Installation is idempotent by container id, read back from the page
//! - A different container on the page is a conflict, never overwritten
//! - Events can be pushed before install; the layer is replayed on attach
//! - The page's layer is the single queue per container: later handles for
//!   the installed container are rebound to it, backlog included
//! - Every failure is a returned value; nothing here panics

pub mod error;
pub mod handle;
pub mod route;

use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::Value;
use url::Url;

use crate::config::runtime::{apply_override, RuntimeOverride};
use crate::config::schema::{GtmConfig, DEFAULT_LAYER_NAME};
use crate::config::validation::{validate_config, ConfigError};
use crate::layer::event::{EVENT_KEY, START_KEY};
use crate::layer::{DataLayer, DataLayerEvent};
use crate::page::{NoscriptTag, Page, ScriptLoading, ScriptTag};

pub use error::InstallError;
pub use handle::{InjectedHandle, PublicRuntimeConfig};
pub use route::Route;

/// Event name of the seed entry.
pub const START_EVENT: &str = "gtm.js";

/// `pageType` value of automatic page views.
pub const PAGE_VIEW_TYPE: &str = "PageView";

/// What `install` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallOutcome {
    /// Tags were added to the page.
    Installed,
    /// The same container was already on the page; no tags changed and the
    /// handle now feeds the page's layer.
    AlreadyInstalled,
    /// The config has `enabled = false`.
    Disabled,
    /// The visitor asked not to be tracked and the config respects it.
    DoNotTrack,
}

/// Injects a container into a page and feeds its data layer.
#[derive(Debug, Default)]
pub struct TagInjector {
    page: Page,
}

impl TagInjector {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn into_page(self) -> Page {
        self.page
    }

    /// Validate `config` and seed a fresh layer with the initial variables.
    ///
    /// The seed event is `{...initial_variables, "gtm.start": <ms>, "event": "gtm.js"}`
    /// and is always the first entry of the handle's layer.
    pub fn initialize(config: GtmConfig) -> Result<InjectedHandle, ConfigError> {
        if let Err(mut errors) = validate_config(&config) {
            for extra in errors.iter().skip(1) {
                tracing::warn!(error = %extra, "Additional configuration problem");
            }
            let first = errors.remove(0);
            tracing::error!(error = %first, "Rejecting tag manager configuration");
            return Err(first);
        }

        let script_src = script_url(&config).map_err(|e| url_error("script_url", e))?;
        let noscript_src = if config.noscript {
            Some(noscript_url(&config).map_err(|e| url_error("noscript_url", e))?)
        } else {
            None
        };

        let layer = DataLayer::new(config.layer_name.clone());
        layer.push(seed_event(&config));

        tracing::debug!(
            container_id = %config.container_id,
            layer = %config.layer_name,
            variables = config.initial_variables.len(),
            "Tag manager initialized"
        );

        Ok(InjectedHandle::new(config, script_src, noscript_src, layer))
    }

    /// [`initialize`](Self::initialize) after resolving the container id override.
    pub fn initialize_with_override(
        config: GtmConfig,
        runtime: &RuntimeOverride,
    ) -> Result<InjectedHandle, ConfigError> {
        Self::initialize(apply_override(config, runtime))
    }

    /// Ensure exactly one script tag for the handle's container is on the page.
    ///
    /// A handle for a container that is already installed is rebound to the
    /// page's layer, so its events reach the running container.
    pub fn install(&mut self, handle: &InjectedHandle) -> Result<InstallOutcome, InstallError> {
        let config = handle.config();
        let requested = handle.container_id();

        if !config.enabled {
            tracing::debug!(container_id = %requested, "Tag manager disabled, not injecting");
            return Ok(InstallOutcome::Disabled);
        }
        if config.respect_do_not_track && self.page.do_not_track() {
            tracing::debug!(container_id = %requested, "Do-Not-Track set, not injecting");
            return Ok(InstallOutcome::DoNotTrack);
        }

        match self.page.active_container() {
            Some(active) if active == requested => {
                let layer_name = self.page.active_layer_name().unwrap_or_default();
                let moved = self.bind_to_page_layer(handle, &layer_name);
                tracing::debug!(
                    container_id = %requested,
                    moved_events = moved,
                    "Container already installed"
                );
                return Ok(InstallOutcome::AlreadyInstalled);
            }
            Some(active) => {
                tracing::warn!(
                    active = %active,
                    requested = %requested,
                    "Refusing to install over a different container"
                );
                return Err(InstallError::AlreadyInstalledDifferentContainer {
                    active,
                    requested: requested.to_string(),
                });
            }
            None => {}
        }

        self.page.add_script(ScriptTag {
            src: handle.script_src().clone(),
            loading: ScriptLoading::from_defer(config.defer_script_load),
            crossorigin: config.crossorigin.clone(),
        });
        if let Some(src) = handle.noscript_src() {
            self.page.add_noscript(NoscriptTag { src: src.clone() });
        }
        if !self.page.attach_layer(handle.layer()) {
            let moved = self.bind_to_page_layer(handle, &config.layer_name);
            tracing::debug!(
                layer = %config.layer_name,
                moved_events = moved,
                "Layer already on page, events rerouted to it"
            );
        }

        tracing::info!(
            container_id = %requested,
            defer = config.defer_script_load,
            queued_events = handle.layer().len(),
            "Tag manager installed"
        );
        Ok(InstallOutcome::Installed)
    }

    /// Remove the handle's container from the page. False if it was not installed.
    pub fn uninstall(&mut self, handle: &InjectedHandle) -> bool {
        let requested = handle.container_id();
        if self.page.active_container().as_deref() != Some(requested) {
            return false;
        }

        // The container owns its layer, whichever handle attached it.
        let layer_name = self.page.active_layer_name();
        let removed = self.page.remove_container(requested);
        if let Some(name) = layer_name {
            self.page.detach_layer(&name);
        }

        tracing::info!(container_id = %requested, removed_tags = removed, "Tag manager uninstalled");
        true
    }

    /// Append a page view for `route` when automatic page tracking is on.
    ///
    /// Reporting the path already current is not a route change and appends nothing.
    pub fn track_page_view(&self, handle: &InjectedHandle, route: &Route) {
        let config = handle.config();
        if !config.enable_auto_page_tracking || !handle.enter_path(&route.path) {
            return;
        }

        let event = DataLayerEvent::named(config.page_view_event_name.clone())
            .with("pageType", PAGE_VIEW_TYPE)
            .with("routeName", route.name.clone().map_or(Value::Null, Value::from))
            .with("path", route.path.clone());
        let position = handle.push(event);

        tracing::trace!(path = %route.path, position, "Page view tracked");
    }

    /// Append `event` to the handle's layer, installed or not.
    pub fn push(&self, handle: &InjectedHandle, event: DataLayerEvent) {
        let position = handle.push(event);
        tracing::trace!(container_id = %handle.container_id(), position, "Event pushed");
    }

    /// Point `handle` at the page's layer `layer_name`, carrying its backlog over.
    fn bind_to_page_layer(&self, handle: &InjectedHandle, layer_name: &str) -> usize {
        match self.page.layer(layer_name) {
            Some(page_layer) => handle.rebind(page_layer),
            None => 0,
        }
    }

    /// Read-only runtime configuration for the handle.
    pub fn public_runtime_config(handle: &InjectedHandle) -> PublicRuntimeConfig {
        handle.public_runtime_config()
    }
}

fn seed_event(config: &GtmConfig) -> DataLayerEvent {
    let started_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64;

    let mut event: DataLayerEvent = config
        .initial_variables
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    event.insert(START_KEY, started_ms);
    event.insert(EVENT_KEY, START_EVENT);
    event
}

fn url_error(field: &'static str, e: url::ParseError) -> ConfigError {
    ConfigError::InvalidUrl {
        field,
        reason: e.to_string(),
    }
}

fn with_query(base: &str, config: &GtmConfig, include_layer: bool) -> Result<Url, url::ParseError> {
    let mut url = Url::parse(base)?;
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("id", &config.container_id);
        if include_layer && config.layer_name != DEFAULT_LAYER_NAME {
            query.append_pair("l", &config.layer_name);
        }
        for (key, value) in &config.query_params {
            query.append_pair(key, value);
        }
    }
    Ok(url)
}

fn script_url(config: &GtmConfig) -> Result<Url, url::ParseError> {
    with_query(&config.script_url, config, true)
}

fn noscript_url(config: &GtmConfig) -> Result<Url, url::ParseError> {
    with_query(&config.noscript_url, config, false)
}
