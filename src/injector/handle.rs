//! Handle returned by a successful `initialize`.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::schema::GtmConfig;
use crate::layer::event::{EVENT_KEY, START_KEY};
use crate::layer::{DataLayer, DataLayerEvent};

/// A validated container configuration plus the layer its events go to.
///
/// Cloning is cheap and clones share the same layer binding. Until the
/// handle is installed the layer is its own; once the page exposes a layer
/// for the container, the handle is rebound to that one.
#[derive(Debug, Clone)]
pub struct InjectedHandle {
    config: Arc<GtmConfig>,
    script_src: Url,
    noscript_src: Option<Url>,
    layer: Arc<RwLock<DataLayer>>,
    last_path: Arc<Mutex<Option<String>>>,
}

impl InjectedHandle {
    pub(crate) fn new(
        config: GtmConfig,
        script_src: Url,
        noscript_src: Option<Url>,
        layer: DataLayer,
    ) -> Self {
        Self {
            config: Arc::new(config),
            script_src,
            noscript_src,
            layer: Arc::new(RwLock::new(layer)),
            last_path: Arc::new(Mutex::new(None)),
        }
    }

    pub fn container_id(&self) -> &str {
        &self.config.container_id
    }

    pub fn config(&self) -> &GtmConfig {
        &self.config
    }

    /// The layer events currently go to.
    pub fn layer(&self) -> DataLayer {
        self.layer
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn script_src(&self) -> &Url {
        &self.script_src
    }

    pub(crate) fn noscript_src(&self) -> Option<&Url> {
        self.noscript_src.as_ref()
    }

    /// Append to the bound layer. Returns the event's position.
    pub(crate) fn push(&self, event: DataLayerEvent) -> usize {
        self.layer
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event)
    }

    /// Route future pushes to `target` and move the backlog over.
    ///
    /// The own seed is not replayed since the page's container has already
    /// started; its variables are carried over as a plain entry. Returns how
    /// many entries were moved.
    pub(crate) fn rebind(&self, target: DataLayer) -> usize {
        let mut bound = self.layer.write().unwrap_or_else(PoisonError::into_inner);
        if bound.shares_log_with(&target) {
            return 0;
        }

        let mut moved = 0;
        for (index, event) in bound.snapshot().into_iter().enumerate() {
            let carried = if index == 0 && event.event_name() == Some(crate::injector::START_EVENT) {
                let variables: DataLayerEvent = event
                    .iter()
                    .filter(|(key, _)| key.as_str() != EVENT_KEY && key.as_str() != START_KEY)
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect();
                if variables.is_empty() {
                    continue;
                }
                variables
            } else {
                event
            };
            target.push(carried);
            moved += 1;
        }

        *bound = target;
        moved
    }

    /// Read-only values safe to expose to the rest of the application.
    pub fn public_runtime_config(&self) -> PublicRuntimeConfig {
        PublicRuntimeConfig {
            container_id: self.config.container_id.clone(),
            layer_name: self.config.layer_name.clone(),
            page_tracking: self.config.enable_auto_page_tracking,
            script_url: self.config.script_url.clone(),
        }
    }

    /// Record `path` as current. False when it already was.
    pub(crate) fn enter_path(&self, path: &str) -> bool {
        let mut last = self.last_path.lock().unwrap_or_else(PoisonError::into_inner);
        if last.as_deref() == Some(path) {
            return false;
        }
        *last = Some(path.to_string());
        true
    }
}

/// Public runtime configuration surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicRuntimeConfig {
    pub container_id: String,
    pub layer_name: String,
    pub page_tracking: bool,
    pub script_url: String,
}
