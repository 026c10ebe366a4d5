//! Page model the injector mutates.
//!
//! # Responsibilities
//! - Hold the injected head scripts and body noscript fallbacks
//! - Hold the page-global data layers, by name
//! - Report the Do-Not-Track signal
//! - Render the injected markup as HTML fragments
//!
//! # Design Decisions
//! - The installed container is read back from the script `src`, not tracked
//!   separately, so the page is the single source of truth
//! - A layer name, once attached, keeps its log (`window[l] = window[l] || []`)

pub mod tags;

use crate::layer::DataLayer;

pub use tags::{NoscriptTag, ScriptLoading, ScriptTag};

/// The document the container is injected into.
#[derive(Debug, Clone, Default)]
pub struct Page {
    do_not_track: bool,
    scripts: Vec<ScriptTag>,
    noscripts: Vec<NoscriptTag>,
    layers: Vec<DataLayer>,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    /// A page whose visitor sent a Do-Not-Track preference.
    pub fn with_do_not_track(do_not_track: bool) -> Self {
        Self {
            do_not_track,
            ..Self::default()
        }
    }

    pub fn do_not_track(&self) -> bool {
        self.do_not_track
    }

    /// Container id of the installed script, if any.
    pub fn active_container(&self) -> Option<String> {
        self.scripts.iter().find_map(ScriptTag::container_id)
    }

    /// Layer name the installed container reads, if any container is installed.
    pub fn active_layer_name(&self) -> Option<String> {
        self.scripts
            .iter()
            .find(|tag| tag.container_id().is_some())
            .map(ScriptTag::layer_name)
    }

    pub fn scripts(&self) -> &[ScriptTag] {
        &self.scripts
    }

    pub fn noscripts(&self) -> &[NoscriptTag] {
        &self.noscripts
    }

    pub fn add_script(&mut self, tag: ScriptTag) {
        self.scripts.push(tag);
    }

    pub fn add_noscript(&mut self, tag: NoscriptTag) {
        self.noscripts.push(tag);
    }

    /// Remove every tag loading `container_id`. Returns how many were removed.
    pub fn remove_container(&mut self, container_id: &str) -> usize {
        let before = self.scripts.len() + self.noscripts.len();
        self.scripts
            .retain(|tag| tag.container_id().as_deref() != Some(container_id));
        self.noscripts
            .retain(|tag| tag.container_id().as_deref() != Some(container_id));
        before - (self.scripts.len() + self.noscripts.len())
    }

    /// Expose `layer` under its name. A name already taken keeps its log.
    pub fn attach_layer(&mut self, layer: DataLayer) -> bool {
        if self.layer(layer.name()).is_some() {
            return false;
        }
        self.layers.push(layer);
        true
    }

    pub fn detach_layer(&mut self, name: &str) -> Option<DataLayer> {
        let index = self.layers.iter().position(|l| l.name() == name)?;
        Some(self.layers.remove(index))
    }

    /// Page-global layer lookup, like `window[name]`.
    pub fn layer(&self, name: &str) -> Option<DataLayer> {
        self.layers.iter().find(|l| l.name() == name).cloned()
    }

    /// Markup for `<head>`: layer bootstraps first, then container scripts.
    pub fn render_head(&self) -> serde_json::Result<String> {
        let mut parts = Vec::with_capacity(self.layers.len() + self.scripts.len());
        for layer in &self.layers {
            parts.push(tags::render_layer_bootstrap(layer)?);
        }
        parts.extend(self.scripts.iter().map(ToString::to_string));
        Ok(parts.join("\n"))
    }

    /// Markup for the start of `<body>`.
    pub fn render_body(&self) -> String {
        self.noscripts
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
