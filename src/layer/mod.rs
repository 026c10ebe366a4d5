//! Data layer: the ordered event queue shared with the tag-management script.
//!
//! # Data Flow
//! ```text
//! TagInjector::initialize → seed event (variables + gtm.start + gtm.js)
//! TagInjector::push / track_page_view → append
//!     → DataLayer (append-only, insertion ordered)
//!     → LayerConsumer::drain (external script, at its own pace)
//! ```
//!
//! # Design Decisions
//! - Entries are never removed or reordered; consumers keep a cursor
//! - Clones share one log, so a handle can be cloned freely
//! - A poisoned lock is recovered: the log stays usable after a panic elsewhere

pub mod consumer;
pub mod event;

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

pub use consumer::LayerConsumer;
pub use event::DataLayerEvent;

/// Append-only, insertion-ordered event log.
#[derive(Debug, Clone)]
pub struct DataLayer {
    name: Arc<str>,
    events: Arc<RwLock<Vec<DataLayerEvent>>>,
}

impl DataLayer {
    /// Create an empty layer with the page-global name `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Arc::from(name.into()),
            events: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append an event. Returns its position in the log.
    pub fn push(&self, event: DataLayerEvent) -> usize {
        let mut events = self.write();
        events.push(event);
        events.len() - 1
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Copy of every event currently in the log.
    pub fn snapshot(&self) -> Vec<DataLayerEvent> {
        self.read().clone()
    }

    /// Copy of the events at positions `from..`.
    pub fn since(&self, from: usize) -> Vec<DataLayerEvent> {
        self.read().get(from..).map(<[_]>::to_vec).unwrap_or_default()
    }

    pub fn first(&self) -> Option<DataLayerEvent> {
        self.read().first().cloned()
    }

    pub fn last(&self) -> Option<DataLayerEvent> {
        self.read().last().cloned()
    }

    /// True when both values refer to the same underlying log.
    pub fn shares_log_with(&self, other: &DataLayer) -> bool {
        Arc::ptr_eq(&self.events, &other.events)
    }

    /// The log as a JSON array.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&*self.read())
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<DataLayerEvent>> {
        self.events.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<DataLayerEvent>> {
        self.events.write().unwrap_or_else(PoisonError::into_inner)
    }
}
