//! Reader side of the data layer.
//!
//! Stands in for the external tag-management script: once it attaches it
//! processes everything already queued, then whatever arrives later.

use crate::layer::{DataLayer, DataLayerEvent};

/// Cursor over a [`DataLayer`]. Each event is yielded exactly once.
#[derive(Debug, Clone)]
pub struct LayerConsumer {
    layer: DataLayer,
    cursor: usize,
}

impl LayerConsumer {
    /// Attach at the start of the log so queued events are not missed.
    pub fn attach(layer: DataLayer) -> Self {
        Self { layer, cursor: 0 }
    }

    /// Events appended since the previous drain, in insertion order.
    pub fn drain(&mut self) -> Vec<DataLayerEvent> {
        let fresh = self.layer.since(self.cursor);
        self.cursor += fresh.len();
        fresh
    }

    /// Number of events already consumed.
    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn pending(&self) -> usize {
        self.layer.len().saturating_sub(self.cursor)
    }
}
