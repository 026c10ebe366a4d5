//! Google Tag Manager injection library.
//!
//! Validates a container configuration, injects the container script into a
//! page model exactly once, and feeds the container's data layer.

pub mod config;
pub mod injector;
pub mod layer;
pub mod observability;
pub mod page;

pub use config::schema::{GtmConfig, InjectorConfig};
pub use config::{resolve_container_id, ConfigError, RuntimeOverride};
pub use injector::{InjectedHandle, InstallError, InstallOutcome, Route, TagInjector};
pub use layer::{DataLayer, DataLayerEvent, LayerConsumer};
pub use page::Page;
