//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → runtime.rs (container id override: [runtime] table, GTM_ID)
//!     → validation.rs (semantic checks)
//!     → GtmConfig (validated, immutable)
//!     → TagInjector::initialize
//!
//! On file change:
//!     watcher.rs detects change
//!     → loader.rs loads new config
//!     → validation.rs validates
//!     → new config sent to the receiver, which re-initializes
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields except the container id have defaults
//! - Only the container id is overridable at runtime
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod runtime;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, LoadError};
pub use runtime::{resolve_container_id, RuntimeOverride};
pub use schema::{GtmConfig, InjectorConfig};
pub use validation::ConfigError;
