//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! config, injector, watcher
//!     → tracing events with structured fields
//!     → logging.rs subscriber (stderr, EnvFilter)
//! ```

pub mod logging;

pub use logging::init_logging;
