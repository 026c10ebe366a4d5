//! Shared fixtures for integration tests.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};

use gtm_injector::{GtmConfig, InjectedHandle, TagInjector};
use serde_json::json;

/// The sample container from the reference configuration.
#[allow(dead_code)]
pub const SAMPLE_ID: &str = "GTM-KLQB72K";

/// Deferred, page-tracking config seeded with `{test: "1"}`.
#[allow(dead_code)]
pub fn sample_config() -> GtmConfig {
    let mut config = GtmConfig::new(SAMPLE_ID);
    config.defer_script_load = true;
    config.enable_auto_page_tracking = true;
    config.initial_variables.insert("test".into(), json!("1"));
    config
}

/// Initialize a config that must be valid.
#[allow(dead_code)]
pub fn init(config: GtmConfig) -> InjectedHandle {
    TagInjector::initialize(config).expect("fixture config is valid")
}

/// Write `content` to a unique file under the temp dir.
#[allow(dead_code)]
pub fn write_temp_config(content: &str) -> PathBuf {
    static COUNTER: AtomicU32 = AtomicU32::new(0);
    let n = COUNTER.fetch_add(1, Ordering::SeqCst);
    let path = std::env::temp_dir().join(format!("gtm-injector-{}-{n}.toml", std::process::id()));
    std::fs::write(&path, content).unwrap();
    path
}
