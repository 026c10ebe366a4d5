//! Configuration file watcher for hot reload.
//!
//! Editors often emit several modify events per save; a reload is only
//! forwarded when the validated config differs from the last one sent.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::InjectorConfig;

/// Monitors the configuration file and forwards validated changes.
pub struct ConfigWatcher {
    path: PathBuf,
    current: InjectorConfig,
    update_tx: mpsc::UnboundedSender<InjectorConfig>,
}

impl ConfigWatcher {
    /// Create a watcher seeded with the config already in use.
    ///
    /// Returns the watcher and a receiver for configuration updates.
    pub fn new(
        path: &Path,
        current: InjectorConfig,
    ) -> (Self, mpsc::UnboundedReceiver<InjectorConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                current,
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching the file in a background thread.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let Self {
            path,
            mut current,
            update_tx,
        } = self;
        let watched = path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                let event = match res {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::error!(error = ?e, "Watch error");
                        return;
                    }
                };
                if !(event.kind.is_modify() || event.kind.is_create()) {
                    return;
                }

                match load_config(&path) {
                    Ok(next) if next == current => {
                        tracing::debug!("Config file touched without changes");
                    }
                    Ok(next) => {
                        tracing::info!(
                            container_id = %next.gtm.container_id,
                            "Config reloaded"
                        );
                        current = next.clone();
                        let _ = update_tx.send(next);
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to reload config, keeping current");
                    }
                }
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&watched, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?watched, "Config watcher started");
        Ok(watcher)
    }
}
