//! Rules file watcher for hot reload.

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::config::loader::load_rules;
use crate::config::model::RewriterConfiguration;
use crate::observability::metrics;
use crate::registry::Registry;

/// Monitors the rules file and rebuilds the configuration when it changes.
pub struct RulesWatcher {
    path: PathBuf,
    registry: Registry,
    update_tx: mpsc::UnboundedSender<RewriterConfiguration>,
}

impl RulesWatcher {
    /// Create a new RulesWatcher.
    ///
    /// Returns the watcher and a receiver for successfully rebuilt configurations.
    pub fn new(
        path: &Path,
        registry: Registry,
    ) -> (Self, mpsc::UnboundedReceiver<RewriterConfiguration>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                registry,
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching the file. Dropping the returned watcher stops it.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx.clone();
        let path = self.path.clone();
        let registry = self.registry;

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        tracing::info!("Rules file change detected, reloading...");
                        match load_rules(&path, &registry) {
                            Ok(config) => {
                                metrics::record_reload(true);
                                let _ = tx.send(config);
                            }
                            Err(e) => {
                                metrics::record_reload(false);
                                tracing::error!(
                                    "Failed to reload rules: {}. Keeping current configuration.",
                                    e
                                );
                            }
                        }
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Rules watcher started");
        Ok(watcher)
    }
}
