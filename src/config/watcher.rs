//! Configuration file watcher for hot reload.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_from_file;
use crate::config::schema::LogConfig;

/// Events with no paths are treated as touching the file.
fn touches(event: &Event, path: &Path) -> bool {
    let name = path.file_name().unwrap_or_default();
    event.paths.is_empty() || event.paths.iter().any(|p| p.ends_with(name))
}

/// Monitors the configuration file and forwards every valid new version.
pub struct ConfigWatcher {
    path: PathBuf,
    update_tx: mpsc::UnboundedSender<LogConfig>,
}

impl ConfigWatcher {
    /// Create a watcher and the receiver its updates arrive on.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<LogConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching. The returned watcher must be kept alive.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx.clone();
        let path = self.path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    let relevant = event.kind.is_modify() || event.kind.is_create();
                    if relevant && touches(&event, &path) {
                        tracing::info!(path = ?path, "Log config change detected, reloading");
                        match load_from_file(&path) {
                            Ok(new_config) => {
                                let _ = tx.send(new_config);
                            }
                            Err(e) => {
                                tracing::error!(error = %e, "Failed to reload log config, keeping current one");
                            }
                        }
                    }
                }
                Err(e) => tracing::error!(error = ?e, "Config watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Log config watcher started");
        Ok(watcher)
    }
}
