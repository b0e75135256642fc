//! Hot reload of the YAML config
//!
//! The parent directory is watched rather than the file itself. Editors that
//! save by writing a temp file and renaming it over the config replace the
//! inode, and a watch on the old inode goes silent after the first save.

use anyhow::{anyhow, Context, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::AppConfig;

/// Quiet period before a burst of file events is reloaded
const SETTLE: Duration = Duration::from_millis(100);

/// Delivers a freshly validated [`AppConfig`] each time the file changes
pub struct ConfigWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<AppConfig>,
}

/// Whether an event is a write, create or rename landing on `file_name`
fn touches_config(event: &Event, file_name: &OsString) -> bool {
    matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_))
        && event
            .paths
            .iter()
            .any(|path| path.file_name() == Some(file_name.as_os_str()))
}

/// Directory to watch and the file name to filter on
fn watch_target(config_path: &Path) -> Result<(PathBuf, OsString)> {
    let file_name = config_path
        .file_name()
        .ok_or_else(|| anyhow!("Config path has no file name: {}", config_path.display()))?
        .to_os_string();
    let dir = match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((dir, file_name))
}

impl ConfigWatcher {
    /// Load `config_path` and start watching it
    pub async fn new(config_path: String) -> Result<(Self, Arc<AppConfig>)> {
        let initial = AppConfig::load(&config_path)
            .await
            .context("Failed to load initial config")?;

        let (dir, file_name) = watch_target(Path::new(&config_path))?;
        let (tx, rx) = mpsc::channel(10);

        // Bumped on every matching event; only the latest spawned reload runs
        let generation = Arc::new(AtomicU64::new(0));
        let runtime = Handle::current();
        let path = config_path.clone();

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            let event = match res {
                Ok(event) => event,
                Err(e) => {
                    error!("Watch error: {}", e);
                    return;
                }
            };
            if !touches_config(&event, &file_name) {
                return;
            }
            debug!("Config event {:?} on {:?}", event.kind, event.paths);

            let ticket = generation.fetch_add(1, Ordering::SeqCst) + 1;
            let generation = generation.clone();
            let path = path.clone();
            let tx = tx.clone();

            runtime.spawn(async move {
                tokio::time::sleep(SETTLE).await;
                if generation.load(Ordering::SeqCst) != ticket {
                    return;
                }

                match AppConfig::load(&path).await {
                    Ok(config) => {
                        info!("Configuration reloaded from {}", path);
                        if tx.send(config).await.is_err() {
                            debug!("Config receiver dropped");
                        }
                    }
                    Err(e) => warn!("Ignoring config change (keeping old config): {:#}", e),
                }
            });
        })?;

        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch config directory: {}", dir.display()))?;

        info!("Watching {} for config changes", config_path);

        Ok((
            Self {
                _watcher: watcher,
                rx,
            },
            Arc::new(initial),
        ))
    }

    /// Next reloaded config; `None` once the watcher is gone
    pub async fn next_config(&mut self) -> Option<AppConfig> {
        self.rx.recv().await
    }
}
