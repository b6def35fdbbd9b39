//! Hot reload of the pad layout
//!
//! Every write to the config file is re-read and validated. A file that no
//! longer parses keeps the previous layout; a file whose contents did not
//! actually change (editors often emit several modify events per save) is
//! not delivered again. Consumers decide what a reload means: `replay
//! --watch` reruns its script, the REPL remounts its live region handles.

use anyhow::{Context, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::AppConfig;

/// Time given to the editor to finish writing before re-reading
const SETTLE: Duration = Duration::from_millis(100);

/// Watches the pad config file and yields each new valid layout
pub struct ConfigWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<AppConfig>,
}

impl ConfigWatcher {
    /// Load `config_path` and start watching it
    pub async fn new(config_path: String) -> Result<(Self, Arc<AppConfig>)> {
        let (tx, rx) = mpsc::channel(10);

        let initial_config = AppConfig::load(&config_path)
            .await
            .context("Failed to load initial config")?;
        let last = Arc::new(Mutex::new(initial_config.clone()));

        // notify callbacks run on their own OS thread, not in Tokio context
        let runtime_handle = tokio::runtime::Handle::current();
        let path = config_path.clone();

        let mut watcher = notify::recommended_watcher(move |res: Result<Event, notify::Error>| {
            match res {
                Ok(event) if matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) => {
                    debug!("Layout file touched: {:?}", event.paths);
                    runtime_handle.spawn(reload(path.clone(), last.clone(), tx.clone()));
                }
                Ok(_) => {}
                Err(e) => error!("Watch error: {}", e),
            }
        })?;

        watcher
            .watch(Path::new(&config_path), RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch config file: {}", config_path))?;

        info!("Watching layout file: {}", config_path);

        Ok((Self { _watcher: watcher, rx }, Arc::new(initial_config)))
    }

    /// Wait for the next changed layout; `None` once the watcher is gone
    pub async fn next_config(&mut self) -> Option<AppConfig> {
        self.rx.recv().await
    }

    /// Latest pending layout, without waiting
    ///
    /// Older pending reloads are skipped.
    pub fn try_next_config(&mut self) -> Option<AppConfig> {
        let mut latest = None;
        while let Ok(config) = self.rx.try_recv() {
            latest = Some(config);
        }
        latest
    }
}

async fn reload(path: String, last: Arc<Mutex<AppConfig>>, tx: mpsc::Sender<AppConfig>) {
    tokio::time::sleep(SETTLE).await;

    let config = match AppConfig::load(&path).await {
        Ok(config) => config,
        Err(e) => {
            warn!("Layout reload rejected (keeping current layout): {:#}", e);
            return;
        }
    };

    {
        let mut last = last.lock();
        if *last == config {
            debug!("Layout file rewritten without changes");
            return;
        }
        *last = config.clone();
    }

    info!("🔄 Layout reloaded ({} region(s))", config.layout.len());
    if let Err(e) = tx.send(config).await {
        error!("Failed to deliver layout reload: {}", e);
    }
}
