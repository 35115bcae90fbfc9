//! FileSystem Actor
//!
//! Watches `paths.base` recursively and forwards debounced batches of
//! changed paths to the `TaskActor`. The watcher starts before the initial
//! build so no change is lost; events are held until `core::is_serving()`.
//!
//! ```text
//! notify → Debouncer (timing, dedup) → base-relative paths → TaskMsg
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use super::messages::TaskMsg;
use crate::config::PipelineConfig;
use crate::utils::path::normalize_path;

mod debouncer;
mod types;

use debouncer::Debouncer;

/// FileSystem Actor - watches for file changes
pub struct FsActor {
    /// Channel to receive notify events (sync -> async bridge)
    notify_rx: std::sync::mpsc::Receiver<notify::Result<notify::Event>>,
    /// Watcher handle (must be kept alive)
    _watcher: RecommendedWatcher,
    task_tx: mpsc::Sender<TaskMsg>,
    debouncer: Debouncer,
    config: Arc<PipelineConfig>,
}

impl FsActor {
    /// Start watching immediately; events buffer until `run`.
    pub fn new(task_tx: mpsc::Sender<TaskMsg>, config: Arc<PipelineConfig>) -> notify::Result<Self> {
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();

        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })?;
        watcher.watch(config.base(), RecursiveMode::Recursive)?;
        crate::debug!("watch"; "watching {}", config.base().display());

        Ok(Self {
            notify_rx,
            _watcher: watcher,
            task_tx,
            debouncer: Debouncer::new(),
            config,
        })
    }

    /// Run the actor event loop
    pub async fn run(self) {
        let Self {
            notify_rx,
            _watcher,
            task_tx,
            mut debouncer,
            config,
        } = self;

        let (async_tx, mut async_rx) = mpsc::channel::<notify::Event>(64);

        // notify is sync-only: bridge through a thread
        std::thread::spawn(move || {
            while let Ok(result) = notify_rx.recv() {
                match result {
                    Ok(event) => {
                        if async_tx.blocking_send(event).is_err() {
                            break;
                        }
                    }
                    Err(e) => crate::log!("watch"; "notify error: {}", e),
                }
            }
        });

        loop {
            tokio::select! {
                biased;
                Some(event) = async_rx.recv() => debouncer.add_event(&event),
                _ = tokio::time::sleep(debouncer.sleep_duration()) => {
                    if flush(&mut debouncer, &task_tx, &config).await.is_err() {
                        break;
                    }
                }
            }
        }
    }
}

/// Send the ready batch, if any.
///
/// Returns `Err(())` if the TaskActor shut down
async fn flush(
    debouncer: &mut Debouncer,
    task_tx: &mpsc::Sender<TaskMsg>,
    config: &PipelineConfig,
) -> Result<(), ()> {
    // Hold events until the initial build is done (check BEFORE taking)
    if !crate::core::is_serving() {
        return Ok(());
    }

    let Some(changes) = debouncer.take_if_ready() else {
        return Ok(());
    };

    let mut paths = relative_paths(changes.into_keys(), config.base(), config.build_dir());
    if paths.is_empty() {
        return Ok(());
    }
    paths.sort();

    crate::debug!("watch"; "{} changed", paths.len());
    task_tx.send(TaskMsg::Changed(paths)).await.map_err(|_| ())
}

/// Base-relative form of each path under `base`, skipping the release tree.
fn relative_paths(
    paths: impl IntoIterator<Item = PathBuf>,
    base: &Path,
    build: &Path,
) -> Vec<PathBuf> {
    let canonical_base = normalize_path(base);
    paths
        .into_iter()
        .filter(|path| !path.starts_with(build))
        .filter_map(|path| {
            path.strip_prefix(base)
                .or_else(|_| path.strip_prefix(&canonical_base))
                .ok()
                .filter(|rel| !rel.as_os_str().is_empty())
                .map(Path::to_path_buf)
        })
        .collect()
}
