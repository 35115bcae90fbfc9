//! Actor Coordinator - wires up the live-reload actor system
//!
//! - Creates communication channels
//! - Starts the reload acceptor on an already bound listener
//! - Runs the actors until shutdown

mod runtime;

use std::sync::Arc;

use anyhow::{Context, Result};
use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use super::fs::FsActor;
use super::messages::{TaskMsg, WsMsg};
use super::task::TaskActor;
use super::ws::WsActor;
use crate::config::PipelineConfig;
use crate::reload::server::ReloadListener;
use crate::watch::WatchRules;

const CHANNEL_BUFFER: usize = 32;

/// Coordinator - wires up and runs the actor system.
pub struct Coordinator {
    config: Arc<PipelineConfig>,
    reload: ReloadListener,
    watch: bool,
    shutdown_rx: Option<Receiver<()>>,
}

impl Coordinator {
    pub fn new(config: Arc<PipelineConfig>, reload: ReloadListener) -> Self {
        Self {
            config,
            reload,
            watch: true,
            shutdown_rx: None,
        }
    }

    /// Run the watcher and task actors (off for `browsersync`).
    pub fn with_watch(mut self, watch: bool) -> Self {
        self.watch = watch;
        self
    }

    /// Set shutdown signal receiver.
    pub fn with_shutdown_signal(mut self, rx: Receiver<()>) -> Self {
        self.shutdown_rx = Some(rx);
        self
    }

    /// Run the actor system.
    pub async fn run(self) -> Result<()> {
        let (task_tx, task_rx) = mpsc::channel::<TaskMsg>(CHANNEL_BUFFER);
        let (ws_tx, ws_rx) = mpsc::channel::<WsMsg>(CHANNEL_BUFFER);

        self.reload.start(ws_tx.clone())?;
        let ws_actor = WsActor::new(ws_rx);

        let watchers = if self.watch {
            let rules = WatchRules::from_config(&self.config).context("invalid watch pattern")?;
            let fs_actor = FsActor::new(task_tx.clone(), Arc::clone(&self.config))
                .context("failed to start file watcher")?;
            let task_actor = TaskActor::new(task_rx, ws_tx.clone(), rules, Arc::clone(&self.config));
            Some((fs_actor, task_actor))
        } else {
            None
        };

        crate::debug!("actor"; "start");
        runtime::run_actors(watchers, ws_actor, task_tx, ws_tx, self.shutdown_rx).await;
        crate::debug!("actor"; "stopped");
        Ok(())
    }
}
