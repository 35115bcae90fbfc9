use std::time::Duration;

use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use crate::actor::fs::FsActor;
use crate::actor::messages::{TaskMsg, WsMsg};
use crate::actor::task::TaskActor;
use crate::actor::ws::WsActor;

/// Run all actors concurrently until shutdown.
pub(super) async fn run_actors(
    watchers: Option<(FsActor, TaskActor)>,
    ws: WsActor,
    task_tx: mpsc::Sender<TaskMsg>,
    ws_tx: mpsc::Sender<WsMsg>,
    shutdown_rx: Option<Receiver<()>>,
) {
    let ws_handle = tokio::spawn(ws.run());

    let (fs_handle, task_handle) = match watchers {
        Some((fs, task)) => (Some(tokio::spawn(fs.run())), Some(tokio::spawn(task.run()))),
        None => (None, None),
    };

    if let Some(rx) = shutdown_rx {
        loop {
            if rx.try_recv().is_ok() || crate::core::is_shutdown() {
                crate::debug!("actor"; "shutdown signal received");
                break;
            }
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    } else if let Some(fs_handle) = fs_handle.as_ref() {
        while !fs_handle.is_finished() {
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    } else {
        std::future::pending::<()>().await;
    }

    let _ = task_tx.send(TaskMsg::Shutdown).await;
    let _ = ws_tx.send(WsMsg::Shutdown).await;

    if let Some(handle) = fs_handle {
        handle.abort();
    }
    if let Some(handle) = task_handle {
        let _ = tokio::time::timeout(Duration::from_millis(500), handle).await;
    }
    let _ = tokio::time::timeout(Duration::from_millis(500), ws_handle).await;
}
