//! Task Actor
//!
//! Maps each batch of changed paths to watch actions, runs the triggered
//! tasks one after another on a blocking thread and tells the `WsActor`
//! what browsers should do. A failing task is reported and the loop keeps
//! going.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc;

use super::messages::{TaskMsg, WsMsg};
use crate::config::PipelineConfig;
use crate::logger::{status_error, status_success, status_unchanged, status_warning};
use crate::task::{Notify, Target, Task, TaskError, TaskReport};
use crate::utils::path::to_slash;
use crate::watch::{WatchAction, WatchRules};

pub struct TaskActor {
    rx: mpsc::Receiver<TaskMsg>,
    ws_tx: mpsc::Sender<WsMsg>,
    rules: WatchRules,
    config: Arc<PipelineConfig>,
    /// An error overlay is showing in connected browsers.
    has_error: bool,
}

impl TaskActor {
    pub fn new(
        rx: mpsc::Receiver<TaskMsg>,
        ws_tx: mpsc::Sender<WsMsg>,
        rules: WatchRules,
        config: Arc<PipelineConfig>,
    ) -> Self {
        Self {
            rx,
            ws_tx,
            rules,
            config,
            has_error: false,
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        while let Some(msg) = self.rx.recv().await {
            match msg {
                TaskMsg::Changed(paths) => self.handle_changes(&paths).await,
                TaskMsg::Shutdown => {
                    crate::debug!("task"; "shutting down");
                    break;
                }
            }
        }
    }

    async fn handle_changes(&mut self, paths: &[PathBuf]) {
        let actions = self.rules.actions_for(paths);
        if actions.is_empty() {
            crate::debug!("task"; "no rule matched {} change(s)", paths.len());
            return;
        }

        for action in actions {
            match action {
                WatchAction::Reload => {
                    let reason = paths
                        .first()
                        .map(|p| to_slash(p))
                        .unwrap_or_else(|| "file changed".into());
                    self.send(WsMsg::Reload { reason }).await;
                }
                WatchAction::Run(task) => self.run_task(task).await,
            }
        }
    }

    async fn run_task(&mut self, task: Task) {
        let config = Arc::clone(&self.config);
        let outcome = tokio::task::spawn_blocking(move || task.run(&config, Target::Dev)).await;

        match outcome {
            Ok(Ok(report)) => {
                self.show_report(&report);
                if self.has_error {
                    self.has_error = false;
                    self.send(WsMsg::ClearError).await;
                }
                if let Some(msg) = notice(&report, self.config.base()) {
                    self.send(msg).await;
                }
            }
            Ok(Err(err)) => self.report_error(&err).await,
            Err(join) => {
                status_error(&format!("{task} panicked"), &join.to_string());
            }
        }
    }

    /// One status block per run; per-file failures go under the summary.
    fn show_report(&self, report: &TaskReport) {
        let summary = format!("{}: {}", report.task, report.summary());
        if !report.failed.is_empty() {
            let mut block = summary;
            for (path, error) in &report.failed {
                block.push_str(&format!("\n  {}: {error}", self.config.base_relative(path).display()));
            }
            status_warning(&block);
        } else if report.written.is_empty() && report.removed == 0 {
            status_unchanged(&summary);
        } else {
            status_success(&summary);
        }
    }

    async fn report_error(&mut self, err: &TaskError) {
        let summary = format!("{} failed", err.task());
        let detail = err.to_string();
        status_error(&summary, &detail);

        self.has_error = true;
        self.send(WsMsg::Error {
            path: err.task().name().to_string(),
            error: detail,
        })
        .await;
    }

    async fn send(&self, msg: WsMsg) {
        if self.ws_tx.send(msg).await.is_err() {
            crate::debug!("task"; "ws actor gone");
        }
    }
}

/// Browser notification for a finished task.
///
/// A stream of stylesheets becomes a `css` swap; anything else in the
/// stream falls back to a full reload. Source maps are not announced.
fn notice(report: &TaskReport, base: &Path) -> Option<WsMsg> {
    match report.task.notify() {
        Notify::None => None,
        Notify::Reload => Some(WsMsg::Reload {
            reason: report.task.name().to_string(),
        }),
        Notify::Stream => {
            let streamed: Vec<&PathBuf> = report
                .written
                .iter()
                .filter(|p| p.extension().is_none_or(|ext| ext != "map"))
                .collect();
            if streamed.is_empty() {
                return None;
            }
            if streamed.iter().all(|p| p.extension().is_some_and(|ext| ext == "css")) {
                let targets = streamed
                    .iter()
                    .map(|p| to_slash(p.strip_prefix(base).unwrap_or(p)))
                    .collect();
                Some(WsMsg::Css(targets))
            } else {
                Some(WsMsg::Reload {
                    reason: report.task.name().to_string(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(task: Task, written: &[&str]) -> TaskReport {
        let mut report = TaskReport::new(task);
        report.written = written.iter().map(|p| Path::new("/app").join(p)).collect();
        report
    }

    #[test]
    fn test_styles_stream_css() {
        let msg = notice(
            &report(Task::Styles, &["css/app.min.css", "css/app.min.css.map"]),
            Path::new("/app"),
        );
        assert!(matches!(msg, Some(WsMsg::Css(ref t)) if t == &["css/app.min.css"]));
    }

    #[test]
    fn test_scripts_stream_reloads() {
        let msg = notice(&report(Task::Scripts, &["js/app.min.js"]), Path::new("/app"));
        assert!(matches!(msg, Some(WsMsg::Reload { ref reason }) if reason == "scripts"));
    }

    #[test]
    fn test_html_reloads() {
        let msg = notice(&report(Task::Html, &["pages/index.html"]), Path::new("/app"));
        assert!(matches!(msg, Some(WsMsg::Reload { .. })));
    }

    #[test]
    fn test_images_silent() {
        let msg = notice(&report(Task::Images, &["assets/images/dest/a.png"]), Path::new("/app"));
        assert!(msg.is_none());
    }

    #[test]
    fn test_empty_stream_silent() {
        assert!(notice(&report(Task::Styles, &[]), Path::new("/app")).is_none());
    }

    #[tokio::test]
    async fn test_failed_task_keeps_loop_alive() {
        use crate::config::test_config_at;
        use std::fs;
        use tempfile::TempDir;

        let dir = TempDir::new().unwrap();
        let config = Arc::new(test_config_at(dir.path(), ""));
        let entry = config.base().join("scss/main.scss");
        fs::create_dir_all(entry.parent().unwrap()).unwrap();
        fs::write(&entry, ".a { color: $missing; }").unwrap();

        let (task_tx, task_rx) = mpsc::channel(8);
        let (ws_tx, mut ws_rx) = mpsc::channel(8);
        let rules = WatchRules::from_config(&config).unwrap();
        let actor = tokio::spawn(TaskActor::new(task_rx, ws_tx, rules, Arc::clone(&config)).run());

        let changed = vec![PathBuf::from("scss/main.scss")];
        task_tx.send(TaskMsg::Changed(changed.clone())).await.unwrap();
        let first = ws_rx.recv().await.unwrap();
        assert!(matches!(first, WsMsg::Error { ref path, .. } if path == "styles"));

        fs::write(&entry, ".a { color: red; }").unwrap();
        task_tx.send(TaskMsg::Changed(changed)).await.unwrap();
        assert!(matches!(ws_rx.recv().await.unwrap(), WsMsg::ClearError));
        let css = ws_rx.recv().await.unwrap();
        assert!(matches!(css, WsMsg::Css(ref t) if t == &["css/app.min.css"]));

        task_tx.send(TaskMsg::Shutdown).await.unwrap();
        actor.await.unwrap();
    }
}
