//! Development server with live reload support.
//!
//! Serves `paths.base` as-is: the dev outputs of every task live there.

mod content;
mod lifecycle;
mod path;
mod response;

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::JoinHandle;

use anyhow::{Context, Result};
use crossbeam::channel;
use tiny_http::{Request, Server};

use crate::config::PipelineConfig;
use crate::core::register_server;
use crate::embed::RELOAD_JS_URL;
use crate::reload::server::ReloadListener;
use crate::{debug, log};

/// Number of request handler threads.
const REQUEST_THREADS: usize = 4;

/// HTTP server and reload channel, bound but not yet serving.
pub struct BoundServer {
    server: Arc<Server>,
    root: PathBuf,
    ws_port: u16,
    reload: Option<ReloadListener>,
    shutdown_rx: channel::Receiver<()>,
    actors: Option<JoinHandle<()>>,
}

/// Bind the HTTP server and the reload listener.
///
/// Both ports are taken before any asset task runs, so the printed URLs
/// are final.
pub fn bind_server(config: &PipelineConfig) -> Result<BoundServer> {
    let interface = config.serve.bind_interface();
    let (server, addr) = lifecycle::bind_with_retry(interface, config.serve.port)?;
    let server = Arc::new(server);

    let reload = ReloadListener::bind(interface, config.serve.ws_port)
        .context("failed to bind live-reload channel")?;
    let ws_port = reload.port();
    debug!("reload"; "ws://{}:{}", interface, ws_port);

    let (shutdown_tx, shutdown_rx) = channel::unbounded::<()>();
    register_server(Arc::clone(&server), shutdown_tx);

    log!("serve"; "http://localhost:{}", addr.port());
    if config.serve.online
        && addr.ip().is_unspecified()
        && let Some(ip) = lifecycle::lan_address()
    {
        log!("serve"; "http://{}", SocketAddr::new(ip, addr.port()));
    }

    Ok(BoundServer {
        server,
        root: config.base().to_path_buf(),
        ws_port,
        reload: Some(reload),
        shutdown_rx,
        actors: None,
    })
}

impl BoundServer {
    /// Start the reload channel, plus the watcher when `watch` is set.
    ///
    /// The watcher buffers events until `core::set_serving()`.
    pub fn start_actors(&mut self, config: Arc<PipelineConfig>, watch: bool) {
        if let Some(reload) = self.reload.take() {
            self.actors = Some(lifecycle::spawn_actors(
                config,
                reload,
                watch,
                self.shutdown_rx.clone(),
            ));
        }
    }

    /// Run the request loop until Ctrl+C (blocking).
    pub fn run(self) -> Result<()> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(REQUEST_THREADS)
            .build()
            .context("failed to create request thread pool")?;

        let root = Arc::new(self.root);
        for request in self.server.incoming_requests() {
            let root = Arc::clone(&root);
            let ws_port = self.ws_port;
            pool.spawn(move || {
                if let Err(e) = handle_request(request, &root, ws_port) {
                    debug!("serve"; "request error: {e}");
                }
            });
        }

        lifecycle::wait_for_shutdown(self.actors);
        Ok(())
    }
}

/// Handle a single HTTP request
fn handle_request(request: Request, root: &Path, ws_port: u16) -> Result<()> {
    if crate::core::is_shutdown() {
        return response::respond_unavailable(request);
    }

    if path::normalize_url(request.url()) == RELOAD_JS_URL.trim_start_matches('/') {
        return response::respond_reload_js(request, ws_port);
    }

    match path::resolve_path(request.url(), root) {
        Some(file) => response::respond_file(request, &file),
        None => response::respond_not_found(request, root),
    }
}
