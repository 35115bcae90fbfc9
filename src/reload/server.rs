//! WebSocket acceptor for live reload.
//!
//! Accepted connections are handed to the `WsActor` as raw streams; the
//! actor performs the handshake and owns the clients.

use std::net::{IpAddr, SocketAddr, TcpListener};

use anyhow::Result;

use crate::actor::messages::WsMsg;

/// Maximum port retry attempts
pub const MAX_PORT_RETRIES: u16 = 10;

/// A bound reload listener, not yet accepting.
pub struct ReloadListener {
    listener: TcpListener,
    port: u16,
}

impl ReloadListener {
    /// Bind `interface:base_port`, trying the following ports when taken.
    pub fn bind(interface: IpAddr, base_port: u16) -> Result<Self> {
        let (listener, port) = try_bind_port(interface, base_port, MAX_PORT_RETRIES)?;
        if port != base_port {
            crate::debug!("reload"; "port {} in use, using {}", base_port, port);
        }
        Ok(Self { listener, port })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Spawn the acceptor thread, forwarding every client to `ws_tx`.
    pub fn start(self, ws_tx: tokio::sync::mpsc::Sender<WsMsg>) -> Result<()> {
        let listener = self.listener;
        listener.set_nonblocking(true)?;

        std::thread::spawn(move || {
            loop {
                if crate::core::is_shutdown() {
                    break;
                }
                match listener.accept() {
                    Ok((stream, addr)) => {
                        crate::debug!("reload"; "client connected: {}", addr);

                        // Handshake runs in blocking mode
                        let _ = stream.set_nonblocking(false);

                        if ws_tx.blocking_send(WsMsg::AddClient(stream)).is_err() {
                            crate::debug!("reload"; "ws actor gone, stopping acceptor");
                            break;
                        }
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        std::thread::sleep(std::time::Duration::from_millis(100));
                    }
                    Err(e) => {
                        crate::log!("reload"; "accept error: {}", e);
                        std::thread::sleep(std::time::Duration::from_millis(100));
                    }
                }
            }
        });

        Ok(())
    }
}

/// Try binding to port, retry with incremented port if in use
pub fn try_bind_port(
    interface: IpAddr,
    base_port: u16,
    max_retries: u16,
) -> Result<(TcpListener, u16)> {
    let mut last_error = None;

    for offset in 0..max_retries {
        let port = base_port.saturating_add(offset);
        match TcpListener::bind(SocketAddr::new(interface, port)) {
            Ok(listener) => {
                let actual_port = listener.local_addr()?.port();
                return Ok((listener, actual_port));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow::anyhow!(
        "failed to bind WebSocket server after {} attempts: {}",
        max_retries,
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}
