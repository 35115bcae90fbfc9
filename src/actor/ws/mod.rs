//! WebSocket Actor
//!
//! Owns the live-reload clients: performs the handshake for streams
//! handed over by the acceptor, broadcasts `HotReloadMessage`s and
//! replays the current build error to late joiners.
//!
//! ```text
//! TaskActor --[Reload/Css/Error]--> WsActor --[broadcast]--> Clients
//! ```

use std::net::TcpStream;

use tokio::sync::mpsc;
use tungstenite::WebSocket;
use tungstenite::protocol::Message;

use super::messages::WsMsg;
use crate::reload::message::HotReloadMessage;

/// WebSocket Actor - manages client connections and broadcasts
pub struct WsActor {
    rx: mpsc::Receiver<WsMsg>,
    clients: Vec<WebSocket<TcpStream>>,
    /// Last error, sent to clients connecting while it is unresolved
    pending_error: Option<(String, String)>,
}

impl WsActor {
    pub fn new(rx: mpsc::Receiver<WsMsg>) -> Self {
        Self {
            rx,
            clients: Vec::new(),
            pending_error: None,
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        while let Some(msg) = self.rx.recv().await {
            match msg {
                WsMsg::Reload { reason } => {
                    crate::debug!("ws"; "sending reload: {}", reason);
                    self.broadcast(&HotReloadMessage::reload_with_reason(reason));
                }

                WsMsg::Css(targets) => {
                    for target in targets {
                        crate::debug!("ws"; "sending css: {}", target);
                        self.broadcast(&HotReloadMessage::css(target));
                    }
                }

                WsMsg::Error { path, error } => {
                    let msg = HotReloadMessage::error(&path, &error);
                    self.pending_error = Some((path, error));
                    self.broadcast(&msg);
                }

                WsMsg::ClearError => {
                    self.pending_error = None;
                    self.broadcast(&HotReloadMessage::clear_error());
                }

                WsMsg::AddClient(stream) => self.add_client(stream),

                WsMsg::Shutdown => {
                    crate::debug!("ws"; "shutting down");
                    for mut client in self.clients.drain(..) {
                        let _ = client.close(None);
                    }
                    break;
                }
            }
        }
    }

    fn add_client(&mut self, stream: TcpStream) {
        let mut ws = match tungstenite::accept(stream) {
            Ok(ws) => ws,
            Err(e) => {
                crate::log!("ws"; "handshake failed: {}", e);
                return;
            }
        };

        if let Err(e) = ws.send(text(&HotReloadMessage::connected())) {
            crate::debug!("ws"; "failed to send connected message: {}", e);
            return;
        }

        if let Some((path, error)) = &self.pending_error
            && let Err(e) = ws.send(text(&HotReloadMessage::error(path, error)))
        {
            crate::debug!("ws"; "failed to send pending error: {}", e);
            return;
        }

        self.clients.push(ws);
        crate::debug!("ws"; "client connected (total: {})", self.clients.len());
    }

    /// Send to every client, dropping those that fail.
    fn broadcast(&mut self, msg: &HotReloadMessage) {
        if self.clients.is_empty() {
            crate::debug!("ws"; "no clients connected");
            return;
        }

        let msg = text(msg);
        self.clients.retain_mut(|client| match client.send(msg.clone()) {
            Ok(()) => true,
            Err(e) => {
                crate::debug!("ws"; "client disconnected: {}", e);
                false
            }
        });
        crate::debug!("ws"; "broadcast to {} clients", self.clients.len());
    }
}

fn text(msg: &HotReloadMessage) -> Message {
    Message::Text(msg.to_json().into())
}
