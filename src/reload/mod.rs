//! Live reload.
//!
//! - `message` - JSON protocol spoken to the browser client
//! - `server` - WebSocket acceptor feeding the `WsActor`

pub mod message;
pub mod server;
