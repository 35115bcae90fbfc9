//! Actor Message Definitions
//!
//! ```text
//! FsActor --Changed--> TaskActor --Reload/Css/Error--> WsActor
//! ```

use std::path::PathBuf;

// =============================================================================
// TaskActor Messages
// =============================================================================

/// Messages to Task Actor
#[derive(Debug)]
pub enum TaskMsg {
    /// Debounced batch of changed paths, relative to `paths.base`
    Changed(Vec<PathBuf>),
    /// Shutdown
    Shutdown,
}

// =============================================================================
// WsActor Messages
// =============================================================================

/// Messages to WebSocket Actor
pub enum WsMsg {
    /// Full page reload
    Reload { reason: String },
    /// Swap stylesheets, one entry per written `.css` file
    Css(Vec<String>),
    /// Task failure (display overlay, no reload)
    Error { path: String, error: String },
    /// Clear error overlay (task succeeded after error)
    ClearError,
    /// Hand over an accepted connection
    AddClient(std::net::TcpStream),
    /// Shutdown
    Shutdown,
}
