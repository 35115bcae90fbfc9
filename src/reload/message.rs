//! Live-reload message protocol.
//!
//! JSON messages pushed from the dev server to browser clients:
//!
//! - `reload`: full page reload
//! - `css`: swap `<link rel="stylesheet">` hrefs ending in `target`
//! - `connected`: handshake acknowledgement
//! - `error` / `clear_error`: build error overlay

use serde::{Deserialize, Serialize};

/// Message sent over the reload WebSocket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HotReloadMessage {
    /// Full page reload
    Reload {
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
    /// Stylesheet swap without reloading the page
    Css {
        /// Path of the rewritten stylesheet, relative to the served root
        target: String,
    },
    /// Connection established
    Connected { version: String },
    /// Build error (display overlay, no reload)
    Error { path: String, error: String },
    /// Hide the error overlay after a successful build
    #[serde(rename = "clear_error")]
    ClearError,
}

impl HotReloadMessage {
    pub fn reload_with_reason(reason: impl Into<String>) -> Self {
        Self::Reload {
            reason: Some(reason.into()),
        }
    }

    pub fn css(target: impl Into<String>) -> Self {
        Self::Css {
            target: target.into(),
        }
    }

    pub fn connected() -> Self {
        Self::Connected {
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn error(path: impl Into<String>, error: impl Into<String>) -> Self {
        Self::Error {
            path: path.into(),
            error: error.into(),
        }
    }

    pub fn clear_error() -> Self {
        Self::ClearError
    }

    /// Serialize to JSON, falling back to a bare reload.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"type":"reload"}"#.to_string())
    }

    #[cfg(test)]
    pub fn from_json(s: &str) -> Option<Self> {
        serde_json::from_str(s).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reload_message() {
        let json = HotReloadMessage::reload_with_reason("html").to_json();
        assert!(json.contains(r#""type":"reload""#));
        assert!(json.contains(r#""reason":"html""#));

        assert_eq!(
            HotReloadMessage::Reload { reason: None }.to_json(),
            r#"{"type":"reload"}"#
        );
    }

    #[test]
    fn test_css_message() {
        let json = HotReloadMessage::css("css/app.min.css").to_json();
        assert_eq!(json, r#"{"type":"css","target":"css/app.min.css"}"#);
        assert_eq!(
            HotReloadMessage::from_json(&json),
            Some(HotReloadMessage::css("css/app.min.css"))
        );
    }

    #[test]
    fn test_clear_error_tag() {
        assert_eq!(
            HotReloadMessage::clear_error().to_json(),
            r#"{"type":"clear_error"}"#
        );
    }

    #[test]
    fn test_error_message() {
        let json = HotReloadMessage::error("scss/main.scss", "expected \";\"").to_json();
        assert!(json.contains(r#""type":"error""#));
        assert!(json.contains(r#""path":"scss/main.scss""#));
    }

    #[test]
    fn test_connected_carries_version() {
        let json = HotReloadMessage::connected().to_json();
        assert!(json.contains(env!("CARGO_PKG_VERSION")));
    }
}
