//! `[serve]` section configuration.
//!
//! Contains development server settings.
//!
//! # Example
//!
//! ```toml
//! [serve]
//! online = true          # true: bind all interfaces and print the LAN URL
//! # interface = "0.0.0.0" # explicit bind address, overrides `online`
//! port = 3000            # HTTP port number
//! ws_port = 35729        # live reload WebSocket port
//! ```

use std::net::{IpAddr, Ipv4Addr};

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

/// Development server settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Explicit bind address. When unset, derived from `online`.
    pub interface: Option<IpAddr>,

    /// HTTP port number.
    pub port: u16,

    /// Live reload WebSocket port.
    pub ws_port: u16,

    /// Serve on the LAN (`0.0.0.0`) rather than loopback only.
    pub online: bool,
}

impl ServeConfig {
    pub const PORT: FieldPath = FieldPath::new("serve.port");
    pub const WS_PORT: FieldPath = FieldPath::new("serve.ws_port");

    /// Address the HTTP and WebSocket servers bind to.
    pub fn bind_interface(&self) -> IpAddr {
        self.interface.unwrap_or(if self.online {
            IpAddr::V4(Ipv4Addr::UNSPECIFIED)
        } else {
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        })
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.port == 0 {
            diag.error(Self::PORT, "must not be 0");
        }
        if self.ws_port == 0 {
            diag.error(Self::WS_PORT, "must not be 0");
        }
        if self.port == self.ws_port {
            diag.error(Self::WS_PORT, "must differ from `serve.port`");
        }
    }
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            interface: None,
            port: 3000,
            ws_port: 35729,
            online: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

    use crate::config::{ConfigDiagnostics, test_parse_config};

    #[test]
    fn test_serve_config() {
        let config = test_parse_config("[serve]\ninterface = \"0.0.0.0\"\nport = 8080");

        assert_eq!(
            config.serve.interface,
            Some(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)))
        );
        assert_eq!(config.serve.port, 8080);
    }

    #[test]
    fn test_serve_config_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.serve.port, 3000);
        assert_eq!(config.serve.ws_port, 35729);
        assert!(config.serve.online);
        assert_eq!(
            config.serve.bind_interface(),
            IpAddr::V4(Ipv4Addr::UNSPECIFIED)
        );
    }

    #[test]
    fn test_serve_offline_binds_loopback() {
        let config = test_parse_config("[serve]\nonline = false");
        assert_eq!(config.serve.bind_interface(), IpAddr::V4(Ipv4Addr::LOCALHOST));
    }

    #[test]
    fn test_serve_interface_overrides_online() {
        let config = test_parse_config("[serve]\nonline = false\ninterface = \"::1\"");
        assert_eq!(config.serve.bind_interface(), IpAddr::V6(Ipv6Addr::LOCALHOST));
    }

    #[test]
    fn test_serve_same_ports_rejected() {
        let config = test_parse_config("[serve]\nport = 4000\nws_port = 4000");
        let mut diag = ConfigDiagnostics::new();
        config.serve.validate(&mut diag);
        assert!(diag.has_errors());
    }
}
