//! `[serve]` section configuration.
//!
//! Contains preview server settings.
//!
//! # Example
//!
//! ```toml
//! [serve]
//! interface = "127.0.0.1"     # Network interface (127.0.0.1 = localhost only)
//! port = 5000                 # HTTP port number
//! ws_port = 35730             # WebSocket port for live status push
//! watch = true                # Recompile when files change outside the browser
//! frontend = "webapp"         # Optional static directory served at `/`
//! ```
//!
//! Use `interface = "0.0.0.0"` to make the server accessible from LAN.

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

/// Preview server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Network interface to bind.
    pub interface: IpAddr,

    /// HTTP port number.
    pub port: u16,

    /// WebSocket port; `0` disables live status push.
    pub ws_port: u16,

    /// Enable file watcher for external edits.
    pub watch: bool,

    /// Static frontend directory (relative to the config file).
    pub frontend: Option<PathBuf>,
}

impl ServeConfig {
    pub const PORT: FieldPath = FieldPath::new("serve.port");
    pub const WS_PORT: FieldPath = FieldPath::new("serve.ws_port");

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.port == 0 {
            diag.error(Self::PORT, "port must be non-zero");
        }
        if self.ws_port != 0 && self.ws_port == self.port {
            diag.error_with_hint(
                Self::WS_PORT,
                "ws_port must differ from port",
                "set ws_port = 0 to disable live status push",
            );
        }
    }
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            interface: IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)),
            port: 5000,
            ws_port: 35730,
            watch: true,
            frontend: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

    use crate::config::test_parse_config;

    #[test]
    fn test_serve_config() {
        let config =
            test_parse_config("[serve]\ninterface = \"0.0.0.0\"\nport = 8080\nwatch = false");

        assert_eq!(
            config.serve.interface,
            IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0))
        );
        assert_eq!(config.serve.port, 8080);
        assert!(!config.serve.watch);
    }

    #[test]
    fn test_serve_config_defaults() {
        let config = test_parse_config("");

        assert_eq!(
            config.serve.interface,
            IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))
        );
        assert_eq!(config.serve.port, 5000);
        assert_eq!(config.serve.ws_port, 35730);
        assert!(config.serve.watch);
        assert!(config.serve.frontend.is_none());
    }

    #[test]
    fn test_serve_config_ipv6() {
        let config = test_parse_config("[serve]\ninterface = \"::1\"");
        assert_eq!(
            config.serve.interface,
            IpAddr::V6(Ipv6Addr::new(0, 0, 0, 0, 0, 0, 0, 1))
        );
    }

    #[test]
    fn test_serve_config_port_clash() {
        let config = test_parse_config("[serve]\nport = 4000\nws_port = 4000");
        let mut diag = crate::config::ConfigDiagnostics::new();
        config.serve.validate(&mut diag);
        assert_eq!(diag.errors().len(), 1);

        let config = test_parse_config("[serve]\nport = 4000\nws_port = 0");
        let mut diag = crate::config::ConfigDiagnostics::new();
        config.serve.validate(&mut diag);
        assert!(diag.is_empty());
    }
}
