//! Server lifecycle management.

use std::net::{IpAddr, SocketAddr};

use anyhow::{Context, Result};
use tiny_http::Server;
use tokio::runtime::Runtime;

use crate::log;

/// Maximum number of port binding attempts.
const MAX_PORT_RETRIES: u16 = 10;

/// Bind to the specified interface and port, with automatic port retry.
pub fn bind_with_retry(interface: IpAddr, base_port: u16) -> Result<(Server, SocketAddr)> {
    let mut last_error = None;

    for offset in 0..MAX_PORT_RETRIES {
        let port = base_port.saturating_add(offset);
        let addr = SocketAddr::new(interface, port);

        match Server::http(addr) {
            Ok(server) => {
                if offset > 0 {
                    log!("serve"; "port {} in use, using {} instead", base_port, port);
                }
                let addr = server.server_addr().to_ip().unwrap_or(addr);
                return Ok((server, addr));
            }
            Err(e) => last_error = Some(e),
        }
    }

    Err(anyhow::anyhow!(
        "Failed to bind after {} attempts (ports {}-{}): {}",
        MAX_PORT_RETRIES,
        base_port,
        base_port.saturating_add(MAX_PORT_RETRIES - 1),
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

/// Runtime for the orchestrator, the scheduler, the watcher and the push
/// channel. Request threads block on its handle.
pub fn build_runtime() -> Result<Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("texpane-rt")
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")
}

/// Give in-flight compiles a moment to finish; their children are killed
/// when the runtime drops them.
pub fn shutdown_runtime(runtime: Runtime) {
    runtime.shutdown_timeout(std::time::Duration::from_secs(2));
}
