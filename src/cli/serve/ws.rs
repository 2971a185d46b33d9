//! Live status push over WebSocket.
//!
//! Clients only listen. After every terminal compile transition they get
//! `{"type":"status",...}`, after every index rebuild `{"type":"index",...}`.

use std::net::{IpAddr, SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tungstenite::WebSocket;
use tungstenite::protocol::Message;

use crate::compiler::CompileStatus;
use crate::workspace::Workspace;
use crate::{debug, log};

/// Maximum port retry attempts
const MAX_PORT_RETRIES: u16 = 10;

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LiveMessage {
    Connected,
    Status {
        #[serde(flatten)]
        status: CompileStatus,
        artifact_available: bool,
    },
    Index {
        entries: usize,
    },
}

impl LiveMessage {
    fn to_message(&self) -> Option<Message> {
        serde_json::to_string(self)
            .ok()
            .map(|text| Message::Text(text.into()))
    }
}

type Clients = Arc<Mutex<Vec<WebSocket<TcpStream>>>>;

/// Connected WebSocket clients.
#[derive(Clone, Default)]
pub struct LiveChannel {
    clients: Clients,
}

impl LiveChannel {
    /// Bind the listener (retrying the next ports if taken) and start the
    /// accept and read threads. Returns the bound port.
    pub fn start(&self, interface: IpAddr, base_port: u16) -> Result<u16> {
        let (listener, port) = try_bind_port(interface, base_port)?;

        let clients = Arc::clone(&self.clients);
        std::thread::spawn(move || accept_loop(listener, clients));

        let clients = Arc::clone(&self.clients);
        std::thread::spawn(move || reader_loop(clients));

        Ok(port)
    }

    pub fn client_count(&self) -> usize {
        self.clients.lock().len()
    }

    pub fn broadcast(&self, msg: &LiveMessage) {
        let Some(message) = msg.to_message() else {
            return;
        };
        let mut clients = self.clients.lock();
        if clients.is_empty() {
            return;
        }
        clients.retain_mut(|ws| match ws.send(message.clone()) {
            Ok(()) => true,
            Err(e) => {
                debug!("ws"; "client disconnected: {}", e);
                false
            }
        });
        debug!("ws"; "broadcast to {} clients", clients.len());
    }

    /// Forward orchestrator and index events until both sources close.
    pub async fn forward(self, workspace: Arc<Workspace>) {
        let mut status_rx = workspace.orchestrator().subscribe();
        let mut index_rx = workspace.subscribe_index();

        loop {
            let msg = tokio::select! {
                status = status_rx.recv() => match status {
                    Ok(status) => LiveMessage::Status {
                        status,
                        artifact_available: workspace.orchestrator().artifact().exists(),
                    },
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break,
                },
                entries = index_rx.recv() => match entries {
                    Ok(entries) => LiveMessage::Index { entries },
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break,
                },
            };
            self.broadcast(&msg);
        }
    }
}

fn accept_loop(listener: TcpListener, clients: Clients) {
    for stream in listener.incoming() {
        if crate::core::is_shutdown() {
            break;
        }
        let stream = match stream {
            Ok(stream) => stream,
            Err(e) => {
                log!("ws"; "accept error: {}", e);
                continue;
            }
        };

        // handshake in blocking mode, then switch for polling reads
        match tungstenite::accept(stream) {
            Ok(mut ws) => {
                let _ = ws.get_ref().set_nonblocking(true);
                if let Some(hello) = LiveMessage::Connected.to_message()
                    && ws.send(hello).is_err()
                {
                    continue;
                }
                let mut clients = clients.lock();
                clients.push(ws);
                debug!("ws"; "client connected (total: {})", clients.len());
            }
            Err(e) => log!("ws"; "handshake failed: {}", e),
        }
    }
}

/// Drain incoming frames (pings, close) and drop dead clients.
fn reader_loop(clients: Clients) {
    loop {
        std::thread::sleep(Duration::from_millis(100));
        if crate::core::is_shutdown() {
            break;
        }

        clients.lock().retain_mut(|ws| match ws.read() {
            Ok(Message::Close(_)) => false,
            Ok(_) => true,
            Err(tungstenite::Error::Io(ref e)) if e.kind() == std::io::ErrorKind::WouldBlock => {
                true
            }
            Err(_) => false,
        });
    }
}

fn try_bind_port(interface: IpAddr, base_port: u16) -> Result<(TcpListener, u16)> {
    let mut last_error = None;

    for offset in 0..MAX_PORT_RETRIES {
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
        "Failed to bind WebSocket server after {} attempts: {}",
        MAX_PORT_RETRIES,
        last_error.map(|e| e.to_string()).unwrap_or_default()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_message_shapes() {
        let msg = LiveMessage::Status {
            status: CompileStatus::default(),
            artifact_available: false,
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "status");
        assert_eq!(json["state"], "idle");
        assert_eq!(json["artifact_available"], false);

        let json = serde_json::to_value(LiveMessage::Index { entries: 7 }).unwrap();
        assert_eq!(json["type"], "index");
        assert_eq!(json["entries"], 7);
    }

    #[test]
    fn test_client_receives_broadcast() {
        let channel = LiveChannel::default();
        let port = channel.start(IpAddr::V4(Ipv4Addr::LOCALHOST), 0).unwrap();

        let (mut client, _) = tungstenite::connect(format!("ws://127.0.0.1:{port}")).unwrap();
        let hello = client.read().unwrap();
        assert!(hello.to_text().unwrap().contains("connected"));

        for _ in 0..50 {
            if channel.client_count() == 1 {
                break;
            }
            std::thread::sleep(Duration::from_millis(20));
        }
        channel.broadcast(&LiveMessage::Index { entries: 3 });

        let msg = client.read().unwrap();
        let json: serde_json::Value = serde_json::from_str(msg.to_text().unwrap()).unwrap();
        assert_eq!(json["type"], "index");
        assert_eq!(json["entries"], 3);
    }
}
