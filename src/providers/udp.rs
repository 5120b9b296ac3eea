//! UDP socket datagram source

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tracing::{debug, info};

use crate::provider::{Datagram, DatagramSource};
use crate::{LinkError, Result};

/// Bind a UDP socket for the link.
///
/// The socket is shared: the [`UdpSource`] receives on it while the connection sends on it.
pub async fn bind_socket(addr: SocketAddr, broadcast: bool) -> Result<Arc<UdpSocket>> {
    let socket = UdpSocket::bind(addr).await.map_err(|e| LinkError::bind_failed(addr, e))?;
    if broadcast {
        socket.set_broadcast(true).map_err(|e| LinkError::bind_failed(addr, e))?;
    }

    let local = socket.local_addr().map_err(|e| LinkError::bind_failed(addr, e))?;
    info!(local_addr = %local, broadcast, "Bound telemetry socket");

    Ok(Arc::new(socket))
}

/// Source that reads datagrams from a bound UDP socket
pub struct UdpSource {
    socket: Arc<UdpSocket>,

    /// Receive buffer, reused across datagrams
    buf: Vec<u8>,
}

impl UdpSource {
    pub fn new(socket: Arc<UdpSocket>, max_datagram_len: usize) -> Self {
        Self { socket, buf: vec![0u8; max_datagram_len] }
    }
}

#[async_trait::async_trait]
impl DatagramSource for UdpSource {
    async fn next_datagram(&mut self) -> Result<Option<Datagram>> {
        // recv_from is cancel-safe: a dropped future never consumes a datagram
        let (len, peer) = self.socket.recv_from(&mut self.buf).await.map_err(|e| {
            LinkError::Receive { reason: "recv_from failed".to_string(), source: Some(e) }
        })?;

        if len == self.buf.len() {
            debug!(len, %peer, "Datagram filled the receive buffer and may be truncated");
        }

        Ok(Some(Datagram::new(self.buf[..len].to_vec(), Some(peer))))
    }

    fn describe(&self) -> String {
        match self.socket.local_addr() {
            Ok(addr) => format!("udp://{}", addr),
            Err(_) => "udp://<unknown>".to_string(),
        }
    }
}
