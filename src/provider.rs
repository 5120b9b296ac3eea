//! Datagram source trait

use bytes::Bytes;
use std::net::SocketAddr;

use crate::Result;

/// One raw inbound datagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Datagram {
    pub bytes: Bytes,
    pub peer: Option<SocketAddr>,
}

impl Datagram {
    pub fn new(bytes: impl Into<Bytes>, peer: Option<SocketAddr>) -> Self {
        Self { bytes: bytes.into(), peer }
    }
}

/// Source of raw datagrams for the receive driver
///
/// Sources abstract over where telemetry comes from (a bound UDP socket, an in-memory
/// channel for simulators and tests). Decoding, filtering and queueing all happen
/// downstream in the driver, so a source only moves bytes.
#[async_trait::async_trait]
pub trait DatagramSource: Send + 'static {
    /// Wait for the next datagram
    ///
    /// Returns:
    /// - `Ok(Some(datagram))` - Datagram received in full
    /// - `Ok(None)` - Source closed (normal termination)
    /// - `Err(e)` - Receive error; the driver backs off and retries
    ///
    /// Must be cancel-safe: the driver drops this future on shutdown or rebind.
    async fn next_datagram(&mut self) -> Result<Option<Datagram>>;

    /// Short description for log lines
    fn describe(&self) -> String;
}
