//! In-memory datagram source
//!
//! Feeds datagrams from a channel instead of a socket. Used by simulators that generate
//! telemetry in-process, for replaying captured datagrams, and throughout the tests.

use bytes::Bytes;
use tokio::sync::mpsc;
use tracing::trace;

use crate::Result;
use crate::provider::{Datagram, DatagramSource};

/// Default channel depth for [`MemorySource::channel`].
pub const DEFAULT_MEMORY_CHANNEL: usize = 256;

/// Source that yields datagrams pushed through a channel
pub struct MemorySource {
    rx: mpsc::Receiver<Datagram>,
    delivered: u64,
}

/// Sending half of a [`MemorySource`]
#[derive(Debug, Clone)]
pub struct MemoryInjector {
    tx: mpsc::Sender<Datagram>,
}

impl MemorySource {
    /// Create a connected injector/source pair.
    pub fn channel(capacity: usize) -> (MemoryInjector, MemorySource) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (MemoryInjector { tx }, MemorySource { rx, delivered: 0 })
    }

    /// Source that yields the given datagrams in order and then closes.
    pub fn replay<I, B>(datagrams: I) -> MemorySource
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        let datagrams: Vec<Datagram> =
            datagrams.into_iter().map(|bytes| Datagram::new(bytes, None)).collect();
        let (tx, rx) = mpsc::channel(datagrams.len().max(1));
        for datagram in datagrams {
            // Capacity covers every datagram, so try_send cannot fail with Full
            let _ = tx.try_send(datagram);
        }
        MemorySource { rx, delivered: 0 }
    }

    /// Number of datagrams handed to the driver so far.
    pub fn delivered(&self) -> u64 {
        self.delivered
    }
}

impl MemoryInjector {
    /// Queue a datagram for the source. Returns `false` once the source is gone.
    pub async fn inject(&self, bytes: impl Into<Bytes>) -> bool {
        self.tx.send(Datagram::new(bytes, None)).await.is_ok()
    }

    /// Queue a datagram with an explicit peer address.
    pub async fn inject_datagram(&self, datagram: Datagram) -> bool {
        self.tx.send(datagram).await.is_ok()
    }
}

#[async_trait::async_trait]
impl DatagramSource for MemorySource {
    async fn next_datagram(&mut self) -> Result<Option<Datagram>> {
        let next = self.rx.recv().await;
        if let Some(datagram) = &next {
            self.delivered += 1;
            trace!(len = datagram.bytes.len(), delivered = self.delivered, "Memory datagram");
        }
        Ok(next)
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replay_yields_in_order_then_closes() {
        let mut source = MemorySource::replay(vec![vec![1u8], vec![2u8], vec![3u8]]);

        for expected in 1u8..=3 {
            let datagram = source.next_datagram().await.unwrap().unwrap();
            assert_eq!(datagram.bytes.as_ref(), &[expected]);
        }
        assert!(source.next_datagram().await.unwrap().is_none());
        assert_eq!(source.delivered(), 3);
    }

    #[tokio::test]
    async fn injector_reports_closed_source() {
        let (injector, source) = MemorySource::channel(4);
        assert!(injector.inject(vec![0u8; 4]).await);
        drop(source);
        assert!(!injector.inject(vec![0u8; 4]).await);
    }
}
