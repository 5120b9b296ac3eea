//! Link configuration

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use crate::queue::DEFAULT_QUEUE_CAPACITY;
use crate::types::{FRAME_LEN, Topic};
use crate::{LinkError, Result};

/// UDP port used by both ends of the link.
pub const DEFAULT_PORT: u16 = 37647;

/// Directed broadcast address of the satellite's wireless network.
pub const DEFAULT_SATELLITE_IP: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 255);

/// Receive buffer size; large enough that oversized datagrams are seen as oversized
/// instead of being silently truncated to a valid-looking frame.
pub const DEFAULT_MAX_DATAGRAM_LEN: usize = 2048;

/// Configuration for a [`Connection`](crate::Connection).
///
/// Every field has a default, so a partial TOML/JSON document deserializes cleanly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Local address the telemetry socket binds to
    pub local_addr: SocketAddr,

    /// Where outbound frames are sent
    pub remote_addr: SocketAddr,

    /// Enable `SO_BROADCAST` so a broadcast remote address is allowed
    pub broadcast: bool,

    /// Frames held before the oldest is evicted
    pub queue_capacity: usize,

    /// Topics subscribed when the connection is created
    pub topics: Vec<Topic>,

    /// Topic used by `send_command`-style helpers that do not name one
    pub command_topic: Topic,

    /// Header identity stamped on outbound frames
    pub sender_node: u32,
    pub sender_thread: u32,
    pub ttl: u16,

    /// Receive buffer size in bytes
    pub max_datagram_len: usize,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            local_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
            remote_addr: SocketAddr::new(IpAddr::V4(DEFAULT_SATELLITE_IP), DEFAULT_PORT),
            broadcast: true,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            topics: Topic::TELEMETRY.to_vec(),
            command_topic: Topic::TELECOMMAND,
            sender_node: 0,
            sender_thread: 0,
            ttl: 0,
            max_datagram_len: DEFAULT_MAX_DATAGRAM_LEN,
        }
    }
}

impl LinkConfig {
    pub fn with_local_addr(mut self, addr: SocketAddr) -> Self {
        self.local_addr = addr;
        self
    }

    pub fn with_remote_addr(mut self, addr: SocketAddr) -> Self {
        self.remote_addr = addr;
        self
    }

    pub fn with_broadcast(mut self, broadcast: bool) -> Self {
        self.broadcast = broadcast;
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    pub fn with_topics<I>(mut self, topics: I) -> Self
    where
        I: IntoIterator<Item = Topic>,
    {
        self.topics = topics.into_iter().collect();
        self
    }

    pub fn with_sender(mut self, node: u32, thread: u32) -> Self {
        self.sender_node = node;
        self.sender_thread = thread;
        self
    }

    /// Loopback configuration for tests and local simulators: ephemeral local port,
    /// no broadcast, sending to `remote`.
    pub fn loopback(remote: SocketAddr) -> Self {
        Self {
            local_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0),
            remote_addr: remote,
            broadcast: false,
            ..Self::default()
        }
    }

    /// Check values that would make the link unusable.
    pub fn validate(&self) -> Result<()> {
        if self.queue_capacity == 0 {
            return Err(LinkError::invalid_config("queue_capacity must be at least 1"));
        }
        if self.max_datagram_len <= FRAME_LEN {
            return Err(LinkError::invalid_config(format!(
                "max_datagram_len must exceed the {} byte frame size",
                FRAME_LEN
            )));
        }
        if self.remote_addr.port() == 0 {
            return Err(LinkError::invalid_config("remote_addr needs a non-zero port"));
        }
        Ok(())
    }
}
