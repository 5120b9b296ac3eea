//! Type-safe UDP telemetry and telecommand link for small satellite ground stations.
//!
//! Groundlink moves fixed-size 1023-byte frames between a ground station and a satellite
//! over UDP. Each frame carries a big-endian header and a topic-tagged payload; typed
//! decoders turn payloads into telemetry records, and telecommands travel the same way in
//! the other direction.
//!
//! # Features
//!
//! - **Wire codec**: pure encode/decode of the frame layout ([`codec`])
//! - **Typed payloads**: counter, IMU, electrical, mission and light records ([`payloads`])
//! - **Receive path**: topic filter, optional checksum policy, bounded drop-oldest queue
//! - **Async API**: poll with [`Connection::read`], await with [`Connection::recv`], or
//!   stream with [`Connection::frames`]
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use groundlink::{Groundlink, LinkConfig, Telemetry, UpdateRate};
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> groundlink::Result<()> {
//!     let connection = Groundlink::bind(LinkConfig::default()).await?;
//!     let mut telemetry = connection.telemetry(UpdateRate::Native);
//!
//!     while let Some(record) = telemetry.next().await {
//!         if let Telemetry::Electrical(power) = record {
//!             println!("Battery: {:.2} V", power.battery_voltage);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

// Core types and error handling
pub mod codec;
pub mod config;
mod error;
pub mod events;
pub mod filter;
pub mod metrics;
pub mod payloads;
pub mod queue;
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

// Transport
pub mod connection;
pub mod driver;
pub mod ingest;
pub mod provider;
pub mod providers;
pub mod stream;

// Core exports
pub use error::*;
pub use types::*;

pub use codec::{ChecksumPolicy, FnChecksum};
pub use config::LinkConfig;
pub use events::{LinkEvent, StatusLine};
pub use filter::TopicFilter;
pub use metrics::{LinkMetrics, MetricsSnapshot};
pub use payloads::{
    Command, Counter, Electrical, Light, Mission, SensorImu, Telemetry, TopicPayload,
};
pub use queue::ReceivedFrame;

// Main API exports
pub use connection::{Connection, LinkMonitor, LinkStatus};
pub use provider::{Datagram, DatagramSource};

/// Unified entry point for telemetry links.
///
/// # Example
///
/// ```rust,no_run
/// use groundlink::{Groundlink, LinkConfig};
///
/// #[tokio::main]
/// async fn main() -> groundlink::Result<()> {
///     let connection = Groundlink::bind(LinkConfig::default()).await?;
///     println!("Listening on {:?}", connection.local_addr());
///     Ok(())
/// }
/// ```
pub struct Groundlink;

impl Groundlink {
    /// Create a connection and bind its socket.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The configuration is invalid
    /// - The local address cannot be bound
    /// - Broadcast cannot be enabled on the socket
    pub async fn bind(config: LinkConfig) -> Result<Connection> {
        let connection = Connection::new(config)?;
        connection.bind().await?;
        Ok(connection)
    }

    /// Create a connection fed by `source` instead of a socket.
    ///
    /// Useful for simulators and capture replay. The connection cannot send until
    /// [`Connection::bind`] is called.
    pub async fn attach<S>(config: LinkConfig, source: S) -> Result<Connection>
    where
        S: DatagramSource,
    {
        let connection = Connection::new(config)?;
        connection.attach(source).await;
        Ok(connection)
    }
}
