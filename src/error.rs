//! Error types for the telemetry link.
//!
//! Errors are split by the layer that produces them:
//!
//! - [`FrameError`]: a raw buffer cannot be turned into a [`SatelliteFrame`](crate::SatelliteFrame)
//!   (or a frame cannot be built) because of its size
//! - [`PayloadError`]: a frame's payload is not the typed record a decoder asked for
//! - [`LinkError`]: socket, queue and configuration failures surfaced to the application
//!
//! Per-datagram problems on the receive path never escalate past the transport. They are
//! classified as a [`DropReason`], counted in [`LinkMetrics`](crate::LinkMetrics) and logged.
//!
//! ## Recovery and Retry
//!
//! ```rust
//! use groundlink::LinkError;
//!
//! let error = LinkError::send_failed("network unreachable");
//! if error.is_retryable() {
//!     for suggestion in error.recovery_suggestions() {
//!         println!("  - {}", suggestion);
//!     }
//! }
//! ```

use std::net::SocketAddr;
use thiserror::Error;

use crate::types::Topic;

/// Result type alias for link operations.
pub type Result<T, E = LinkError> = std::result::Result<T, E>;

/// Failure to decode or build a wire frame.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    #[error("frame buffer too short: {len} bytes, expected {expected}")]
    TooShort { len: usize, expected: usize },

    #[error("frame payload too long: {len} bytes, maximum {max}")]
    PayloadTooLong { len: usize, max: usize },
}

/// A frame does not carry the typed record a decoder expects.
///
/// This is not a fault of the link. The best-effort decoding path maps it to an absent record.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadError {
    #[error("topic mismatch: expected {expected}, found {found}")]
    TopicMismatch { expected: Topic, found: Topic },

    #[error("payload length mismatch for {topic}: expected {expected} bytes, found {found}")]
    LengthMismatch { topic: Topic, expected: usize, found: usize },
}

/// Main error type for link operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum LinkError {
    #[error("Failed to bind telemetry socket on {addr}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to send datagram: {reason}")]
    Send {
        reason: String,
        #[source]
        source: Option<std::io::Error>,
    },

    #[error("Link is not bound")]
    NotBound,

    #[error("Inbound queue is empty; check is_read_ready() before read()")]
    QueueEmpty,

    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error(transparent)]
    Payload(#[from] PayloadError),

    #[error("Invalid link configuration: {reason}")]
    Config { reason: String },

    #[error("Receive task failed: {reason}")]
    Receive {
        reason: String,
        #[source]
        source: Option<std::io::Error>,
    },
}

impl LinkError {
    /// Returns whether this error is potentially recoverable through retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            LinkError::Bind { .. } => true,
            LinkError::Send { .. } => true,
            LinkError::Receive { .. } => true,
            LinkError::NotBound => true,
            LinkError::QueueEmpty => false,
            LinkError::Frame(_) => false,
            LinkError::Payload(_) => false,
            LinkError::Config { .. } => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            LinkError::Bind { .. } => vec![
                "Check that no other ground station instance holds the port",
                "Verify the local address belongs to this machine",
                "Call bind() again once the interface is up",
            ],
            LinkError::Send { .. } => vec![
                "Check the wireless link to the satellite",
                "Verify the remote address is reachable",
                "Rebind the link to recover from a stalled socket",
            ],
            LinkError::Receive { .. } => vec![
                "Rebind the link to restart the receive task",
                "Check the network interface state",
            ],
            LinkError::NotBound => vec!["Call bind() before sending or receiving"],
            LinkError::QueueEmpty => vec![
                "Check is_read_ready() before calling read()",
                "Use recv().await to wait for the next frame",
            ],
            LinkError::Frame(_) => vec![
                "Keep payloads within the 998 byte limit",
                "Verify the sender uses 1023 byte frames",
            ],
            LinkError::Payload(_) => vec![
                "Decode the frame with the record matching its topic",
                "Check the device firmware payload layout",
            ],
            LinkError::Config { .. } => vec![
                "Check the link configuration values",
                "Start from LinkConfig::default()",
            ],
        }
    }

    /// Helper constructor for send errors without an underlying I/O error.
    pub fn send_failed(reason: impl Into<String>) -> Self {
        LinkError::Send { reason: reason.into(), source: None }
    }

    /// Helper constructor for send errors with the socket error attached.
    pub fn send_io(reason: impl Into<String>, source: std::io::Error) -> Self {
        LinkError::Send { reason: reason.into(), source: Some(source) }
    }

    /// Helper constructor for bind errors.
    pub fn bind_failed(addr: SocketAddr, source: std::io::Error) -> Self {
        LinkError::Bind { addr, source }
    }

    /// Helper constructor for configuration errors.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        LinkError::Config { reason: reason.into() }
    }
}

/// Why an inbound datagram was discarded by the receive path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropReason {
    /// Datagram shorter than one frame.
    TooShort,
    /// Topic not in the subscribed set.
    TopicFiltered,
    /// Checksum policy rejected the frame.
    Checksum,
}

impl DropReason {
    pub const ALL: [DropReason; 3] =
        [DropReason::TooShort, DropReason::TopicFiltered, DropReason::Checksum];

    pub fn as_str(self) -> &'static str {
        match self {
            DropReason::TooShort => "too_short",
            DropReason::TopicFiltered => "topic_filtered",
            DropReason::Checksum => "checksum",
        }
    }

    pub fn index(self) -> usize {
        match self {
            DropReason::TooShort => 0,
            DropReason::TopicFiltered => 1,
            DropReason::Checksum => 2,
        }
    }
}

impl From<FrameError> for DropReason {
    fn from(_: FrameError) -> Self {
        DropReason::TooShort
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
          #[test]
          fn error_messages_carry_their_context(
            reason in ".*",
            len in 0usize..1023usize,
            topic in any::<u32>(),
            found in any::<u32>()
          ) {
            let send_error = LinkError::send_failed(reason.clone());
            prop_assert!(send_error.to_string().contains(&reason));

            let frame_error = FrameError::TooShort { len, expected: 1023 };
            prop_assert!(frame_error.to_string().contains(&len.to_string()));

            let payload_error =
                PayloadError::TopicMismatch { expected: Topic(topic), found: Topic(found) };
            let message = payload_error.to_string();
            prop_assert!(message.contains(&topic.to_string()));
            prop_assert!(message.contains(&found.to_string()));
          }

          #[test]
          fn io_sources_are_preserved(message in ".*") {
            let error = LinkError::send_io("send_to", std::io::Error::other(message.clone()));
            let source = std::error::Error::source(&error);
            prop_assert!(source.is_some());
            prop_assert_eq!(source.map(|s| s.to_string()), Some(message));
          }
        }
    }

    #[test]
    fn error_traits_validation() {
        fn assert_send_sync_static<T: Send + Sync + 'static>() {}
        assert_send_sync_static::<LinkError>();
        assert_send_sync_static::<FrameError>();

        let error = LinkError::QueueEmpty;
        let _: &dyn std::error::Error = &error;
    }

    #[test]
    fn recovery_methods_work() {
        let send_error = LinkError::send_failed("test");
        let empty_error = LinkError::QueueEmpty;
        let frame_error: LinkError = FrameError::TooShort { len: 12, expected: 1023 }.into();

        assert!(send_error.is_retryable());
        assert!(!empty_error.is_retryable());
        assert!(!frame_error.is_retryable());

        for error in [&send_error, &empty_error, &frame_error] {
            let suggestions = error.recovery_suggestions();
            assert!(!suggestions.is_empty());
            for suggestion in suggestions {
                assert!(suggestion.len() > 5);
            }
        }
    }

    #[test]
    fn drop_reasons_have_distinct_indices() {
        for (position, reason) in DropReason::ALL.iter().enumerate() {
            assert_eq!(reason.index(), position);
            assert!(!reason.as_str().is_empty());
        }
    }

    #[test]
    fn frame_errors_convert_into_link_errors() {
        let error: LinkError = FrameError::PayloadTooLong { len: 1200, max: 998 }.into();
        assert!(matches!(error, LinkError::Frame(FrameError::PayloadTooLong { len: 1200, .. })));
    }
}
