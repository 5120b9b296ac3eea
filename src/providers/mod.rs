//! Datagram sources

pub mod memory;
pub mod udp;

pub use memory::{MemoryInjector, MemorySource};
pub use udp::{UdpSource, bind_socket};
