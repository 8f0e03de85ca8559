//! Fixed-layout binary messages exchanged between a Smartlet node and the
//! collector.
//!
//! Every frame is exactly [`MESSAGE_SIZE`] bytes, big-endian:
//!
//! | offset | size | field                                  |
//! |--------|------|----------------------------------------|
//! | 0      | 1    | type                                   |
//! | 1      | 2    | length (always [`PAYLOAD_LENGTH`])     |
//! | 3      | 4    | node id                                |
//! | 7      | 4    | type-specific body                     |

pub mod error;
pub mod message;

use core::net::Ipv4Addr;

pub use error::DecodeError;
pub use message::{Body, Header, Message, MessageType, encode_reading};

/// Size of every frame on the wire
pub const MESSAGE_SIZE: usize = 11;

/// type(1) + length(2) + node id(4)
pub const HEADER_SIZE: usize = 7;

/// Value written into the length field of outbound frames.
///
/// The collector expects this constant regardless of the body layout, and it
/// is never cross-checked on decode.
pub const PAYLOAD_LENGTH: u16 = 4;

/// TCP port the collector accepts sessions on
pub const COLLECTOR_PORT: u16 = 9865;

/// UDP port the collector announces itself to
pub const DISCOVERY_PORT: u16 = 6585;

/// Multicast group carrying collector announcements
pub const DISCOVERY_GROUP: Ipv4Addr = Ipv4Addr::new(224, 0, 0, 120);
