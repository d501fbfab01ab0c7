//! Low-level message types and framing for the LIFX LAN protocol.
//!
//! This crate lets you talk to lights on your local network. Protocol details
//! are documented at https://lan.developer.lifx.com/
//!
//! Being a low-level crate, it does not open sockets, cache device state, or
//! wait for replies. Pair it with the `lumen` crate (or your own event loop)
//! for that.
//!
//! # Discovery
//!
//! Send a [Message::GetService] as a UDP broadcast to port 56700 with the
//! frame `tagged` field set. Each device answers with a [Message::StateService]
//! carrying the [Service] it speaks and the port to use for all further
//! (unicast) messages.
//!
//! # Source and sequence
//!
//! The frame `source` and `sequence` fields identify the sending client and
//! are connection-scoped, not message-scoped: [RawMessage::build] leaves them
//! zero, and the sending path stamps them into the packed buffer with
//! [set_source] and [set_sequence] just before transmission.
//!
//! # Reserved fields
//!
//! All reserved fields are zeroed when constructing packets. Received packets
//! may carry non-zero reserved bytes; be liberal in what you accept.

mod error;
mod header;
mod message;
mod types;
mod wire;

pub use crate::error::Error;
pub use crate::header::{
    set_sequence, set_source, BuildOptions, Frame, FrameAddress, ProtocolHeader, RawMessage,
    HEADER_SIZE, PAYLOAD_OFFSET, PROTOCOL_VERSION, SEQUENCE_OFFSET, SOURCE_OFFSET, TYPE_OFFSET,
};
pub use crate::message::{Message, TILE_COLOR_COUNT};
pub use crate::types::{
    ApplicationRequest, EchoPayload, Ident, Label, PowerLevel, Service, Waveform, HSBK,
};
