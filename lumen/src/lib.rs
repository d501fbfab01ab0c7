//! Event-driven client for LIFX devices on your LAN.
//!
//! Built on top of the `lumen-core` message types, this crate adds the parts
//! a long-running controller needs: a [Client] that stamps and sends
//! messages, a [Registry] that dispatches received messages to handlers, and
//! a [Directory] of discovered devices with their labels, groups, and zone
//! colors.
//!
//! The client never blocks on the network. Broadcast a discovery with
//! [Client::discover], then feed every datagram the socket receives to
//! [Client::process_datagram]; the default handlers do the rest.

mod client;
mod directory;
mod error;
mod handlers;
mod registry;
mod transport;

pub use crate::client::Client;
pub use crate::directory::{Device, Directory, Group, Zone};
pub use crate::error::ClientError;
pub use crate::handlers::default_registry;
pub use crate::registry::{Handler, Registry};
pub use crate::transport::Transport;

/// The UDP port devices listen on, and the port discovery broadcasts go to.
pub const DEFAULT_PORT: u16 = 56700;
