use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    /// A zone message referenced an index at or past the device's reported
    /// zone count.
    #[error("zone index {index} out of bounds for a device with {count} zones")]
    ZoneOutOfBounds { index: usize, count: usize },

    /// A handler was registered for a message type that already has one.
    #[error("a handler for message type {0} is already registered")]
    DuplicateHandler(u16),

    #[error(transparent)]
    Protocol(#[from] lumen_core::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}
