use std::io;

use thiserror::Error;

/// Message encoding/decoding errors.
#[derive(Error, Debug)]
pub enum Error {
    /// A raw message could not be parsed because its type code is unknown.
    ///
    /// LIFX devices are known to send messages that are not officially
    /// documented, so this does not necessarily represent a bug.
    #[error("unknown message type {0}")]
    UnknownMessageType(u16),

    /// The size declared in the frame header disagrees with the number of
    /// bytes actually received. Such datagrams are dropped by callers.
    #[error("declared message size {declared} does not match received length {actual}")]
    LengthMismatch { declared: u16, actual: usize },

    /// A builder was handed a color sequence of the wrong arity.
    #[error("expected exactly {expected} colors, got {actual}")]
    WrongColorCount { expected: usize, actual: usize },

    /// A message field contains an invalid or unsupported value.
    #[error("protocol error: {0}")]
    ProtocolError(String),

    #[error(transparent)]
    Io(#[from] io::Error),
}
