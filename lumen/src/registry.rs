//! Dispatch table mapping message type codes to handler functions.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::net::SocketAddr;

use lumen_core::{Message, RawMessage};

use crate::client::Client;
use crate::error::ClientError;

/// A handler for one message type. Receives the raw message (for header
/// fields like the target address) alongside the decoded payload and the
/// peer the datagram came from.
pub type Handler<T> =
    fn(&mut Client<T>, &RawMessage, Message, SocketAddr) -> Result<(), ClientError>;

/// Maps message type codes to handlers.
///
/// Each client owns its own registry; there is no process-wide table.
/// Registering two handlers for the same code is a configuration bug and
/// fails immediately rather than silently replacing the first.
pub struct Registry<T> {
    handlers: HashMap<u16, Handler<T>>,
}

impl<T> Registry<T> {
    pub fn new() -> Registry<T> {
        Registry {
            handlers: HashMap::new(),
        }
    }

    pub fn register(&mut self, typ: u16, handler: Handler<T>) -> Result<(), ClientError> {
        match self.handlers.entry(typ) {
            Entry::Occupied(_) => Err(ClientError::DuplicateHandler(typ)),
            Entry::Vacant(slot) => {
                slot.insert(handler);
                Ok(())
            }
        }
    }

    /// Looks up the handler for a type code. Handlers are plain function
    /// pointers, so this returns a copy.
    pub fn handler(&self, typ: u16) -> Option<Handler<T>> {
        self.handlers.get(&typ).copied()
    }
}

impl<T> Default for Registry<T> {
    fn default() -> Registry<T> {
        Registry::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(
        _: &mut Client<()>,
        _: &RawMessage,
        _: Message,
        _: SocketAddr,
    ) -> Result<(), ClientError> {
        Ok(())
    }

    #[test]
    fn duplicate_registration_fails_fast() {
        let mut registry: Registry<()> = Registry::new();
        registry.register(3, noop).unwrap();
        match registry.register(3, noop) {
            Err(ClientError::DuplicateHandler(typ)) => assert_eq!(typ, 3),
            other => panic!("expected DuplicateHandler, got {:?}", other.map(|_| ())),
        }
        assert!(registry.handler(3).is_some());
        assert!(registry.handler(4).is_none());
    }
}
