//! The client: owns the transport, a dispatch registry, and the directory of
//! discovered devices.

use std::net::SocketAddr;
use std::num::Wrapping;

use log::{debug, warn};
use lumen_core::{set_sequence, set_source, BuildOptions, Message, RawMessage};

use crate::directory::Directory;
use crate::error::ClientError;
use crate::handlers::default_registry;
use crate::registry::Registry;
use crate::transport::Transport;
use crate::DEFAULT_PORT;

/// A LIFX LAN client.
///
/// The client is transport-agnostic and event-driven: it never blocks waiting
/// for replies. Feed it every datagram the socket receives via
/// [Client::process_datagram] and it keeps [Client::directory] current.
pub struct Client<T> {
    transport: T,
    /// Client identifier stamped into every outgoing frame. Devices echo it
    /// back, but replies are not filtered on it: devices answering broadcasts
    /// from other clients still carry useful state.
    source: u32,
    next_seq: Wrapping<u8>,
    pub registry: Registry<T>,
    pub directory: Directory,
}

impl<T: Transport> Client<T> {
    /// Creates a client with the default handler set ([default_registry]).
    pub fn new(transport: T, source: u32) -> Result<Client<T>, ClientError> {
        Ok(Client::with_registry(transport, source, default_registry()?))
    }

    /// Creates a client with a custom handler registry.
    pub fn with_registry(transport: T, source: u32, registry: Registry<T>) -> Client<T> {
        Client {
            transport,
            source,
            next_seq: Wrapping(0),
            registry,
            directory: Directory::new(),
        }
    }

    fn next_seq(&mut self) -> u8 {
        let seq = self.next_seq.0;
        self.next_seq += Wrapping(1);
        seq
    }

    /// Builds, stamps, and sends a message. Returns the sequence number the
    /// frame was stamped with.
    pub fn send_with(
        &mut self,
        msg: &Message,
        options: &BuildOptions,
        addr: SocketAddr,
    ) -> Result<u8, ClientError> {
        let mut bytes = RawMessage::build(options, msg)?.pack()?;
        let seq = self.next_seq();
        set_source(&mut bytes, self.source);
        set_sequence(&mut bytes, seq);
        self.transport.send_to(&bytes, addr)?;
        Ok(seq)
    }

    /// Sends a unicast query to one device, asking for a State response.
    pub fn send_to(
        &mut self,
        msg: &Message,
        target: u64,
        addr: SocketAddr,
    ) -> Result<u8, ClientError> {
        let options = BuildOptions {
            target: Some(target),
            res_required: true,
            ..Default::default()
        };
        self.send_with(msg, &options, addr)
    }

    /// Broadcasts a message to every device on the local network.
    pub fn broadcast(&mut self, msg: &Message) -> Result<u8, ClientError> {
        let options = BuildOptions {
            tagged: true,
            ..Default::default()
        };
        let addr = SocketAddr::from(([255, 255, 255, 255], DEFAULT_PORT));
        self.send_with(msg, &options, addr)
    }

    /// Broadcasts a GetService. Devices answer with StateService, which the
    /// default handlers use to populate the directory.
    pub fn discover(&mut self) -> Result<u8, ClientError> {
        self.broadcast(&Message::GetService)
    }

    /// Processes one received datagram.
    ///
    /// Malformed datagrams (bad framing, a declared size that disagrees with
    /// the buffer, unknown or unhandled message types) are logged and
    /// dropped; only handler failures surface as errors.
    pub fn process_datagram(&mut self, buf: &[u8], peer: SocketAddr) -> Result<(), ClientError> {
        let raw = match RawMessage::unpack(buf) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("dropping malformed datagram from {}: {}", peer, e);
                return Ok(());
            }
        };

        // foreign-origin replies are expected on shared networks: devices
        // answer broadcasts from other clients too. Flag them, keep them.
        if raw.frame.source != 0 && raw.frame.source != self.source {
            debug!(
                "datagram from {} carries foreign source {:#010x}",
                peer, raw.frame.source
            );
        }

        let typ = raw.protocol_header.typ;
        let handler = match self.registry.handler(typ) {
            Some(handler) => handler,
            None => {
                debug!("no handler for message type {} from {}", typ, peer);
                return Ok(());
            }
        };

        let msg = match Message::from_raw(&raw) {
            Ok(msg) => msg,
            Err(e) => {
                warn!("dropping undecodable type {} from {}: {}", typ, peer, e);
                return Ok(());
            }
        };

        handler(self, &raw, msg, peer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::io;

    use lumen_core::{
        Ident, Label, Service, HSBK, SEQUENCE_OFFSET, SOURCE_OFFSET, TYPE_OFFSET,
    };

    #[derive(Default)]
    struct MockTransport {
        sent: RefCell<Vec<(Vec<u8>, SocketAddr)>>,
    }

    impl Transport for &MockTransport {
        fn send_to(&self, buf: &[u8], addr: SocketAddr) -> io::Result<usize> {
            self.sent.borrow_mut().push((buf.to_vec(), addr));
            Ok(buf.len())
        }
    }

    fn client(transport: &MockTransport) -> Client<&MockTransport> {
        Client::new(transport, 0x1234_5678).unwrap()
    }

    fn peer() -> SocketAddr {
        "10.0.0.5:56700".parse().unwrap()
    }

    /// Packs `msg` as if device `target` had sent it.
    fn datagram_from(target: u64, msg: &Message) -> Vec<u8> {
        let options = BuildOptions {
            target: Some(target),
            ..Default::default()
        };
        RawMessage::build(&options, msg).unwrap().pack().unwrap()
    }

    fn wire_type(buf: &[u8]) -> u16 {
        u16::from_le_bytes([buf[TYPE_OFFSET], buf[TYPE_OFFSET + 1]])
    }

    #[test]
    fn discovery_registers_device_and_queries_it() {
        let transport = MockTransport::default();
        let mut client = client(&transport);

        let state_service = datagram_from(
            0xd073_d512_3456,
            &Message::StateService {
                service: Service::UDP,
                port: 56700,
            },
        );
        client.process_datagram(&state_service, peer()).unwrap();

        let device = client.directory.device(peer().ip()).unwrap();
        assert_eq!(device.target, 0xd073_d512_3456);
        assert_eq!(device.port, 56700);
        assert_eq!(device.socket_addr(), peer());

        // follow-up queries: GetLabel, GetGroup, GetColorZones
        let sent = transport.sent.borrow();
        assert_eq!(sent.len(), 3);
        assert_eq!(wire_type(&sent[0].0), 23);
        assert_eq!(wire_type(&sent[1].0), 51);
        assert_eq!(wire_type(&sent[2].0), 502);
        for (buf, addr) in sent.iter() {
            assert_eq!(*addr, peer());
            // every outgoing frame is stamped with the client source
            assert_eq!(
                &buf[SOURCE_OFFSET..SOURCE_OFFSET + 4],
                &0x1234_5678u32.to_le_bytes()
            );
        }
    }

    #[test]
    fn state_service_with_port_zero_is_ignored() {
        let transport = MockTransport::default();
        let mut client = client(&transport);

        let msg = datagram_from(
            1,
            &Message::StateService {
                service: Service::UDP,
                port: 0,
            },
        );
        client.process_datagram(&msg, peer()).unwrap();

        assert!(client.directory.device(peer().ip()).is_none());
        assert!(transport.sent.borrow().is_empty());
    }

    #[test]
    fn state_label_and_group_update_directory() {
        let transport = MockTransport::default();
        let mut client = client(&transport);
        let group_id = Ident([9; 16]);

        let label = datagram_from(
            7,
            &Message::StateLabel {
                label: Label::new("Lamp"),
            },
        );
        client.process_datagram(&label, peer()).unwrap();

        let group = datagram_from(
            7,
            &Message::StateGroup {
                group: group_id,
                label: Label::new("Bedroom"),
                updated_at: 1000,
            },
        );
        client.process_datagram(&group, peer()).unwrap();

        let device = client.directory.device(peer().ip()).unwrap();
        assert_eq!(*device.label.as_ref().unwrap(), *"Lamp");
        assert_eq!(device.group, Some(group_id));
        assert_eq!(
            *client.directory.group(&group_id).unwrap().label.as_str(),
            *"Bedroom"
        );
    }

    #[test]
    fn state_multi_zone_fills_only_reported_zones() {
        let transport = MockTransport::default();
        let mut client = client(&transport);

        let colors: Vec<HSBK> = (0..8)
            .map(|hue| HSBK {
                hue,
                ..HSBK::default()
            })
            .collect();
        let msg = datagram_from(
            5,
            &Message::StateMultiZone {
                count: 16,
                index: 8,
                colors: colors.clone(),
            },
        );
        client.process_datagram(&msg, peer()).unwrap();

        let device = client.directory.device(peer().ip()).unwrap();
        let zones = device.zones();
        assert_eq!(zones.len(), 16);
        assert!(zones[..8].iter().all(|z| z.color.is_none()));
        for (n, zone) in zones[8..].iter().enumerate() {
            assert_eq!(zone.color, Some(colors[n]));
        }
    }

    #[test]
    fn zone_index_past_count_is_a_handler_error() {
        let transport = MockTransport::default();
        let mut client = client(&transport);

        let msg = datagram_from(
            5,
            &Message::StateZone {
                count: 4,
                index: 4,
                color: HSBK::default(),
            },
        );
        match client.process_datagram(&msg, peer()) {
            Err(ClientError::ZoneOutOfBounds { index, count }) => {
                assert_eq!((index, count), (4, 4));
            }
            other => panic!("expected ZoneOutOfBounds, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn sequence_numbers_wrap_around() {
        let transport = MockTransport::default();
        let mut client = client(&transport);
        let addr = peer();

        for expected in 0..=255u8 {
            let seq = client.send_to(&Message::GetLabel, 1, addr).unwrap();
            assert_eq!(seq, expected);
        }
        // 257th message reuses sequence 0
        assert_eq!(client.send_to(&Message::GetLabel, 1, addr).unwrap(), 0);
        assert_eq!(client.send_to(&Message::GetLabel, 1, addr).unwrap(), 1);

        let sent = transport.sent.borrow();
        assert_eq!(sent[256].0[SEQUENCE_OFFSET], 0);
        assert_eq!(sent[257].0[SEQUENCE_OFFSET], 1);
    }

    #[test]
    fn length_mismatch_is_dropped_not_fatal() {
        let transport = MockTransport::default();
        let mut client = client(&transport);

        let mut msg = datagram_from(
            3,
            &Message::StateService {
                service: Service::UDP,
                port: 56700,
            },
        );
        msg.push(0); // declared size no longer matches

        client.process_datagram(&msg, peer()).unwrap();
        assert!(client.directory.device(peer().ip()).is_none());
    }

    #[test]
    fn unhandled_types_are_dropped() {
        let transport = MockTransport::default();
        let mut client = client(&transport);

        // StatePower (22) has no default handler
        let msg = datagram_from(
            3,
            &Message::StatePower {
                level: lumen_core::PowerLevel::Enabled,
            },
        );
        client.process_datagram(&msg, peer()).unwrap();
        assert!(client.directory.device(peer().ip()).is_none());
    }

    #[test]
    fn replies_to_other_clients_are_still_processed() {
        let transport = MockTransport::default();
        let mut client = client(&transport);

        // a StateService carrying some other client's source id
        let mut msg = datagram_from(
            9,
            &Message::StateService {
                service: Service::UDP,
                port: 56700,
            },
        );
        lumen_core::set_source(&mut msg, 0xdead_beef);

        client.process_datagram(&msg, peer()).unwrap();
        assert!(client.directory.device(peer().ip()).is_some());
    }
}
