//! The fixed 36-byte header shared by every message, split into its three
//! wire sections: Frame, Frame Address, and Protocol Header.

use std::io::Cursor;

use byteorder::WriteBytesExt;

use crate::error::Error;
use crate::message::Message;
use crate::wire::{FieldRead, FieldWrite};

/// Total size of the three header sections.
pub const HEADER_SIZE: usize = 36;
/// Offset of the 32-bit client source identifier.
pub const SOURCE_OFFSET: usize = 4;
/// Offset of the 8-bit wrap-around sequence number.
pub const SEQUENCE_OFFSET: usize = 23;
/// Offset of the 16-bit message type code.
pub const TYPE_OFFSET: usize = 32;
/// Offset of the first payload byte.
pub const PAYLOAD_OFFSET: usize = HEADER_SIZE;
/// The only protocol version ever assigned.
pub const PROTOCOL_VERSION: u16 = 1024;

/// Stamps the client source identifier into a packed message buffer.
///
/// The buffer must hold at least a full header (as produced by
/// [RawMessage::pack]).
pub fn set_source(buf: &mut [u8], source: u32) {
    buf[SOURCE_OFFSET..SOURCE_OFFSET + 4].copy_from_slice(&source.to_le_bytes());
}

/// Stamps the sequence number into a packed message buffer.
///
/// The buffer must hold at least a full header.
pub fn set_sequence(buf: &mut [u8], sequence: u8) {
    buf[SEQUENCE_OFFSET] = sequence;
}

/// The Frame section: message size, protocol version, addressing mode, and
/// the client source identifier.
///
/// `tagged` indicates whether the Frame Address target field addresses every
/// device (broadcast discovery) or a single one. When `tagged` is set, the
/// target field should be all zeros.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    /// 16 bits: size of the entire message in bytes, including this field
    pub size: u16,

    /// 2 bits: message origin indicator, zero on anything we build
    pub origin: u8,

    /// 1 bit: the target field is ignored, message addresses all devices
    pub tagged: bool,

    /// 1 bit: message includes a target address, always one
    pub addressable: bool,

    /// 12 bits: protocol version, must be 1024
    pub protocol: u16,

    /// 32 bits: client-chosen identifier, echoed back by devices
    pub source: u32,
}

/// The Frame Address section: target device, ack/response flags, and the
/// sequence number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameAddress {
    /// 64 bits: 6-byte device MAC address, or zero for all devices
    pub target: u64,

    /// 48 bits: reserved, zero when building
    pub reserved: [u8; 6],

    /// 6 bits: reserved
    pub reserved2: u8,

    /// 1 bit: device should send an Acknowledgement
    pub ack_required: bool,

    /// 1 bit: device should send a State response
    pub res_required: bool,

    /// 8 bits: wrap-around message sequence number
    pub sequence: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolHeader {
    /// 64 bits: reserved
    pub reserved: u64,

    /// 16 bits: message type, determines the payload layout
    pub typ: u16,

    /// 16 bits: reserved
    pub reserved2: u16,
}

impl Frame {
    pub const PACKED_SIZE: usize = 8;

    fn pack(&self, v: &mut Vec<u8>) -> Result<(), Error> {
        v.write_field(self.size)?;

        // origin + tagged + addressable + protocol share one 16-bit word
        let bits = (u16::from(self.origin & 0b11) << 14)
            | (u16::from(self.tagged) << 13)
            | (u16::from(self.addressable) << 12)
            | (self.protocol & 0x0fff);
        v.write_field(bits)?;

        v.write_field(self.source)?;
        Ok(())
    }

    fn unpack(c: &mut Cursor<&[u8]>) -> Result<Frame, Error> {
        let size = c.read_field()?;

        let bits: u16 = c.read_field()?;
        let origin = ((bits >> 14) & 0b11) as u8;
        let tagged = bits & (1 << 13) != 0;
        let addressable = bits & (1 << 12) != 0;
        let protocol = bits & 0x0fff;

        if protocol != PROTOCOL_VERSION {
            return Err(Error::ProtocolError(format!(
                "unsupported protocol version {}",
                protocol
            )));
        }

        let source = c.read_field()?;

        Ok(Frame {
            size,
            origin,
            tagged,
            addressable,
            protocol,
            source,
        })
    }
}

impl FrameAddress {
    pub const PACKED_SIZE: usize = 16;

    fn pack(&self, v: &mut Vec<u8>) -> Result<(), Error> {
        v.write_field(self.target)?;
        v.extend_from_slice(&self.reserved);

        let config = (self.reserved2 << 2)
            | (u8::from(self.ack_required) << 1)
            | u8::from(self.res_required);
        v.write_u8(config)?;

        v.write_u8(self.sequence)?;
        Ok(())
    }

    fn unpack(c: &mut Cursor<&[u8]>) -> Result<FrameAddress, Error> {
        let target = c.read_field()?;

        let mut reserved = [0; 6];
        for slot in &mut reserved {
            *slot = c.read_field()?;
        }

        let config: u8 = c.read_field()?;
        let reserved2 = (config & 0b1111_1100) >> 2;
        let ack_required = config & 0b10 != 0;
        let res_required = config & 0b01 != 0;

        let sequence = c.read_field()?;

        Ok(FrameAddress {
            target,
            reserved,
            reserved2,
            ack_required,
            res_required,
            sequence,
        })
    }
}

impl ProtocolHeader {
    pub const PACKED_SIZE: usize = 12;

    fn pack(&self, v: &mut Vec<u8>) -> Result<(), Error> {
        v.write_field(self.reserved)?;
        v.write_field(self.typ)?;
        v.write_field(self.reserved2)?;
        Ok(())
    }

    fn unpack(c: &mut Cursor<&[u8]>) -> Result<ProtocolHeader, Error> {
        let reserved = c.read_field()?;
        let typ = c.read_field()?;
        let reserved2 = c.read_field()?;

        Ok(ProtocolHeader {
            reserved,
            typ,
            reserved2,
        })
    }
}

/// Options used to construct a [RawMessage].
///
/// Source and sequence are deliberately absent: they are connection-scoped
/// and stamped by the sending path ([set_source], [set_sequence]), not by the
/// builder.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// If set, the ID (MAC address) of the device being addressed.
    ///
    /// Extract it from [FrameAddress::target] of a received
    /// [Message::StateService].
    pub target: Option<u64>,
    /// Ask the device to confirm with a [Message::Acknowledgement].
    pub ack_required: bool,
    /// Ask the device to confirm with the matching State response. Get-style
    /// requests should always set this.
    pub res_required: bool,
    /// Mark the frame as addressing every device on the network. Set only
    /// when building a broadcast discovery message.
    pub tagged: bool,
}

/// The raw message structure: header sections plus an opaque payload.
///
/// This is what goes in and out of UDP datagrams. Use [Message::from_raw] to
/// interpret the payload.
#[derive(Debug, Clone, PartialEq)]
pub struct RawMessage {
    pub frame: Frame,
    pub frame_addr: FrameAddress,
    pub protocol_header: ProtocolHeader,
    pub payload: Vec<u8>,
}

impl RawMessage {
    /// Builds a RawMessage for the given message, ready to pack and send.
    ///
    /// All reserved fields are zero, the frame bits are fixed to
    /// `{origin: 0, addressable: true, protocol: 1024}`, and `tagged` follows
    /// [BuildOptions::tagged]. Source and sequence are left zero for the
    /// sending path to fill in.
    pub fn build(options: &BuildOptions, msg: &Message) -> Result<RawMessage, Error> {
        let frame = Frame {
            size: 0,
            origin: 0,
            tagged: options.tagged,
            addressable: true,
            protocol: PROTOCOL_VERSION,
            source: 0,
        };
        let frame_addr = FrameAddress {
            target: options.target.unwrap_or(0),
            reserved: [0; 6],
            reserved2: 0,
            ack_required: options.ack_required,
            res_required: options.res_required,
            sequence: 0,
        };
        let protocol_header = ProtocolHeader {
            reserved: 0,
            typ: msg.get_num(),
            reserved2: 0,
        };

        let mut raw = RawMessage {
            frame,
            frame_addr,
            protocol_header,
            payload: msg.to_payload()?,
        };
        raw.frame.size = raw.packed_size() as u16;
        Ok(raw)
    }

    /// The total size, in bytes, of the packed form of this message.
    pub fn packed_size(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }

    /// Packs this message into bytes suitable for the network.
    ///
    /// The returned buffer is [RawMessage::packed_size] bytes long.
    pub fn pack(&self) -> Result<Vec<u8>, Error> {
        let mut v = Vec::with_capacity(self.packed_size());
        self.frame.pack(&mut v)?;
        self.frame_addr.pack(&mut v)?;
        self.protocol_header.pack(&mut v)?;
        v.extend_from_slice(&self.payload);
        Ok(v)
    }

    /// Unpacks bytes received from the network into a RawMessage.
    ///
    /// Fails with [Error::LengthMismatch] when the size declared in the frame
    /// disagrees with the buffer length; truncated buffers fail without
    /// panicking.
    pub fn unpack(v: &[u8]) -> Result<RawMessage, Error> {
        let mut c = Cursor::new(v);

        let frame = Frame::unpack(&mut c)?;
        if frame.size as usize != v.len() {
            return Err(Error::LengthMismatch {
                declared: frame.size,
                actual: v.len(),
            });
        }

        let frame_addr = FrameAddress::unpack(&mut c)?;
        let protocol_header = ProtocolHeader::unpack(&mut c)?;

        Ok(RawMessage {
            frame,
            frame_addr,
            protocol_header,
            payload: v[HEADER_SIZE..].to_vec(),
        })
    }
}
