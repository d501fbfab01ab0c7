//! The typed message set and its payload codec.

use std::io::Cursor;

use crate::error::Error;
use crate::header::RawMessage;
use crate::types::{
    ApplicationRequest, EchoPayload, Ident, Label, PowerLevel, Service, Waveform, HSBK,
};
use crate::wire::{FieldRead, FieldWrite, FromField};

/// Number of colors in a tile state message. [Message::SetTileState64] must
/// carry exactly this many.
pub const TILE_COLOR_COUNT: usize = 64;

/// Reads consecutive wire fields from a payload and assembles a [Message]
/// variant, converting each field through [FromField].
macro_rules! decode {
    ($msg:ident, $variant:ident, $( $field:ident: $t:ident ),*) => {{
        let mut c = Cursor::new(&$msg.payload[..]);
        $(
            let $field: $t = c.read_field()?;
        )*
        Message::$variant {
            $(
                $field: FromField::from_field($field)?,
            )*
        }
    }};
}

/// Decoded LIFX messages.
///
/// Lists every message type this library understands, across the Device,
/// Light, MultiZone, and Tile families. The protocol defines more types than
/// any one client needs; unknown codes surface as
/// [Error::UnknownMessageType] and should be dropped, not treated as fatal.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub enum Message {
    /// GetService - 2
    ///
    /// Broadcast by a client to discover devices on the local network.
    /// Devices answer with [Message::StateService]. The frame `tagged` field
    /// must be set when broadcasting this message.
    GetService,

    /// StateService - 3
    ///
    /// Discovery response: the service the device speaks and the port to
    /// reach it on. A port of zero means the service is temporarily
    /// unavailable.
    StateService { service: Service, port: u32 },

    /// GetHostInfo - 12
    GetHostInfo,

    /// StateHostInfo - 13
    ///
    /// Host MCU information.
    StateHostInfo {
        /// radio receive signal strength, in milliwatts
        signal: f32,
        /// bytes transmitted since power on
        tx: u32,
        /// bytes received since power on
        rx: u32,
        reserved: i16,
    },

    /// GetHostFirmware - 14
    GetHostFirmware,

    /// StateHostFirmware - 15
    StateHostFirmware {
        /// firmware build time, nanoseconds since epoch
        build: u64,
        reserved: u64,
        version: u32,
    },

    /// GetWifiInfo - 16
    GetWifiInfo,

    /// StateWifiInfo - 17
    StateWifiInfo {
        signal: f32,
        tx: u32,
        rx: u32,
        reserved: i16,
    },

    /// GetWifiFirmware - 18
    GetWifiFirmware,

    /// StateWifiFirmware - 19
    StateWifiFirmware {
        build: u64,
        reserved: u64,
        version: u32,
    },

    /// GetPower - 20
    GetPower,

    /// SetPower - 21
    SetPower { level: PowerLevel },

    /// StatePower - 22
    StatePower { level: PowerLevel },

    /// GetLabel - 23
    GetLabel,

    /// SetLabel - 24
    SetLabel { label: Label },

    /// StateLabel - 25
    StateLabel { label: Label },

    /// GetVersion - 32
    GetVersion,

    /// StateVersion - 33
    ///
    /// Hardware version of the device.
    StateVersion {
        vendor: u32,
        product: u32,
        version: u32,
    },

    /// GetInfo - 34
    GetInfo,

    /// StateInfo - 35
    ///
    /// Run-time information; all three fields are in nanoseconds.
    StateInfo { time: u64, uptime: u64, downtime: u64 },

    /// Acknowledgement - 45
    ///
    /// Sent in response to any message with `ack_required` set. The message
    /// has no payload; the frame sequence number is carried here for
    /// convenience.
    Acknowledgement { seq: u8 },

    /// GetLocation - 48
    GetLocation,

    /// SetLocation - 49
    SetLocation {
        location: Ident,
        label: Label,
        /// UTC timestamp of the last label update, in nanoseconds
        updated_at: u64,
    },

    /// StateLocation - 50
    StateLocation {
        location: Ident,
        label: Label,
        updated_at: u64,
    },

    /// GetGroup - 51
    GetGroup,

    /// SetGroup - 52
    SetGroup {
        group: Ident,
        label: Label,
        updated_at: u64,
    },

    /// StateGroup - 53
    ///
    /// The device's group membership: a 16-byte group id plus its label.
    StateGroup {
        group: Ident,
        label: Label,
        updated_at: u64,
    },

    /// EchoRequest - 58
    EchoRequest { payload: EchoPayload },

    /// EchoResponse - 59
    EchoResponse { payload: EchoPayload },

    /// Get - 101
    LightGet,

    /// SetColor - 102
    LightSetColor {
        reserved: u8,
        color: HSBK,
        /// color transition time, in milliseconds
        duration: u32,
    },

    /// SetWaveform - 103
    SetWaveform {
        reserved: u8,
        transient: bool,
        color: HSBK,
        /// duration of one cycle, in milliseconds
        period: u32,
        cycles: f32,
        /// waveform skew, [-32768, 32767] scaled to [0, 1]
        skew_ratio: i16,
        waveform: Waveform,
    },

    /// State - 107
    ///
    /// The light's current state as reported by the device. The power level
    /// is the raw wire value: devices mid-fade report intermediate levels.
    LightState {
        color: HSBK,
        reserved: i16,
        power: u16,
        label: Label,
        reserved2: u64,
    },

    /// GetPower - 116
    LightGetPower,

    /// SetPower - 117
    ///
    /// The level must be either 0 or 65535; other values are normalized to
    /// 65535 when building. The duration is the transition time in
    /// milliseconds.
    LightSetPower { level: u16, duration: u32 },

    /// StatePower - 118
    LightStatePower { level: u16 },

    /// SetWaveformOptional - 119
    ///
    /// Like [Message::SetWaveform], but each color component is only applied
    /// when its `set_*` flag is true.
    SetWaveformOptional {
        reserved: u8,
        transient: bool,
        color: HSBK,
        period: u32,
        cycles: f32,
        skew_ratio: i16,
        waveform: Waveform,
        set_hue: bool,
        set_saturation: bool,
        set_brightness: bool,
        set_kelvin: bool,
    },

    /// GetInfrared - 120
    LightGetInfrared,

    /// StateInfrared - 121
    LightStateInfrared { brightness: u16 },

    /// SetInfrared - 122
    LightSetInfrared { brightness: u16 },

    /// SetColorZones - 501
    ///
    /// Changes the color of one or more zones. The changes are buffered by
    /// the device and applied according to [ApplicationRequest].
    SetColorZones {
        start_index: u8,
        end_index: u8,
        color: HSBK,
        duration: u32,
        apply: ApplicationRequest,
    },

    /// GetColorZones - 502
    ///
    /// Requests zone colors for a range of zones. The device answers with as
    /// many [Message::StateZone] or [Message::StateMultiZone] messages as it
    /// takes to cover the range.
    GetColorZones { start_index: u8, end_index: u8 },

    /// StateZone - 503
    ///
    /// The state of a single zone. `count` is the total number of zones on
    /// the device, `index` the zone being reported.
    StateZone { count: u8, index: u8, color: HSBK },

    /// StateMultiZone - 506
    ///
    /// The state of up to eight consecutive zones starting at `index`; the
    /// zone of `colors[n]` is `index + n`. A single datagram carries
    /// `min(8, count - index)` colors, so the tail of a strip may arrive
    /// with fewer than eight.
    StateMultiZone {
        count: u8,
        index: u8,
        colors: Vec<HSBK>,
    },

    /// GetDeviceChain - 701
    GetDeviceChain,

    /// SetUserPosition - 703
    ///
    /// Tells a tile its position in the chain.
    SetUserPosition { tile_index: u8, x: f32, y: f32 },

    /// GetTileState64 - 707
    ///
    /// Requests the 64-pixel state of `length` tiles starting at
    /// `tile_index`. For actual tile hardware, x and y should be 0 and width
    /// should be 8.
    GetTileState64 {
        tile_index: u8,
        length: u8,
        x: u8,
        y: u8,
        width: u8,
    },

    /// SetTileState64 - 715
    ///
    /// Writes a 64-pixel rectangle to tiles. `colors` must hold exactly
    /// [TILE_COLOR_COUNT] values; building with any other count fails before
    /// any bytes are produced.
    SetTileState64 {
        tile_index: u8,
        length: u8,
        x: u8,
        y: u8,
        width: u8,
        duration: u32,
        colors: Vec<HSBK>,
    },
}

impl Message {
    /// The wire type code for this message.
    pub fn get_num(&self) -> u16 {
        match *self {
            Message::GetService => 2,
            Message::StateService { .. } => 3,
            Message::GetHostInfo => 12,
            Message::StateHostInfo { .. } => 13,
            Message::GetHostFirmware => 14,
            Message::StateHostFirmware { .. } => 15,
            Message::GetWifiInfo => 16,
            Message::StateWifiInfo { .. } => 17,
            Message::GetWifiFirmware => 18,
            Message::StateWifiFirmware { .. } => 19,
            Message::GetPower => 20,
            Message::SetPower { .. } => 21,
            Message::StatePower { .. } => 22,
            Message::GetLabel => 23,
            Message::SetLabel { .. } => 24,
            Message::StateLabel { .. } => 25,
            Message::GetVersion => 32,
            Message::StateVersion { .. } => 33,
            Message::GetInfo => 34,
            Message::StateInfo { .. } => 35,
            Message::Acknowledgement { .. } => 45,
            Message::GetLocation => 48,
            Message::SetLocation { .. } => 49,
            Message::StateLocation { .. } => 50,
            Message::GetGroup => 51,
            Message::SetGroup { .. } => 52,
            Message::StateGroup { .. } => 53,
            Message::EchoRequest { .. } => 58,
            Message::EchoResponse { .. } => 59,
            Message::LightGet => 101,
            Message::LightSetColor { .. } => 102,
            Message::SetWaveform { .. } => 103,
            Message::LightState { .. } => 107,
            Message::LightGetPower => 116,
            Message::LightSetPower { .. } => 117,
            Message::LightStatePower { .. } => 118,
            Message::SetWaveformOptional { .. } => 119,
            Message::LightGetInfrared => 120,
            Message::LightStateInfrared { .. } => 121,
            Message::LightSetInfrared { .. } => 122,
            Message::SetColorZones { .. } => 501,
            Message::GetColorZones { .. } => 502,
            Message::StateZone { .. } => 503,
            Message::StateMultiZone { .. } => 506,
            Message::GetDeviceChain => 701,
            Message::SetUserPosition { .. } => 703,
            Message::GetTileState64 { .. } => 707,
            Message::SetTileState64 { .. } => 715,
        }
    }

    /// Parses the payload of a [RawMessage] according to its type code.
    ///
    /// Codes this library cannot decode (including the tile State responses,
    /// whose layout is not implemented) yield [Error::UnknownMessageType].
    pub fn from_raw(msg: &RawMessage) -> Result<Message, Error> {
        match msg.protocol_header.typ {
            2 => Ok(Message::GetService),
            3 => Ok(decode!(msg, StateService, service: u8, port: u32)),
            12 => Ok(Message::GetHostInfo),
            13 => Ok(decode!(
                msg,
                StateHostInfo,
                signal: f32,
                tx: u32,
                rx: u32,
                reserved: i16
            )),
            14 => Ok(Message::GetHostFirmware),
            15 => Ok(decode!(
                msg,
                StateHostFirmware,
                build: u64,
                reserved: u64,
                version: u32
            )),
            16 => Ok(Message::GetWifiInfo),
            17 => Ok(decode!(
                msg,
                StateWifiInfo,
                signal: f32,
                tx: u32,
                rx: u32,
                reserved: i16
            )),
            18 => Ok(Message::GetWifiFirmware),
            19 => Ok(decode!(
                msg,
                StateWifiFirmware,
                build: u64,
                reserved: u64,
                version: u32
            )),
            20 => Ok(Message::GetPower),
            21 => Ok(decode!(msg, SetPower, level: u16)),
            22 => Ok(decode!(msg, StatePower, level: u16)),
            23 => Ok(Message::GetLabel),
            24 => Ok(decode!(msg, SetLabel, label: Label)),
            25 => Ok(decode!(msg, StateLabel, label: Label)),
            32 => Ok(Message::GetVersion),
            33 => Ok(decode!(
                msg,
                StateVersion,
                vendor: u32,
                product: u32,
                version: u32
            )),
            34 => Ok(Message::GetInfo),
            35 => Ok(decode!(
                msg,
                StateInfo,
                time: u64,
                uptime: u64,
                downtime: u64
            )),
            45 => Ok(Message::Acknowledgement {
                seq: msg.frame_addr.sequence,
            }),
            48 => Ok(Message::GetLocation),
            49 => Ok(decode!(
                msg,
                SetLocation,
                location: Ident,
                label: Label,
                updated_at: u64
            )),
            50 => Ok(decode!(
                msg,
                StateLocation,
                location: Ident,
                label: Label,
                updated_at: u64
            )),
            51 => Ok(Message::GetGroup),
            52 => Ok(decode!(
                msg,
                SetGroup,
                group: Ident,
                label: Label,
                updated_at: u64
            )),
            53 => Ok(decode!(
                msg,
                StateGroup,
                group: Ident,
                label: Label,
                updated_at: u64
            )),
            58 => Ok(decode!(msg, EchoRequest, payload: EchoPayload)),
            59 => Ok(decode!(msg, EchoResponse, payload: EchoPayload)),
            101 => Ok(Message::LightGet),
            102 => Ok(decode!(
                msg,
                LightSetColor,
                reserved: u8,
                color: HSBK,
                duration: u32
            )),
            103 => Ok(decode!(
                msg,
                SetWaveform,
                reserved: u8,
                transient: u8,
                color: HSBK,
                period: u32,
                cycles: f32,
                skew_ratio: i16,
                waveform: u8
            )),
            107 => Ok(decode!(
                msg,
                LightState,
                color: HSBK,
                reserved: i16,
                power: u16,
                label: Label,
                reserved2: u64
            )),
            116 => Ok(Message::LightGetPower),
            117 => Ok(decode!(msg, LightSetPower, level: u16, duration: u32)),
            118 => Ok(decode!(msg, LightStatePower, level: u16)),
            119 => Ok(decode!(
                msg,
                SetWaveformOptional,
                reserved: u8,
                transient: u8,
                color: HSBK,
                period: u32,
                cycles: f32,
                skew_ratio: i16,
                waveform: u8,
                set_hue: u8,
                set_saturation: u8,
                set_brightness: u8,
                set_kelvin: u8
            )),
            120 => Ok(Message::LightGetInfrared),
            121 => Ok(decode!(msg, LightStateInfrared, brightness: u16)),
            122 => Ok(decode!(msg, LightSetInfrared, brightness: u16)),
            501 => Ok(decode!(
                msg,
                SetColorZones,
                start_index: u8,
                end_index: u8,
                color: HSBK,
                duration: u32,
                apply: u8
            )),
            502 => Ok(decode!(msg, GetColorZones, start_index: u8, end_index: u8)),
            503 => Ok(decode!(msg, StateZone, count: u8, index: u8, color: HSBK)),
            506 => {
                let mut c = Cursor::new(&msg.payload[..]);
                let count: u8 = c.read_field()?;
                let index: u8 = c.read_field()?;
                // a datagram covers at most 8 contiguous zones from `index`
                let n = usize::from(count.saturating_sub(index)).min(8);
                let mut colors = Vec::with_capacity(n);
                for _ in 0..n {
                    colors.push(c.read_field()?);
                }
                Ok(Message::StateMultiZone {
                    count,
                    index,
                    colors,
                })
            }
            701 => Ok(Message::GetDeviceChain),
            703 => {
                let mut c = Cursor::new(&msg.payload[..]);
                let tile_index: u8 = c.read_field()?;
                let _reserved: u16 = c.read_field()?;
                let x: f32 = c.read_field()?;
                let y: f32 = c.read_field()?;
                Ok(Message::SetUserPosition { tile_index, x, y })
            }
            707 => {
                let mut c = Cursor::new(&msg.payload[..]);
                let tile_index: u8 = c.read_field()?;
                let length: u8 = c.read_field()?;
                let _reserved: u8 = c.read_field()?;
                let x: u8 = c.read_field()?;
                let y: u8 = c.read_field()?;
                let width: u8 = c.read_field()?;
                Ok(Message::GetTileState64 {
                    tile_index,
                    length,
                    x,
                    y,
                    width,
                })
            }
            715 => {
                let mut c = Cursor::new(&msg.payload[..]);
                let tile_index: u8 = c.read_field()?;
                let length: u8 = c.read_field()?;
                let _reserved: u8 = c.read_field()?;
                let x: u8 = c.read_field()?;
                let y: u8 = c.read_field()?;
                let width: u8 = c.read_field()?;
                let duration: u32 = c.read_field()?;
                let mut colors = Vec::with_capacity(TILE_COLOR_COUNT);
                for _ in 0..TILE_COLOR_COUNT {
                    colors.push(c.read_field()?);
                }
                Ok(Message::SetTileState64 {
                    tile_index,
                    length,
                    x,
                    y,
                    width,
                    duration,
                    colors,
                })
            }
            typ => Err(Error::UnknownMessageType(typ)),
        }
    }

    /// Serializes this message's payload. Get-style messages produce an
    /// empty buffer.
    pub(crate) fn to_payload(&self) -> Result<Vec<u8>, Error> {
        let mut v = Vec::new();
        match self {
            Message::GetService
            | Message::GetHostInfo
            | Message::GetHostFirmware
            | Message::GetWifiInfo
            | Message::GetWifiFirmware
            | Message::GetPower
            | Message::GetLabel
            | Message::GetVersion
            | Message::GetInfo
            | Message::Acknowledgement { .. }
            | Message::GetLocation
            | Message::GetGroup
            | Message::LightGet
            | Message::LightGetPower
            | Message::LightGetInfrared
            | Message::GetDeviceChain => {
                // no payload
            }
            Message::StateService { service, port } => {
                v.write_field(*service)?;
                v.write_field(*port)?;
            }
            Message::StateHostInfo {
                signal,
                tx,
                rx,
                reserved,
            }
            | Message::StateWifiInfo {
                signal,
                tx,
                rx,
                reserved,
            } => {
                v.write_field(*signal)?;
                v.write_field(*tx)?;
                v.write_field(*rx)?;
                v.write_field(*reserved)?;
            }
            Message::StateHostFirmware {
                build,
                reserved,
                version,
            }
            | Message::StateWifiFirmware {
                build,
                reserved,
                version,
            } => {
                v.write_field(*build)?;
                v.write_field(*reserved)?;
                v.write_field(*version)?;
            }
            Message::SetPower { level } | Message::StatePower { level } => {
                v.write_field(*level)?;
            }
            Message::SetLabel { label } | Message::StateLabel { label } => {
                v.write_field(label)?;
            }
            Message::StateVersion {
                vendor,
                product,
                version,
            } => {
                v.write_field(*vendor)?;
                v.write_field(*product)?;
                v.write_field(*version)?;
            }
            Message::StateInfo {
                time,
                uptime,
                downtime,
            } => {
                v.write_field(*time)?;
                v.write_field(*uptime)?;
                v.write_field(*downtime)?;
            }
            Message::SetLocation {
                location,
                label,
                updated_at,
            }
            | Message::StateLocation {
                location,
                label,
                updated_at,
            } => {
                v.write_field(*location)?;
                v.write_field(label)?;
                v.write_field(*updated_at)?;
            }
            Message::SetGroup {
                group,
                label,
                updated_at,
            }
            | Message::StateGroup {
                group,
                label,
                updated_at,
            } => {
                v.write_field(*group)?;
                v.write_field(label)?;
                v.write_field(*updated_at)?;
            }
            Message::EchoRequest { payload } | Message::EchoResponse { payload } => {
                v.write_field(*payload)?;
            }
            Message::LightSetColor {
                reserved,
                color,
                duration,
            } => {
                v.write_field(*reserved)?;
                v.write_field(*color)?;
                v.write_field(*duration)?;
            }
            Message::SetWaveform {
                reserved,
                transient,
                color,
                period,
                cycles,
                skew_ratio,
                waveform,
            } => {
                v.write_field(*reserved)?;
                v.write_field(*transient)?;
                v.write_field(*color)?;
                v.write_field(*period)?;
                v.write_field(*cycles)?;
                v.write_field(*skew_ratio)?;
                v.write_field(*waveform)?;
            }
            Message::LightState {
                color,
                reserved,
                power,
                label,
                reserved2,
            } => {
                v.write_field(*color)?;
                v.write_field(*reserved)?;
                v.write_field(*power)?;
                v.write_field(label)?;
                v.write_field(*reserved2)?;
            }
            Message::LightSetPower { level, duration } => {
                v.write_field(if *level > 0 { 65535u16 } else { 0u16 })?;
                v.write_field(*duration)?;
            }
            Message::LightStatePower { level } => {
                v.write_field(*level)?;
            }
            Message::SetWaveformOptional {
                reserved,
                transient,
                color,
                period,
                cycles,
                skew_ratio,
                waveform,
                set_hue,
                set_saturation,
                set_brightness,
                set_kelvin,
            } => {
                v.write_field(*reserved)?;
                v.write_field(*transient)?;
                v.write_field(*color)?;
                v.write_field(*period)?;
                v.write_field(*cycles)?;
                v.write_field(*skew_ratio)?;
                v.write_field(*waveform)?;
                v.write_field(*set_hue)?;
                v.write_field(*set_saturation)?;
                v.write_field(*set_brightness)?;
                v.write_field(*set_kelvin)?;
            }
            Message::LightStateInfrared { brightness }
            | Message::LightSetInfrared { brightness } => {
                v.write_field(*brightness)?;
            }
            Message::SetColorZones {
                start_index,
                end_index,
                color,
                duration,
                apply,
            } => {
                v.write_field(*start_index)?;
                v.write_field(*end_index)?;
                v.write_field(*color)?;
                v.write_field(*duration)?;
                v.write_field(*apply)?;
            }
            Message::GetColorZones {
                start_index,
                end_index,
            } => {
                v.write_field(*start_index)?;
                v.write_field(*end_index)?;
            }
            Message::StateZone {
                count,
                index,
                color,
            } => {
                v.write_field(*count)?;
                v.write_field(*index)?;
                v.write_field(*color)?;
            }
            Message::StateMultiZone {
                count,
                index,
                colors,
            } => {
                v.write_field(*count)?;
                v.write_field(*index)?;
                for color in colors {
                    v.write_field(*color)?;
                }
            }
            Message::SetUserPosition { tile_index, x, y } => {
                v.write_field(*tile_index)?;
                v.write_field(0u16)?; // reserved
                v.write_field(*x)?;
                v.write_field(*y)?;
            }
            Message::GetTileState64 {
                tile_index,
                length,
                x,
                y,
                width,
            } => {
                v.write_field(*tile_index)?;
                v.write_field(*length)?;
                v.write_field(0u8)?; // reserved
                v.write_field(*x)?;
                v.write_field(*y)?;
                v.write_field(*width)?;
            }
            Message::SetTileState64 {
                tile_index,
                length,
                x,
                y,
                width,
                duration,
                colors,
            } => {
                if colors.len() != TILE_COLOR_COUNT {
                    return Err(Error::WrongColorCount {
                        expected: TILE_COLOR_COUNT,
                        actual: colors.len(),
                    });
                }
                v.write_field(*tile_index)?;
                v.write_field(*length)?;
                v.write_field(0u8)?; // reserved
                v.write_field(*x)?;
                v.write_field(*y)?;
                v.write_field(*width)?;
                v.write_field(*duration)?;
                for color in colors {
                    v.write_field(*color)?;
                }
            }
        }
        Ok(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::{BuildOptions, Frame, FrameAddress, ProtocolHeader};

    fn round_trip(msg: Message) {
        let raw = RawMessage::build(&BuildOptions::default(), &msg).unwrap();
        let bytes = raw.pack().unwrap();
        let reparsed = RawMessage::unpack(&bytes).unwrap();
        assert_eq!(raw, reparsed);
        assert_eq!(Message::from_raw(&reparsed).unwrap(), msg);
    }

    fn color(hue: u16) -> HSBK {
        HSBK {
            hue,
            saturation: 65535,
            brightness: 30000,
            kelvin: 3500,
        }
    }

    #[test]
    fn round_trip_device_family() {
        round_trip(Message::GetService);
        round_trip(Message::StateService {
            service: Service::UDP,
            port: 56700,
        });
        round_trip(Message::StateLabel {
            label: Label::new("Lamp"),
        });
        round_trip(Message::StateGroup {
            group: Ident(*b"0123456789abcdef"),
            label: Label::new("Living Room"),
            updated_at: 1_549_000_000_000_000_000,
        });
        round_trip(Message::StateVersion {
            vendor: 1,
            product: 31,
            version: 3,
        });
        round_trip(Message::EchoRequest {
            payload: EchoPayload([0xa5; 64]),
        });
    }

    #[test]
    fn round_trip_light_family() {
        round_trip(Message::LightState {
            color: color(100),
            reserved: 0,
            power: 1234, // mid-fade levels are not normalized
            label: Label::new("Desk"),
            reserved2: 0,
        });
        round_trip(Message::SetWaveformOptional {
            reserved: 0,
            transient: true,
            color: color(7),
            period: 500,
            cycles: 2.0,
            skew_ratio: -1000,
            waveform: Waveform::Pulse,
            set_hue: true,
            set_saturation: false,
            set_brightness: true,
            set_kelvin: false,
        });
        round_trip(Message::LightSetInfrared { brightness: 700 });
    }

    #[test]
    fn round_trip_multizone_family() {
        round_trip(Message::SetColorZones {
            start_index: 3,
            end_index: 9,
            color: color(42),
            duration: 250,
            apply: ApplicationRequest::ApplyOnly,
        });
        round_trip(Message::GetColorZones {
            start_index: 0,
            end_index: 255,
        });
        round_trip(Message::StateZone {
            count: 16,
            index: 2,
            color: color(9),
        });
        round_trip(Message::StateMultiZone {
            count: 16,
            index: 0,
            colors: (0..8).map(color).collect(),
        });
    }

    #[test]
    fn round_trip_tile_family() {
        round_trip(Message::GetDeviceChain);
        round_trip(Message::SetUserPosition {
            tile_index: 1,
            x: 0.5,
            y: -1.0,
        });
        round_trip(Message::GetTileState64 {
            tile_index: 0,
            length: 1,
            x: 0,
            y: 0,
            width: 8,
        });
        round_trip(Message::SetTileState64 {
            tile_index: 0,
            length: 1,
            x: 0,
            y: 0,
            width: 8,
            duration: 100,
            colors: (0..64).map(color).collect(),
        });
    }

    #[test]
    fn multizone_tail_carries_fewer_than_eight_colors() {
        // count=16, index=12: only 4 zones remain
        let msg = Message::StateMultiZone {
            count: 16,
            index: 12,
            colors: (0..4).map(color).collect(),
        };
        let raw = RawMessage::build(&BuildOptions::default(), &msg).unwrap();
        assert_eq!(raw.payload.len(), 2 + 4 * 8);
        round_trip(msg);
    }

    #[test]
    fn tile_state_rejects_wrong_arity() {
        let msg = Message::SetTileState64 {
            tile_index: 0,
            length: 1,
            x: 0,
            y: 0,
            width: 8,
            duration: 0,
            colors: vec![HSBK::default(); 3],
        };
        match RawMessage::build(&BuildOptions::default(), &msg) {
            Err(Error::WrongColorCount { expected, actual }) => {
                assert_eq!(expected, 64);
                assert_eq!(actual, 3);
            }
            other => panic!("expected WrongColorCount, got {:?}", other),
        }
    }

    #[test]
    fn light_set_power_payload_bytes() {
        let msg = Message::LightSetPower {
            level: 65535,
            duration: 1000,
        };
        let raw = RawMessage::build(&BuildOptions::default(), &msg).unwrap();
        assert_eq!(raw.payload, vec![0xFF, 0xFF, 0xE8, 0x03, 0x00, 0x00]);
        assert_eq!(raw.packed_size(), 42);
    }

    #[test]
    fn set_color_zones_payload_layout() {
        // fields in wire order: start, end, h, s, b, k, duration, apply
        let msg = Message::SetColorZones {
            start_index: 1,
            end_index: 2,
            color: HSBK {
                hue: 0x1111,
                saturation: 0x2222,
                brightness: 0x3333,
                kelvin: 0x4444,
            },
            duration: 0x55667788,
            apply: ApplicationRequest::Apply,
        };
        let raw = RawMessage::build(&BuildOptions::default(), &msg).unwrap();
        assert_eq!(
            raw.payload,
            vec![
                0x01, 0x02, 0x11, 0x11, 0x22, 0x22, 0x33, 0x33, 0x44, 0x44, 0x88, 0x77, 0x66,
                0x55, 0x01
            ]
        );
    }

    #[test]
    fn state_service_payload_layout() {
        // service byte first, then the 32-bit port
        let msg = Message::StateService {
            service: Service::UDP,
            port: 56700,
        };
        let raw = RawMessage::build(&BuildOptions::default(), &msg).unwrap();
        assert_eq!(raw.payload, vec![0x01, 0x7c, 0xdd, 0x00, 0x00]);
    }

    #[test]
    fn built_frames_have_reserved_zero_and_addressable_set() {
        for msg in [
            Message::GetService,
            Message::GetColorZones {
                start_index: 0,
                end_index: 255,
            },
            Message::StateZone {
                count: 8,
                index: 0,
                color: HSBK::default(),
            },
        ]
        .iter()
        {
            let bytes = RawMessage::build(&BuildOptions::default(), msg)
                .unwrap()
                .pack()
                .unwrap();
            // frame address reserved span
            assert!(bytes[16..22].iter().all(|b| *b == 0));
            // protocol header leading reserved span
            assert!(bytes[24..32].iter().all(|b| *b == 0));
            // protocol header trailing reserved span
            assert!(bytes[34..36].iter().all(|b| *b == 0));
            // addressable is bit 12 of the frame word at offset 2
            assert_ne!(bytes[3] & 0x10, 0);
        }
    }

    #[test]
    fn discovery_frame_is_tagged() {
        let opts = BuildOptions {
            tagged: true,
            ..Default::default()
        };
        let bytes = RawMessage::build(&opts, &Message::GetService)
            .unwrap()
            .pack()
            .unwrap();
        // tagged is bit 13 of the frame word
        assert_ne!(bytes[3] & 0x20, 0);

        let bytes = RawMessage::build(&BuildOptions::default(), &Message::GetService)
            .unwrap()
            .pack()
            .unwrap();
        assert_eq!(bytes[3] & 0x20, 0);
    }

    #[test]
    fn build_light_set_color_golden_packet() {
        // packet from https://lan.developer.lifx.com/docs/building-a-lifx-packet
        let msg = Message::LightSetColor {
            reserved: 0,
            color: HSBK {
                hue: 21845,
                saturation: 0xffff,
                brightness: 0xffff,
                kelvin: 3500,
            },
            duration: 1024,
        };

        let opts = BuildOptions {
            tagged: true,
            ..Default::default()
        };
        let bytes = RawMessage::build(&opts, &msg).unwrap().pack().unwrap();
        assert_eq!(bytes.len(), 49);
        assert_eq!(
            bytes,
            vec![
                0x31, 0x00, 0x00, 0x34, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
                0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
                0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x66, 0x00, 0x00, 0x00, 0x00, 0x55, 0x55,
                0xFF, 0xFF, 0xFF, 0xFF, 0xAC, 0x0D, 0x00, 0x04, 0x00, 0x00
            ]
        );
    }

    #[test]
    fn unknown_codes_are_reported_not_fatal() {
        for typ in [702u16, 711, 999] {
            let raw = RawMessage {
                frame: Frame {
                    size: 36,
                    origin: 0,
                    tagged: false,
                    addressable: true,
                    protocol: 1024,
                    source: 0,
                },
                frame_addr: FrameAddress {
                    target: 0,
                    reserved: [0; 6],
                    reserved2: 0,
                    ack_required: false,
                    res_required: false,
                    sequence: 0,
                },
                protocol_header: ProtocolHeader {
                    reserved: 0,
                    typ,
                    reserved2: 0,
                },
                payload: Vec::new(),
            };
            match Message::from_raw(&raw) {
                Err(Error::UnknownMessageType(t)) => assert_eq!(t, typ),
                other => panic!("expected UnknownMessageType, got {:?}", other),
            }
        }
    }
}
