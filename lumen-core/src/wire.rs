//! Little-endian field readers and writers shared by the header and payload
//! codecs.

use std::io;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::Error;
use crate::types::{
    ApplicationRequest, EchoPayload, Ident, Label, PowerLevel, Service, Waveform, HSBK, LABEL_SIZE,
};

pub(crate) trait FieldWrite<T>: WriteBytesExt {
    fn write_field(&mut self, v: T) -> Result<(), io::Error>;
}

macro_rules! derive_field_write {
    { $( $m:ident: $t:ty ),* } => {
        $(
            impl<W: WriteBytesExt> FieldWrite<$t> for W {
                fn write_field(&mut self, v: $t) -> Result<(), io::Error> {
                    self.$m::<LittleEndian>(v)
                }
            }
        )*
    };
}

derive_field_write! { write_u16: u16, write_i16: i16, write_u32: u32, write_u64: u64, write_f32: f32 }

impl<W: WriteBytesExt> FieldWrite<u8> for W {
    fn write_field(&mut self, v: u8) -> Result<(), io::Error> {
        self.write_u8(v)
    }
}

impl<W: WriteBytesExt> FieldWrite<bool> for W {
    fn write_field(&mut self, v: bool) -> Result<(), io::Error> {
        self.write_u8(v as u8)
    }
}

impl<W: WriteBytesExt> FieldWrite<HSBK> for W {
    fn write_field(&mut self, v: HSBK) -> Result<(), io::Error> {
        self.write_field(v.hue)?;
        self.write_field(v.saturation)?;
        self.write_field(v.brightness)?;
        self.write_field(v.kelvin)?;
        Ok(())
    }
}

impl<W: WriteBytesExt> FieldWrite<Ident> for W {
    fn write_field(&mut self, v: Ident) -> Result<(), io::Error> {
        self.write_all(&v.0)
    }
}

impl<W: WriteBytesExt> FieldWrite<EchoPayload> for W {
    fn write_field(&mut self, v: EchoPayload) -> Result<(), io::Error> {
        self.write_all(&v.0)
    }
}

impl<W: WriteBytesExt> FieldWrite<&Label> for W {
    fn write_field(&mut self, v: &Label) -> Result<(), io::Error> {
        // Fixed-width field: truncate to 32 bytes and zero-pad the rest.
        let bytes = v.0.as_bytes();
        let n = bytes.len().min(LABEL_SIZE);
        self.write_all(&bytes[..n])?;
        for _ in n..LABEL_SIZE {
            self.write_u8(0)?;
        }
        Ok(())
    }
}

impl<W: WriteBytesExt> FieldWrite<Service> for W {
    fn write_field(&mut self, v: Service) -> Result<(), io::Error> {
        self.write_u8(v as u8)
    }
}

impl<W: WriteBytesExt> FieldWrite<PowerLevel> for W {
    fn write_field(&mut self, v: PowerLevel) -> Result<(), io::Error> {
        self.write_u16::<LittleEndian>(v as u16)
    }
}

impl<W: WriteBytesExt> FieldWrite<ApplicationRequest> for W {
    fn write_field(&mut self, v: ApplicationRequest) -> Result<(), io::Error> {
        self.write_u8(v as u8)
    }
}

impl<W: WriteBytesExt> FieldWrite<Waveform> for W {
    fn write_field(&mut self, v: Waveform) -> Result<(), io::Error> {
        self.write_u8(v as u8)
    }
}

pub(crate) trait FieldRead<T> {
    fn read_field(&mut self) -> Result<T, io::Error>;
}

macro_rules! derive_field_read {
    { $( $m:ident: $t:ty ),* } => {
        $(
            impl<R: ReadBytesExt> FieldRead<$t> for R {
                fn read_field(&mut self) -> Result<$t, io::Error> {
                    self.$m::<LittleEndian>()
                }
            }
        )*
    };
}

derive_field_read! { read_u16: u16, read_i16: i16, read_u32: u32, read_u64: u64, read_f32: f32 }

impl<R: ReadBytesExt> FieldRead<u8> for R {
    fn read_field(&mut self) -> Result<u8, io::Error> {
        self.read_u8()
    }
}

impl<R: ReadBytesExt> FieldRead<HSBK> for R {
    fn read_field(&mut self) -> Result<HSBK, io::Error> {
        let hue = self.read_field()?;
        let saturation = self.read_field()?;
        let brightness = self.read_field()?;
        let kelvin = self.read_field()?;
        Ok(HSBK {
            hue,
            saturation,
            brightness,
            kelvin,
        })
    }
}

impl<R: ReadBytesExt> FieldRead<Ident> for R {
    fn read_field(&mut self) -> Result<Ident, io::Error> {
        let mut id = [0; 16];
        self.read_exact(&mut id)?;
        Ok(Ident(id))
    }
}

impl<R: ReadBytesExt> FieldRead<EchoPayload> for R {
    fn read_field(&mut self) -> Result<EchoPayload, io::Error> {
        let mut payload = [0; 64];
        self.read_exact(&mut payload)?;
        Ok(EchoPayload(payload))
    }
}

impl<R: ReadBytesExt> FieldRead<Label> for R {
    fn read_field(&mut self) -> Result<Label, io::Error> {
        let mut raw = [0; LABEL_SIZE];
        self.read_exact(&mut raw)?;
        let end = raw
            .iter()
            .rposition(|b| *b != 0)
            .map_or(0, |last| last + 1);
        Ok(Label(String::from_utf8_lossy(&raw[..end]).into_owned()))
    }
}

/// Checked conversion from a wire integer into a payload field type.
pub(crate) trait FromField<T>: Sized {
    fn from_field(val: T) -> Result<Self, Error>;
}

macro_rules! derive_from_field {
    { $( $t:ty ),* } => {
        $(
            impl FromField<$t> for $t {
                fn from_field(val: $t) -> Result<Self, Error> {
                    Ok(val)
                }
            }
        )*
    };
}

derive_from_field! { u8, u16, i16, u32, f32, u64, Ident, Label, EchoPayload, HSBK }

impl FromField<u8> for Service {
    fn from_field(val: u8) -> Result<Service, Error> {
        if val == Service::UDP as u8 {
            Ok(Service::UDP)
        } else {
            Err(Error::ProtocolError(format!("unknown service {}", val)))
        }
    }
}

impl FromField<u16> for PowerLevel {
    fn from_field(val: u16) -> Result<PowerLevel, Error> {
        match val {
            x if x == PowerLevel::Standby as u16 => Ok(PowerLevel::Standby),
            x if x == PowerLevel::Enabled as u16 => Ok(PowerLevel::Enabled),
            x => Err(Error::ProtocolError(format!("unknown power level {}", x))),
        }
    }
}

impl FromField<u8> for ApplicationRequest {
    fn from_field(val: u8) -> Result<ApplicationRequest, Error> {
        match val {
            0 => Ok(ApplicationRequest::NoApply),
            1 => Ok(ApplicationRequest::Apply),
            2 => Ok(ApplicationRequest::ApplyOnly),
            x => Err(Error::ProtocolError(format!(
                "unknown application request {}",
                x
            ))),
        }
    }
}

impl FromField<u8> for Waveform {
    fn from_field(val: u8) -> Result<Waveform, Error> {
        match val {
            0 => Ok(Waveform::Saw),
            1 => Ok(Waveform::Sine),
            2 => Ok(Waveform::HalfSine),
            3 => Ok(Waveform::Triangle),
            4 => Ok(Waveform::Pulse),
            x => Err(Error::ProtocolError(format!("unknown waveform {}", x))),
        }
    }
}

impl FromField<u8> for bool {
    fn from_field(val: u8) -> Result<bool, Error> {
        Ok(val > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn label_pads_to_32_bytes() {
        let mut v = Vec::new();
        v.write_field(&Label::new("Lamp")).unwrap();
        assert_eq!(v.len(), 32);
        assert_eq!(&v[..4], b"Lamp");
        assert!(v[4..].iter().all(|b| *b == 0));
    }

    #[test]
    fn label_strips_trailing_zeros_only() {
        let mut raw = [0u8; 32];
        raw[..5].copy_from_slice(b"a\0b\0c");
        let label: Label = Cursor::new(&raw[..]).read_field().unwrap();
        // interior NULs survive, trailing padding does not
        assert_eq!(label.0, "a\0b\0c");
    }

    #[test]
    fn hsbk_round_trip() {
        let color = HSBK {
            hue: 21845,
            saturation: 0xffff,
            brightness: 0x8000,
            kelvin: 3500,
        };
        let mut v = Vec::new();
        v.write_field(color).unwrap();
        assert_eq!(v.len(), 8);
        let back: HSBK = Cursor::new(&v[..]).read_field().unwrap();
        assert_eq!(color, back);
    }

    #[test]
    fn rejects_unknown_service() {
        assert!(<Service as FromField<u8>>::from_field(1).is_ok());
        assert!(<Service as FromField<u8>>::from_field(5).is_err());
    }
}
