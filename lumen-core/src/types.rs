//! Value types shared by message payloads.

use std::fmt;

/// Bulb color (Hue-Saturation-Brightness-Kelvin).
///
/// All four components are raw protocol units in the full `u16` range; this
/// crate does not normalize them to degrees or percentages.
///
/// When a light displays whites, `saturation` is zero, `hue` is ignored, and
/// only `brightness` and `kelvin` matter. Typical kelvin values run from 2500
/// (warm) to 9000 (cool). When a light displays colors, `kelvin` is ignored.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct HSBK {
    pub hue: u16,
    pub saturation: u16,
    pub brightness: u16,
    pub kelvin: u16,
}

/// An opaque 16-byte identifier, used for group and location ids.
///
/// Compared and hashed structurally so it can key a map.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct Ident(pub [u8; 16]);

/// A fixed-width protocol string: at most 32 bytes on the wire, zero-padded.
///
/// Decoding strips trailing zero bytes and interprets the rest as UTF-8
/// (lossily, since devices are not guaranteed to send valid UTF-8).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label(pub String);

/// Byte width of a [Label] on the wire.
pub(crate) const LABEL_SIZE: usize = 32;

impl Label {
    /// Constructs a new Label, truncating to 32 bytes on a char boundary.
    pub fn new(s: &str) -> Label {
        let mut end = s.len().min(LABEL_SIZE);
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        Label(s[..end].to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PartialEq<str> for Label {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

#[cfg(feature = "arbitrary")]
impl<'a> arbitrary::Arbitrary<'a> for Label {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        // NUL bytes can't round-trip through a zero-padded field, so keep
        // them out of fuzz inputs.
        let s: &str = u.arbitrary()?;
        let cleaned: String = s.chars().filter(|c| *c != '\0').collect();
        Ok(Label::new(&cleaned))
    }
}

/// The 64-byte blob carried by [crate::Message::EchoRequest] and echoed back
/// in [crate::Message::EchoResponse].
#[derive(Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub struct EchoPayload(pub [u8; 64]);

impl fmt::Debug for EchoPayload {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<EchoPayload>")
    }
}

/// What services a device exposes.
///
/// Only the UDP service is documented; messages advertising other services
/// fail to decode and are dropped by callers.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub enum Service {
    UDP = 1,
}

#[repr(u16)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub enum PowerLevel {
    Standby = 0,
    Enabled = 65535,
}

/// Controls how multizone devices apply color changes.
///
/// See [crate::Message::SetColorZones].
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub enum ApplicationRequest {
    /// Buffer the requested changes until a message with Apply or ApplyOnly
    /// arrives.
    NoApply = 0,
    /// Apply the requested changes immediately, along with any pending ones.
    Apply = 1,
    /// Ignore the changes in this message and only apply pending ones.
    ApplyOnly = 2,
}

/// Waveform shapes for the light effect messages.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub enum Waveform {
    Saw = 0,
    Sine = 1,
    HalfSine = 2,
    Triangle = 3,
    Pulse = 4,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn label_truncates_on_char_boundary() {
        let long = "x".repeat(40);
        assert_eq!(Label::new(&long).0.len(), 32);

        // 31 ASCII bytes followed by a 2-byte char: the char must not be split
        let mut s = "y".repeat(31);
        s.push('é');
        let label = Label::new(&s);
        assert_eq!(label.0.len(), 31);
    }

    #[test]
    fn label_short_passthrough() {
        let label = Label::new("Kitchen");
        assert_eq!(label, *"Kitchen");
        assert_eq!(label.to_string(), "Kitchen");
    }

    #[test]
    fn ident_keys_a_map() {
        let a = Ident([1; 16]);
        let b = Ident([1; 16]);
        let c = Ident([2; 16]);
        let mut map = HashMap::new();
        map.insert(a, "one");
        assert_eq!(map.get(&b), Some(&"one"));
        assert_eq!(map.get(&c), None);
    }
}
