use crate::foundation::error::{StudioError, StudioResult};
use serde::{Deserialize, Serialize};

/// Straight-alpha RGBA8 color.
///
/// Serializes as an uppercase hex string (`"#RRGGBB"`, or `"#RRGGBBAA"` when
/// the alpha channel is not 255), matching the wire format used by the
/// storefront backend for text and per-character colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Opaque black, the default text color.
    pub const BLACK: Rgba8 = Rgba8::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Rgba8 = Rgba8::rgb(255, 255, 255);

    /// Opaque color from channel values.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA` (case-insensitive, `#` optional).
    pub fn from_hex(s: &str) -> StudioResult<Self> {
        let t = s.trim();
        let t = t.strip_prefix('#').unwrap_or(t);
        if !t.is_ascii() {
            return Err(StudioError::validation(format!("invalid hex color \"{s}\"")));
        }

        fn hex_byte(pair: &str) -> StudioResult<u8> {
            u8::from_str_radix(pair, 16)
                .map_err(|_| StudioError::validation(format!("invalid hex byte \"{pair}\"")))
        }

        match t.len() {
            6 => Ok(Self {
                r: hex_byte(&t[0..2])?,
                g: hex_byte(&t[2..4])?,
                b: hex_byte(&t[4..6])?,
                a: 255,
            }),
            8 => Ok(Self {
                r: hex_byte(&t[0..2])?,
                g: hex_byte(&t[2..4])?,
                b: hex_byte(&t[4..6])?,
                a: hex_byte(&t[6..8])?,
            }),
            _ => Err(StudioError::validation(format!(
                "hex color must be #RRGGBB or #RRGGBBAA, got \"{s}\""
            ))),
        }
    }

    /// Format as `#RRGGBB`, appending `AA` only for non-opaque colors.
    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!("#{:02X}{:02X}{:02X}{:02X}", self.r, self.g, self.b, self.a)
        }
    }

    /// Convert into premultiplied RGBA8.
    pub fn to_premul(self) -> [u8; 4] {
        fn premul(c: u8, a: u8) -> u8 {
            ((u16::from(c) * u16::from(a) + 127) / 255) as u8
        }
        [
            premul(self.r, self.a),
            premul(self.g, self.a),
            premul(self.b, self.a),
            self.a,
        ]
    }
}

impl Default for Rgba8 {
    fn default() -> Self {
        Self::BLACK
    }
}

impl Serialize for Rgba8 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgba8 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Rgba8::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
