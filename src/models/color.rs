// Copyright (c) 2025, ThumbStudio Contributors
// SPDX-License-Identifier: BSD-3-Clause

//! RGBA color type with hex-string serialization.
//!
//! Colors travel over the wire as CSS-style hex strings (`#rrggbb`,
//! `#rrggbbaa`, short `#rgb`). Optional colors additionally accept and
//! emit the legacy `"transparent"` sentinel; internally an absent color
//! is always `None`, never a magic string.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// An 8-bit-per-channel straight-alpha RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::rgb(0xff, 0xff, 0xff);
    pub const BLACK: Rgba = Rgba::rgb(0x00, 0x00, 0x00);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Alpha as a 0.0–1.0 fraction.
    pub fn alpha_f32(&self) -> f32 {
        self.a as f32 / 255.0
    }
}

/// Parse error for hex color strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseColorError(String);

impl fmt::Display for ParseColorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid color string: {:?}", self.0)
    }
}

impl std::error::Error for ParseColorError {}

impl FromStr for Rgba {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .strip_prefix('#')
            .ok_or_else(|| ParseColorError(s.to_string()))?;
        // Hex digits only; multibyte input must not reach the byte slicing.
        if !hex.is_ascii() {
            return Err(ParseColorError(s.to_string()));
        }
        let nibble = |i: usize| -> Result<u8, ParseColorError> {
            u8::from_str_radix(&hex[i..i + 1], 16).map_err(|_| ParseColorError(s.to_string()))
        };
        let byte = |i: usize| -> Result<u8, ParseColorError> {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| ParseColorError(s.to_string()))
        };
        match hex.len() {
            3 => Ok(Rgba::rgb(
                nibble(0)? * 17,
                nibble(1)? * 17,
                nibble(2)? * 17,
            )),
            6 => Ok(Rgba::rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Ok(Rgba::rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => Err(ParseColorError(s.to_string())),
        }
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 0xff {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(
                f,
                "#{:02x}{:02x}{:02x}{:02x}",
                self.r, self.g, self.b, self.a
            )
        }
    }
}

impl Serialize for Rgba {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Rgba {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for `Option<Rgba>` fields whose wire form uses the
/// `"transparent"` sentinel for the disabled state.
pub mod transparent_sentinel {
    use super::Rgba;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const SENTINEL: &str = "transparent";

    pub fn serialize<S: Serializer>(
        value: &Option<Rgba>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(color) => serializer.collect_str(color),
            None => serializer.serialize_str(SENTINEL),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Rgba>, D::Error> {
        let s = String::deserialize(deserializer)?;
        if s == SENTINEL {
            return Ok(None);
        }
        s.parse().map(Some).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_long_form() {
        assert_eq!("#ffffff".parse::<Rgba>().unwrap(), Rgba::WHITE);
        assert_eq!(
            "#1f2937".parse::<Rgba>().unwrap(),
            Rgba::rgb(0x1f, 0x29, 0x37)
        );
    }

    #[test]
    fn test_parse_short_and_alpha_forms() {
        assert_eq!("#f00".parse::<Rgba>().unwrap(), Rgba::rgb(255, 0, 0));
        assert_eq!(
            "#00000080".parse::<Rgba>().unwrap(),
            Rgba::rgba(0, 0, 0, 0x80)
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("red".parse::<Rgba>().is_err());
        assert!("#12345".parse::<Rgba>().is_err());
        assert!("#gggggg".parse::<Rgba>().is_err());
    }

    #[test]
    fn test_parse_rejects_multibyte_input() {
        // Corrupt or hand-edited files must error, never panic.
        assert!("#\u{20ac}".parse::<Rgba>().is_err());
        assert!("#ff\u{20ac}".parse::<Rgba>().is_err());
        assert!("#\u{20ac}\u{20ac}".parse::<Rgba>().is_err());
    }

    #[test]
    fn test_display_round_trip() {
        let c = Rgba::rgba(0xdc, 0x26, 0x26, 0xff);
        assert_eq!(c.to_string(), "#dc2626");
        assert_eq!(c.to_string().parse::<Rgba>().unwrap(), c);

        let translucent = Rgba::rgba(1, 2, 3, 4);
        assert_eq!(translucent.to_string(), "#01020304");
        assert_eq!(translucent.to_string().parse::<Rgba>().unwrap(), translucent);
    }

    #[derive(serde::Serialize, serde::Deserialize)]
    struct Holder {
        #[serde(with = "transparent_sentinel")]
        color: Option<Rgba>,
    }

    #[test]
    fn test_sentinel_round_trip() {
        let json = serde_json::to_string(&Holder { color: None }).unwrap();
        assert_eq!(json, r#"{"color":"transparent"}"#);
        let back: Holder = serde_json::from_str(&json).unwrap();
        assert_eq!(back.color, None);

        let json = serde_json::to_string(&Holder {
            color: Some(Rgba::rgb(0xfc, 0xd3, 0x4d)),
        })
        .unwrap();
        let back: Holder = serde_json::from_str(&json).unwrap();
        assert_eq!(back.color, Some(Rgba::rgb(0xfc, 0xd3, 0x4d)));
    }
}
