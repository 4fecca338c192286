use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::DesignError;

pub const BACKGROUND_LIGHTEN_OFFSET: f32 = 0.35;

pub const CONTRAST_THRESHOLD: f32 = 0.5;

/// 8-bit sRGB color. Parsed from and printed as `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(0xFF, 0xFF, 0xFF);
    pub const BLACK: Rgb = Rgb::new(0x00, 0x00, 0x00);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn from_u32(value: u32) -> Self {
        Self {
            r: ((value >> 16) & 0xFF) as u8,
            g: ((value >> 8) & 0xFF) as u8,
            b: (value & 0xFF) as u8,
        }
    }

    /// Accepts `#RRGGBB`, `RRGGBB` and the `#RGB` shorthand.
    pub fn parse_hex(input: &str) -> Result<Self, DesignError> {
        let invalid = || DesignError::InvalidColor(input.to_string());
        let digits = input.trim().trim_start_matches('#');
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        match digits.len() {
            6 => {
                let value = u32::from_str_radix(digits, 16).map_err(|_| invalid())?;
                Ok(Self::from_u32(value))
            }
            3 => {
                let mut channels = [0u8; 3];
                for (slot, ch) in channels.iter_mut().zip(digits.chars()) {
                    let nibble = ch.to_digit(16).ok_or_else(invalid)? as u8;
                    *slot = nibble << 4 | nibble;
                }
                Ok(Self::new(channels[0], channels[1], channels[2]))
            }
            _ => Err(invalid()),
        }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    pub fn to_unit(self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }

    pub fn from_unit(channels: [f32; 3]) -> Self {
        let quantize = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::new(
            quantize(channels[0]),
            quantize(channels[1]),
            quantize(channels[2]),
        )
    }

    pub fn to_rgba8(self) -> [u8; 4] {
        [self.r, self.g, self.b, 0xFF]
    }

    pub fn luminance(self) -> f32 {
        let [r, g, b] = self.to_unit();
        0.299 * r + 0.587 * g + 0.114 * b
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Rgb {
    type Err = DesignError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_hex(s)
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Rgb::parse_hex(&raw).map_err(serde::de::Error::custom)
    }
}

pub fn contrast_text_color(background: Rgb) -> Rgb {
    if background.luminance() > CONTRAST_THRESHOLD {
        Rgb::BLACK
    } else {
        Rgb::WHITE
    }
}

pub fn lighten_background(color: Rgb) -> [f32; 3] {
    color
        .to_unit()
        .map(|channel| (channel + BACKGROUND_LIGHTEN_OFFSET).min(1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_long_and_short_hex() {
        assert_eq!(Rgb::parse_hex("#DC4419").unwrap(), Rgb::new(0xDC, 0x44, 0x19));
        assert_eq!(Rgb::parse_hex("dc4419").unwrap(), Rgb::new(0xDC, 0x44, 0x19));
        assert_eq!(Rgb::parse_hex("#fa0").unwrap(), Rgb::new(0xFF, 0xAA, 0x00));
    }

    #[test]
    fn rejects_malformed_hex() {
        for raw in ["", "#12345", "#GGGGGG", "#+12345", "#1234567"] {
            let err = Rgb::parse_hex(raw).expect_err("malformed color must fail");
            assert!(matches!(err, DesignError::InvalidColor(_)), "{raw}: {err}");
        }
    }

    #[test]
    fn hex_round_trips_through_serde() {
        let color = Rgb::new(0x2F, 0xBF, 0x71);
        let json = serde_json::to_string(&color).unwrap();
        assert_eq!(json, "\"#2FBF71\"");
        let back: Rgb = serde_json::from_str(&json).unwrap();
        assert_eq!(back, color);
    }

    #[test]
    fn brand_orange_gets_white_text() {
        let orange = Rgb::parse_hex("#DC4419").unwrap();
        assert!(orange.luminance() < CONTRAST_THRESHOLD);
        assert!((orange.luminance() - 0.426).abs() < 0.01);
        assert_eq!(contrast_text_color(orange), Rgb::WHITE);
    }

    #[test]
    fn lighten_saturates_bright_channels() {
        let lifted = lighten_background(Rgb::new(0xFF, 0x80, 0x00));
        assert_eq!(lifted[0], 1.0);
        assert!((lifted[1] - (128.0 / 255.0 + 0.35)).abs() < 1e-6);
        assert!((lifted[2] - 0.35).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn lighten_is_clamped_offset(r in any::<u8>(), g in any::<u8>(), b in any::<u8>()) {
            let color = Rgb::new(r, g, b);
            let lifted = lighten_background(color);
            for (out, input) in lifted.iter().zip(color.to_unit()) {
                prop_assert!(*out <= 1.0);
                prop_assert_eq!(*out, (input + BACKGROUND_LIGHTEN_OFFSET).min(1.0));
            }
        }

        #[test]
        fn lighten_is_monotonic(a in any::<u8>(), b in any::<u8>()) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let low = lighten_background(Rgb::new(lo, lo, lo));
            let high = lighten_background(Rgb::new(hi, hi, hi));
            prop_assert!(low[0] <= high[0]);
        }

        #[test]
        fn contrast_follows_luminance(r in any::<u8>(), g in any::<u8>(), b in any::<u8>()) {
            let color = Rgb::new(r, g, b);
            let expected = if color.luminance() > 0.5 { Rgb::BLACK } else { Rgb::WHITE };
            prop_assert_eq!(contrast_text_color(color), expected);
        }
    }
}
