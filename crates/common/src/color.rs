use serde::{Deserialize, Serialize};

/// Errors from parsing a color literal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorError {
    #[error("invalid hex color literal: {0}")]
    InvalidHex(String),
    #[error("unknown color name: {0}")]
    UnknownName(String),
}

/// Linear RGB color with components in `[0, 1]`.
///
/// Serialized as a `#rrggbb` string. Parsing also accepts `0xrrggbb` and a
/// small set of CSS color names.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

const NAMED: &[(&str, u32)] = &[
    ("white", 0xffffff),
    ("black", 0x000000),
    ("red", 0xff0000),
    ("green", 0x008000),
    ("blue", 0x0000ff),
    ("yellow", 0xffff00),
    ("orange", 0xffa500),
    ("gray", 0x808080),
    ("grey", 0x808080),
    ("lightgreen", 0x90ee90),
    ("skyblue", 0x87ceeb),
];

impl Color {
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| ((hex >> shift) & 0xff) as f32 / 255.0;
        Self::rgb(channel(16), channel(8), channel(0))
    }

    pub fn to_hex(self) -> u32 {
        let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u32;
        (channel(self.r) << 16) | (channel(self.g) << 8) | channel(self.b)
    }

    pub fn to_rgba(self, alpha: f32) -> [f32; 4] {
        [self.r, self.g, self.b, alpha]
    }

    /// Parse `#rrggbb`, `0xrrggbb` or a known color name.
    pub fn parse(s: &str) -> Result<Self, ColorError> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix('#')
            .or_else(|| trimmed.strip_prefix("0x"))
            .or_else(|| trimmed.strip_prefix("0X"));
        if let Some(digits) = digits {
            if digits.len() != 6 {
                return Err(ColorError::InvalidHex(s.to_string()));
            }
            return u32::from_str_radix(digits, 16)
                .map(Self::from_hex)
                .map_err(|_| ColorError::InvalidHex(s.to_string()));
        }
        let lower = trimmed.to_ascii_lowercase();
        NAMED
            .iter()
            .find(|(name, _)| *name == lower)
            .map(|(_, hex)| Self::from_hex(*hex))
            .ok_or_else(|| ColorError::UnknownName(s.to_string()))
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl TryFrom<String> for Color {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        format!("#{:06x}", color.to_hex())
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:06x}", self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hash_and_0x_forms() {
        assert_eq!(Color::parse("#59ffe9").unwrap().to_hex(), 0x59ffe9);
        assert_eq!(Color::parse("0x59ffe9").unwrap().to_hex(), 0x59ffe9);
    }

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!(Color::parse("LightGreen").unwrap().to_hex(), 0x90ee90);
        assert_eq!(Color::parse("white").unwrap(), Color::WHITE);
    }

    #[test]
    fn rejects_bad_literals() {
        assert!(matches!(Color::parse("#fff"), Err(ColorError::InvalidHex(_))));
        assert!(matches!(Color::parse("#gggggg"), Err(ColorError::InvalidHex(_))));
        assert!(matches!(Color::parse("chartreuse-ish"), Err(ColorError::UnknownName(_))));
    }

    #[test]
    fn serializes_as_hex_string() {
        let json = serde_json::to_string(&Color::from_hex(0x00ff80)).unwrap();
        assert_eq!(json, "\"#00ff80\"");
        let back: Color = serde_json::from_str("\"black\"").unwrap();
        assert_eq!(back, Color::BLACK);
    }
}
