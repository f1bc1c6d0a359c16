use smallvec::SmallVec;
use std::fmt;

/// RGB color representation.
///
/// Represents a color using red, green, and blue components, each in the range 0-255.
///
/// # Examples
///
/// ```rust
/// use deckfill::common::RGBColor;
///
/// let red = RGBColor::new(255, 0, 0);
/// let blue = RGBColor::from_hex("#0000FF").unwrap();
/// assert_eq!(RGBColor::from_int(0xFF0000), red);
/// assert_eq!(blue.to_hex(), "0000FF");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RGBColor {
    /// Red component (0-255)
    pub r: u8,
    /// Green component (0-255)
    pub g: u8,
    /// Blue component (0-255)
    pub b: u8,
}

impl RGBColor {
    /// Black, the fallback for every color that cannot be reconstructed.
    pub const BLACK: Self = Self::new(0, 0, 0);

    /// Create a new RGB color.
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Create a color from a packed `0xRRGGBB` integer.
    ///
    /// Bits above the lowest 24 are ignored.
    #[inline]
    pub const fn from_int(value: u32) -> Self {
        Self::new(
            ((value >> 16) & 0xFF) as u8,
            ((value >> 8) & 0xFF) as u8,
            (value & 0xFF) as u8,
        )
    }

    /// Pack into a `0xRRGGBB` integer.
    #[inline]
    pub const fn to_int(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Create an RGB color from a hex string ("FF0000" or "#FF0000").
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }

        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

        Some(Self::new(r, g, b))
    }

    /// Convert to hex string (without # prefix), as DrawingML `val` attributes expect.
    pub fn to_hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl fmt::Display for RGBColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.to_hex())
    }
}

/// A color transform child of a DrawingML color element (`a:lumMod val="75000"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorTransform {
    /// Local element name, e.g. `lumMod`, `lumOff`, `alpha`, `shade`
    pub name: String,
    /// Raw `val` attribute
    pub val: String,
}

/// A reference into the theme color scheme (`a:schemeClr`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemeColor {
    /// Scheme slot, e.g. `accent1`, `tx1`, `dk2`
    pub name: String,
    /// Luminance and alpha modifiers applied on top of the slot
    pub transforms: SmallVec<[ColorTransform; 2]>,
}

impl SchemeColor {
    /// A bare scheme reference without modifiers.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transforms: SmallVec::new(),
        }
    }
}

/// Font color as found on a text run.
///
/// DrawingML offers several mutually exclusive color representations.
/// Only [`ColorValue::Rgb`] and [`ColorValue::Theme`] can be written back
/// faithfully; the other arms degrade to black when reapplied.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ColorValue {
    /// Direct RGB value (`a:srgbClr`)
    Rgb(RGBColor),
    /// Theme color reference (`a:schemeClr`)
    Theme(SchemeColor),
    /// Preset color name (`a:prstClr`); no setter exists on the mutable side
    Preset(String),
    /// System, HSL or scRGB color; element name kept for diagnostics
    Unsupported(String),
    /// No color on the run
    #[default]
    Absent,
}

impl ColorValue {
    /// Representation tag used in logs and reports.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Rgb(_) => "rgb_int",
            Self::Theme(_) => "theme_ref",
            Self::Preset(_) => "preset_ref",
            Self::Unsupported(_) => "unsupported",
            Self::Absent => "absent",
        }
    }

    /// Whether writing this value back reproduces the original color.
    pub fn is_reconstructible(&self) -> bool {
        matches!(self, Self::Rgb(_) | Self::Theme(_))
    }

    /// Whether a value is present at all.
    #[inline]
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_round_trip() {
        let color = RGBColor::from_hex("#1F4e79").unwrap();
        assert_eq!(color, RGBColor::new(0x1F, 0x4E, 0x79));
        assert_eq!(color.to_hex(), "1F4E79");
        assert_eq!(color.to_string(), "#1F4E79");
    }

    #[test]
    fn test_hex_rejects_malformed() {
        assert!(RGBColor::from_hex("FFF").is_none());
        assert!(RGBColor::from_hex("GG0000").is_none());
        assert!(RGBColor::from_hex("ÿÿÿ").is_none());
    }

    #[test]
    fn test_int_packing() {
        let color = RGBColor::from_int(0x123456);
        assert_eq!(color, RGBColor::new(0x12, 0x34, 0x56));
        assert_eq!(color.to_int(), 0x123456);
        assert_eq!(RGBColor::from_int(0xFF00_0000), RGBColor::BLACK);
    }

    #[test]
    fn test_color_kinds() {
        assert_eq!(ColorValue::Rgb(RGBColor::BLACK).kind(), "rgb_int");
        assert_eq!(ColorValue::Theme(SchemeColor::new("accent1")).kind(), "theme_ref");
        assert_eq!(ColorValue::Preset("red".into()).kind(), "preset_ref");
        assert_eq!(ColorValue::default().kind(), "absent");
        assert!(!ColorValue::Preset("red".into()).is_reconstructible());
        assert!(ColorValue::Theme(SchemeColor::new("tx1")).is_reconstructible());
    }
}
