/// Tunables for field resolution and text replacement.
use crate::common::error::{Error, Result};
use crate::common::style::RGBColor;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Heuristic thresholds of the filler.
///
/// Options can be built in code or loaded from a YAML file.
///
/// # Examples
///
/// ```rust
/// use deckfill::fill::FillOptions;
///
/// // Create with defaults
/// let options = FillOptions::default();
/// assert_eq!(options.position_bucket, 5);
///
/// // Or customize
/// let options = FillOptions::new()
///     .with_position_bucket(10)
///     .with_max_edit_distance(2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FillOptions {
    /// Grid size in percentage points used to quantize fingerprint positions
    pub position_bucket: u32,
    /// Longest element text the tag/label tier will look at
    pub max_tag_text_len: usize,
    /// Longest normalized text that still counts as "short" for tag classification
    pub short_text_len: usize,
    /// Widest element (percent of slide width) that still counts as small
    pub small_width_percent: f64,
    /// Tallest element (percent of slide height) that still counts as small
    pub small_height_percent: f64,
    /// Largest edit distance accepted by the fuzzy tag stage
    pub max_edit_distance: usize,
    /// Longest normalized string (either side) compared by edit distance
    pub fuzzy_max_len: usize,
    /// Color used when the original color cannot be reconstructed
    #[serde(with = "hex_color")]
    pub default_color: RGBColor,
}

impl Default for FillOptions {
    fn default() -> Self {
        Self {
            position_bucket: 5,
            max_tag_text_len: 15,
            short_text_len: 10,
            small_width_percent: 20.0,
            small_height_percent: 10.0,
            max_edit_distance: 3,
            fuzzy_max_len: 10,
            default_color: RGBColor::BLACK,
        }
    }
}

impl FillOptions {
    /// Create a new `FillOptions` with default values.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load options from a YAML file. Missing keys keep their defaults.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&text)
    }

    /// Parse options from YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let options: Self =
            serde_saphyr::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        options.validate()?;
        Ok(options)
    }

    /// Reject settings no heuristic can work with.
    pub fn validate(&self) -> Result<()> {
        if self.position_bucket == 0 {
            return Err(Error::Config("position_bucket must be at least 1".into()));
        }
        if !(self.small_width_percent.is_finite() && self.small_height_percent.is_finite()) {
            return Err(Error::Config("small element bounds must be finite".into()));
        }
        Ok(())
    }

    /// Set the fingerprint grid size in percentage points.
    #[inline]
    pub fn with_position_bucket(mut self, bucket: u32) -> Self {
        self.position_bucket = bucket;
        self
    }

    /// Set the longest element text considered by the tag tier.
    #[inline]
    pub fn with_max_tag_text_len(mut self, len: usize) -> Self {
        self.max_tag_text_len = len;
        self
    }

    /// Set the "short text" bound used by the tag classifier.
    #[inline]
    pub fn with_short_text_len(mut self, len: usize) -> Self {
        self.short_text_len = len;
        self
    }

    /// Set the bounds of the small-element predicate, in percent of the slide.
    #[inline]
    pub fn with_small_bounds(mut self, width_percent: f64, height_percent: f64) -> Self {
        self.small_width_percent = width_percent;
        self.small_height_percent = height_percent;
        self
    }

    /// Set the largest edit distance accepted by the fuzzy tag stage.
    #[inline]
    pub fn with_max_edit_distance(mut self, distance: usize) -> Self {
        self.max_edit_distance = distance;
        self
    }

    /// Set the fallback color for unreconstructible colors.
    #[inline]
    pub fn with_default_color(mut self, color: RGBColor) -> Self {
        self.default_color = color;
        self
    }
}

/// `RRGGBB` strings (optionally `#`-prefixed) for [`RGBColor`] fields.
mod hex_color {
    use crate::common::style::RGBColor;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(color: &RGBColor, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&color.to_hex())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<RGBColor, D::Error> {
        let raw = String::deserialize(deserializer)?;
        RGBColor::from_hex(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid hex color '{}'", raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let options = FillOptions::new()
            .with_position_bucket(10)
            .with_small_bounds(25.0, 12.5)
            .with_default_color(RGBColor::new(0x33, 0x33, 0x33));
        assert_eq!(options.position_bucket, 10);
        assert_eq!(options.small_width_percent, 25.0);
        assert_eq!(options.default_color.to_hex(), "333333");
        assert_eq!(options.max_tag_text_len, 15);
    }

    #[test]
    fn test_yaml_partial_override() {
        let options = FillOptions::from_yaml_str(
            "position_bucket: 10\nmax_edit_distance: 2\ndefault_color: '#202020'\n",
        )
        .unwrap();
        assert_eq!(options.position_bucket, 10);
        assert_eq!(options.max_edit_distance, 2);
        assert_eq!(options.default_color, RGBColor::new(0x20, 0x20, 0x20));
        assert_eq!(options.short_text_len, 10);
    }

    #[test]
    fn test_yaml_rejects_zero_bucket() {
        assert!(matches!(
            FillOptions::from_yaml_str("position_bucket: 0\n"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            FillOptions::from_yaml_str("default_color: nope\n"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fill.yaml");
        std::fs::write(&path, "small_width_percent: 30.0\n").unwrap();
        let options = FillOptions::from_yaml_file(&path).unwrap();
        assert_eq!(options.small_width_percent, 30.0);
    }
}
