//! Position fingerprints.
//!
//! A fingerprint tells apart elements that share their text by where they
//! sit on the slide: `text__pos_<left>_<top>` with both coordinates snapped
//! down to a grid of `bucket` percentage points. Special content (numbers,
//! symbols, very short strings) is its own fingerprint.

use crate::fill::element::Position;
use crate::fill::normalize::is_special_content;

/// Separator between the text and the quantized position.
pub const POSITION_MARKER: &str = "__pos_";

/// Snap a percentage down to the grid.
#[inline]
pub fn quantize(percent: f64, bucket: u32) -> i64 {
    let bucket = bucket.max(1) as f64;
    ((percent / bucket).floor() * bucket) as i64
}

/// Fingerprint of `text` at `position`.
///
/// A missing position fingerprints as the slide origin.
///
/// # Examples
///
/// ```rust
/// use deckfill::fill::{Position, fingerprint};
///
/// let pos = Position { left_percent: 12.4, top_percent: 49.9, ..Default::default() };
/// assert_eq!(fingerprint("Revenue", Some(&pos), 5), "Revenue__pos_10_45");
/// assert_eq!(fingerprint("2025", Some(&pos), 5), "2025");
/// ```
pub fn fingerprint(text: &str, position: Option<&Position>, bucket: u32) -> String {
    let text = text.trim();
    if is_special_content(text) {
        return text.to_string();
    }
    let (left, top) = position.map_or((0.0, 0.0), |p| (p.left_percent, p.top_percent));
    format!(
        "{}{}{}_{}",
        text,
        POSITION_MARKER,
        quantize(left, bucket),
        quantize(top, bucket)
    )
}
