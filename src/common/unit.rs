//! Unit conversion utilities.
//!
//! DrawingML stores geometry in EMUs. Matching logic only ever sees
//! percentages of the slide.

/// Default slide width (10in, 4:3) used when `p:sldSz` is missing.
pub const DEFAULT_SLIDE_WIDTH_EMU: i64 = 9_144_000;
/// Default slide height (7.5in, 4:3) used when `p:sldSz` is missing.
pub const DEFAULT_SLIDE_HEIGHT_EMU: i64 = 6_858_000;

/// Express an EMU length as a percentage of `total`, rounded to two decimals.
///
/// Returns 0 for a non-positive `total`.
#[inline]
pub fn emu_to_percent(emu: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    let pct = emu as f64 / total as f64 * 100.0;
    (pct * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emu_to_percent() {
        assert_eq!(emu_to_percent(914_400, DEFAULT_SLIDE_WIDTH_EMU), 10.0);
        assert_eq!(emu_to_percent(1, 3), 33.33);
        assert_eq!(emu_to_percent(100, 0), 0.0);
    }
}
