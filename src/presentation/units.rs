//! Length units used by DrawingML.

/// EMUs per inch.
pub const EMU_PER_INCH: i64 = 914_400;

/// EMUs per typographic point.
pub const EMU_PER_PT: i64 = 12_700;

/// Default slide width (10 in).
pub const DEFAULT_SLIDE_WIDTH: i64 = 9_144_000;

/// Default slide height (7.5 in).
pub const DEFAULT_SLIDE_HEIGHT: i64 = 6_858_000;

/// Convert inches to EMU, rounding to the nearest unit.
pub fn inches_to_emu(inches: f64) -> i64 {
    (inches * EMU_PER_INCH as f64).round() as i64
}

/// Convert EMU to inches.
pub fn emu_to_inches(emu: i64) -> f64 {
    emu as f64 / EMU_PER_INCH as f64
}

/// Convert points to EMU.
pub fn pt_to_emu(pt: f64) -> i64 {
    (pt * EMU_PER_PT as f64).round() as i64
}

/// Convert points to hundredths of a point (font sizes, spacing).
pub fn pt_to_centipoints(pt: f64) -> i64 {
    (pt * 100.0).round() as i64
}

/// Round to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// An axis-aligned rectangle in EMU.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub left: i64,
    pub top: i64,
    pub width: i64,
    pub height: i64,
}

impl Rect {
    pub fn new(left: i64, top: i64, width: i64, height: i64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> i64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> i64 {
        self.top + self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        assert_eq!(inches_to_emu(1.0), EMU_PER_INCH);
        assert_eq!(inches_to_emu(13.333), 12_191_695);
        assert_eq!(emu_to_inches(457_200), 0.5);
        assert_eq!(pt_to_emu(2.0), 25_400);
        assert_eq!(pt_to_centipoints(10.5), 1050);
        assert_eq!(round2(1.23456), 1.23);
    }

    #[test]
    fn test_rect_edges() {
        let r = Rect::new(10, 20, 30, 40);
        assert_eq!(r.right(), 40);
        assert_eq!(r.bottom(), 60);
    }
}
