//! Unit conversion utilities.
//!
//! Word-processing markup uses three integer units: half-points for font
//! sizes, twips (1/20 pt) for paragraph and page measurements, and EMU for
//! drawing extents. Each has a newtype here so values are stored in their
//! canonical integer form and never pass through a float on save.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const EMUS_PER_INCH: i64 = 914_400;
pub const EMUS_PER_CM: i64 = 360_000;
pub const EMUS_PER_MM: i64 = 36_000;
pub const EMUS_PER_PT: i64 = 12_700;
pub const EMUS_PER_PX: i64 = 9_525;
pub const EMUS_PER_TWIP: i64 = 635;
pub const TWIPS_PER_PT: i32 = 20;
pub const TWIPS_PER_INCH: i32 = 1_440;
pub const HALF_POINTS_PER_PT: u32 = 2;

/// Font size in half-points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HalfPoints(pub u32);

impl HalfPoints {
    #[inline]
    pub const fn from_pt(pt: u32) -> Self {
        Self(pt.saturating_mul(HALF_POINTS_PER_PT))
    }

    /// Convert a fractional point size, rounding to the nearest half point.
    #[inline]
    pub fn from_pt_f64(pt: f64) -> Self {
        Self((pt * HALF_POINTS_PER_PT as f64).round().max(0.0) as u32)
    }

    /// Size in whole points, truncating a trailing half point.
    #[inline]
    pub const fn whole_pt(self) -> u32 {
        self.0 / HALF_POINTS_PER_PT
    }

    #[inline]
    pub fn to_pt_f64(self) -> f64 {
        self.0 as f64 / HALF_POINTS_PER_PT as f64
    }
}

impl fmt::Display for HalfPoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Length in twentieths of a point.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Twips(pub i32);

impl Twips {
    #[inline]
    pub const fn from_pt(pt: i32) -> Self {
        Self(pt.saturating_mul(TWIPS_PER_PT))
    }

    #[inline]
    pub fn from_pt_f64(pt: f64) -> Self {
        Self((pt * TWIPS_PER_PT as f64).round() as i32)
    }

    #[inline]
    pub const fn from_inches(inches: i32) -> Self {
        Self(inches.saturating_mul(TWIPS_PER_INCH))
    }

    #[inline]
    pub fn from_inches_f64(inches: f64) -> Self {
        Self((inches * TWIPS_PER_INCH as f64).round() as i32)
    }

    /// Line spacing expressed as a multiple of single spacing (240 = single).
    #[inline]
    pub fn from_line_multiple(multiple: f64) -> Self {
        Self((multiple * 240.0).round() as i32)
    }

    #[inline]
    pub const fn to_emu(self) -> Emu {
        Emu(self.0 as i64 * EMUS_PER_TWIP)
    }
}

impl fmt::Display for Twips {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// English Metric Units, 914400 per inch.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Emu(pub i64);

impl Emu {
    /// Pixels at 96 DPI.
    #[inline]
    pub const fn from_px(px: i64) -> Self {
        Self(px.saturating_mul(EMUS_PER_PX))
    }

    #[inline]
    pub const fn from_inches(inches: i64) -> Self {
        Self(inches.saturating_mul(EMUS_PER_INCH))
    }

    #[inline]
    pub fn from_inches_f64(inches: f64) -> Self {
        Self((inches * EMUS_PER_INCH as f64).round() as i64)
    }

    #[inline]
    pub const fn from_cm(cm: i64) -> Self {
        Self(cm.saturating_mul(EMUS_PER_CM))
    }

    #[inline]
    pub fn from_cm_f64(cm: f64) -> Self {
        Self((cm * EMUS_PER_CM as f64).round() as i64)
    }

    #[inline]
    pub const fn from_mm(mm: i64) -> Self {
        Self(mm.saturating_mul(EMUS_PER_MM))
    }

    #[inline]
    pub const fn from_pt(pt: i64) -> Self {
        Self(pt.saturating_mul(EMUS_PER_PT))
    }

    /// Whole pixels at 96 DPI, rounding down.
    #[inline]
    pub const fn to_px(self) -> i64 {
        self.0 / EMUS_PER_PX
    }

    #[inline]
    pub fn to_inches_f64(self) -> f64 {
        self.0 as f64 / EMUS_PER_INCH as f64
    }
}

impl fmt::Display for Emu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_constants() {
        assert_eq!(Emu::from_px(1), Emu(9525));
        assert_eq!(Emu::from_inches(1), Emu(914_400));
        assert_eq!(Emu::from_cm(1), Emu(360_000));
        assert_eq!(Emu::from_px(96), Emu::from_inches(1));
        assert_eq!(Twips::from_pt(12), Twips(240));
        assert_eq!(HalfPoints::from_pt(11), HalfPoints(22));
    }

    #[test]
    fn test_fractional_inputs_round_once() {
        assert_eq!(HalfPoints::from_pt_f64(10.5), HalfPoints(21));
        assert_eq!(Twips::from_line_multiple(1.5), Twips(360));
        assert_eq!(Emu::from_inches_f64(0.5), Emu(457_200));
        assert_eq!(Emu::from_cm_f64(2.54), Emu::from_inches(1));
    }

    #[test]
    fn test_twips_to_emu() {
        assert_eq!(Twips::from_inches(1).to_emu(), Emu::from_inches(1));
    }

    #[test]
    fn test_repeated_conversion_is_stable() {
        let mut size = HalfPoints::from_pt_f64(13.5);
        for _ in 0..100 {
            size = HalfPoints::from_pt_f64(size.to_pt_f64());
        }
        assert_eq!(size, HalfPoints(27));
    }
}
