//! Physical (millimetre) and raster (pixel) dimensions.
//!
//! Conversion is a separate step that produces a new value. The physical
//! request is never rewritten in place, so a size can't be converted twice
//! by accident: the planner only accepts [`PixelDimensions`].
//!
//! ```
//! use photosheet::units::{PhysicalSize, mm_to_px};
//!
//! assert_eq!(mm_to_px(300.0, 25.4), 300.0);
//!
//! let paper = PhysicalSize::new(127.0, 89.0).to_pixels(300.0);
//! assert_eq!(paper.width, 1500.0);
//! assert_eq!(paper.truncate().height, 1051);
//! ```

use core::fmt;

use num_traits::Float;

/// Millimetres in one inch.
pub const MM_PER_INCH: f64 = 25.4;

/// Convert a length in millimetres to pixels at `dpi`.
///
/// `px = dpi * mm / 25.4`. The result is fractional; truncate it only when
/// allocating a raster. Callers validate `dpi > 0`.
pub fn mm_to_px(dpi: f64, mm: f64) -> f64 {
    (dpi * mm) / MM_PER_INCH
}

/// Width × height in whole pixels.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Size {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Size {
    /// Create a new size.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Whether either side is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Physical width × height in millimetres.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PhysicalSize {
    pub width_mm: f64,
    pub height_mm: f64,
}

impl PhysicalSize {
    pub const fn new(width_mm: f64, height_mm: f64) -> Self {
        Self {
            width_mm,
            height_mm,
        }
    }

    /// Convert both sides to pixels at `dpi`.
    pub fn to_pixels(self, dpi: f64) -> PixelDimensions {
        PixelDimensions {
            width: mm_to_px(dpi, self.width_mm),
            height: mm_to_px(dpi, self.height_mm),
        }
    }

    /// Whether both sides are finite and strictly positive.
    pub fn is_valid(&self) -> bool {
        is_positive(self.width_mm) && is_positive(self.height_mm)
    }
}

/// Width × height in (possibly fractional) pixels.
///
/// Planning happens in this space; [`truncate`](Self::truncate) produces the
/// integer counts used to allocate rasters.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PixelDimensions {
    pub width: f64,
    pub height: f64,
}

impl PixelDimensions {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// The same dimensions with width and height exchanged.
    pub fn swapped(self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }

    /// Truncate toward zero to whole pixels. Negative and NaN sides become 0.
    pub fn truncate(self) -> Size {
        Size::new(to_whole(self.width), to_whole(self.height))
    }

    /// Whether both sides are at least as large as `other`'s.
    pub fn covers(&self, other: &Self) -> bool {
        self.width >= other.width && self.height >= other.height
    }
}

impl From<Size> for PixelDimensions {
    fn from(size: Size) -> Self {
        Self::new(size.width as f64, size.height as f64)
    }
}

pub(crate) fn is_positive(v: f64) -> bool {
    v.is_finite() && v > 0.0
}

// `as` saturates: NaN → 0, negatives → 0, overflow → u32::MAX.
fn to_whole(v: f64) -> u32 {
    Float::trunc(v) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── mm_to_px ────────────────────────────────────────────────────────

    #[test]
    fn one_inch_is_dpi_pixels() {
        assert_eq!(mm_to_px(300.0, 25.4), 300.0);
        assert_eq!(mm_to_px(72.0, 25.4), 72.0);
    }

    #[test]
    fn zero_length_is_zero_pixels() {
        for dpi in [1.0, 72.0, 300.0, 1200.0] {
            assert_eq!(mm_to_px(dpi, 0.0), 0.0);
        }
    }

    #[test]
    fn fractional_result_is_kept() {
        // 89mm at 300dpi = 1051.18…px
        let px = mm_to_px(300.0, 89.0);
        assert!(px > 1051.0 && px < 1052.0, "{px}");
    }

    // ── PhysicalSize ────────────────────────────────────────────────────

    #[test]
    fn conversion_leaves_physical_size_untouched() {
        let paper = PhysicalSize::new(127.0, 89.0);
        let first = paper.to_pixels(300.0);
        let second = paper.to_pixels(300.0);
        assert_eq!(first, second);
        assert_eq!(paper, PhysicalSize::new(127.0, 89.0));
    }

    #[test]
    fn physical_validity() {
        assert!(PhysicalSize::new(25.0, 35.0).is_valid());
        assert!(!PhysicalSize::new(0.0, 35.0).is_valid());
        assert!(!PhysicalSize::new(25.0, -1.0).is_valid());
        assert!(!PhysicalSize::new(f64::NAN, 35.0).is_valid());
        assert!(!PhysicalSize::new(25.0, f64::INFINITY).is_valid());
    }

    // ── PixelDimensions ─────────────────────────────────────────────────

    #[test]
    fn truncate_rounds_toward_zero() {
        let d = PixelDimensions::new(1051.9, 295.27);
        assert_eq!(d.truncate(), Size::new(1051, 295));
    }

    #[test]
    fn truncate_saturates_bad_values() {
        assert_eq!(PixelDimensions::new(-3.5, f64::NAN).truncate(), Size::new(0, 0));
    }

    #[test]
    fn swapped_exchanges_axes() {
        let d = PixelDimensions::new(1500.0, 1051.5);
        assert_eq!(d.swapped(), PixelDimensions::new(1051.5, 1500.0));
        assert_eq!(d.swapped().swapped(), d);
    }

    #[test]
    fn covers_requires_both_axes() {
        let paper = PixelDimensions::new(100.0, 50.0);
        assert!(PixelDimensions::new(100.0, 60.0).covers(&paper));
        assert!(!PixelDimensions::new(120.0, 40.0).covers(&paper));
    }

    #[test]
    fn size_display() {
        assert_eq!(Size::new(1051, 1500).to_string(), "1051x1500");
    }

    #[test]
    fn size_is_empty() {
        assert!(Size::new(0, 10).is_empty());
        assert!(!Size::new(1, 1).is_empty());
    }
}
