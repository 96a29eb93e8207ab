//! Container orientation.

use crate::units::{PixelDimensions, Size};

/// How the container is laid out relative to the caller's width × height.
///
/// ```text
///     AsGiven           Rotated
///     ┌─────────┐       ┌─────┐
///     │ W × H   │       │     │
///     └─────────┘       │H × W│
///                       │     │
///                       └─────┘
/// ```
///
/// Rotation is a quarter turn of the sheet. Tiles are never rotated.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Width and height as requested.
    #[default]
    AsGiven,
    /// Width and height exchanged.
    Rotated,
}

impl Orientation {
    /// `Rotated` when `rotate` is true.
    pub fn from_rotated(rotate: bool) -> Self {
        if rotate { Self::Rotated } else { Self::AsGiven }
    }

    /// Whether this orientation swaps width and height.
    pub fn swaps_axes(self) -> bool {
        matches!(self, Self::Rotated)
    }

    /// Apply to fractional pixel dimensions.
    pub fn apply(self, dims: PixelDimensions) -> PixelDimensions {
        if self.swaps_axes() { dims.swapped() } else { dims }
    }

    /// Apply to whole-pixel dimensions.
    pub fn transform_size(self, size: Size) -> Size {
        if self.swaps_axes() {
            Size::new(size.height, size.width)
        } else {
            size
        }
    }
}
