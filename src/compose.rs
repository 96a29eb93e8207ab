//! Pixel work: resampling the photo and compositing tiles onto the sheet.

use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage};

use crate::color::Rgba8;
use crate::grid::LayoutPlan;
use crate::units::Size;

/// Resample `photo` to exactly `size` with a Lanczos3 filter.
pub fn resize_tile(photo: &DynamicImage, size: Size) -> RgbImage {
    photo
        .resize_exact(size.width, size.height, FilterType::Lanczos3)
        .to_rgb8()
}

/// Allocate the canvas, fill it with `background` and copy `tile` to every
/// placement in `plan`.
///
/// Tiles replace the pixels under them. Placements that run off the canvas
/// are cut to the overlapping region; nothing else is checked here.
pub fn composite(plan: &LayoutPlan, background: Rgba8, tile: &RgbImage) -> RgbImage {
    let mut canvas = RgbImage::from_pixel(
        plan.canvas.width,
        plan.canvas.height,
        Rgb([background.r, background.g, background.b]),
    );
    for placement in plan.placements() {
        imageops::replace(&mut canvas, tile, placement.x, placement.y);
    }
    canvas
}
