//! Print-ready contact sheets: many copies of one photo on one sheet of
//! paper.
//!
//! Given paper and print sizes in millimetres and a resolution, the crate
//! works out how many copies fit, whether turning the paper fits more,
//! spaces the grid evenly and composites the copies onto a solid
//! background.
//!
//! The geometry is pure and `no_std` compatible. Pixel work and file I/O
//! live behind the `render` feature.
//!
//! # Modules
//!
//! - [`units`]: millimetre ↔ pixel conversion, size types
//! - [`color`]: `#RGB` / `#RRGGBB` background colors
//! - [`orientation`]: container orientation
//! - [`grid`]: clamp, rotation decision, grid fit, gaps, feasibility
//! - `compose`: resampling and compositing (`render`)
//! - `sheet`: the full request → JPEG pipeline (`render`)

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

pub mod color;
pub mod grid;
pub mod orientation;
pub mod units;

#[cfg(feature = "render")]
pub mod compose;
#[cfg(feature = "render")]
pub mod sheet;

pub use color::{ColorError, Rgba8, parse_color};
pub use grid::{
    Feasibility, GridFit, GridPlanner, Infeasibility, LayoutPlan, PlanError, Placement,
    RotationPolicy, plan,
};
pub use orientation::Orientation;
pub use units::{PhysicalSize, PixelDimensions, Size, mm_to_px};

#[cfg(feature = "render")]
pub use sheet::{
    LayoutRequest, RenderedSheet, SheetError, SheetOptions, SheetOutcome, layout, layout_with,
    output_path, render_sheet,
};
