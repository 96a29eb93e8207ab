//! Grid planning: how many copies of a photo fit on a container, in which
//! orientation, and where each copy goes.
//!
//! Planning runs in two phases because the resampler may not hit the
//! requested tile size exactly:
//!
//! 1. [`GridPlanner::plan`] clamps oversize photos, picks the container
//!    orientation and floor-divides each axis. Everything is in fractional
//!    pixels.
//! 2. [`GridFit::with_tile`] takes the size of the tile that was actually
//!    produced and spreads the leftover space into `n + 1` equal gaps per
//!    axis.
//!
//! ```
//! use photosheet::grid::{GridPlanner, RotationPolicy};
//! use photosheet::units::{PixelDimensions, Size};
//!
//! let fit = GridPlanner::new()
//!     .rotation_policy(RotationPolicy::TileCount)
//!     .plan(PixelDimensions::new(1000.0, 450.0), PixelDimensions::new(300.0, 100.0))
//!     .unwrap();
//! assert_eq!((fit.columns, fit.rows), (3, 4));
//!
//! let plan = fit.with_tile(Size::new(300, 100));
//! assert_eq!((plan.gap_x, plan.gap_y), (25, 10));
//! assert_eq!(plan.offset(1, 0), (350, 10));
//! ```
//!
//! Infeasible requests (photo larger than the container on one axis, or a
//! resampled tile that no longer fits) are not corrected. The plan reports
//! them through [`LayoutPlan::feasibility`] and the caller decides.

use num_traits::Float;

use crate::orientation::Orientation;
use crate::units::{PixelDimensions, Size, is_positive};

/// How the planner decides whether to rotate the container.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum RotationPolicy {
    /// Compare `(cw/ph)·(ch/pw)` against `(cw/pw)·(ch/ph)` and rotate when
    /// the first is strictly greater.
    ///
    /// The two products are equal in exact arithmetic, so the outcome is
    /// decided by floating-point rounding. Evaluated exactly as written;
    /// reordering the operations changes which sheets rotate.
    #[default]
    YieldProxy,
    /// Compare the floor-divided tile counts of both orientations and rotate
    /// only when rotation places strictly more tiles.
    TileCount,
}

impl RotationPolicy {
    fn should_rotate(self, container: PixelDimensions, photo: PixelDimensions) -> bool {
        let (cw, ch) = (container.width, container.height);
        let (pw, ph) = (photo.width, photo.height);
        match self {
            Self::YieldProxy => (cw / ph) * (ch / pw) > (cw / pw) * (ch / ph),
            Self::TileCount => {
                let as_given = fit_count(cw, pw) as u64 * fit_count(ch, ph) as u64;
                let rotated = fit_count(ch, pw) as u64 * fit_count(cw, ph) as u64;
                rotated > as_given
            }
        }
    }
}

/// Planning error: dimensions the grid arithmetic cannot divide by.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PlanError {
    /// Container width or height is zero, negative, NaN or infinite.
    #[error("container dimensions must be finite and greater than zero")]
    InvalidContainer,
    /// Photo width or height is zero, negative, NaN or infinite.
    #[error("photo dimensions must be finite and greater than zero")]
    InvalidPhoto,
}

/// Computes [`GridFit`]s. Cheap to build; holds only the rotation policy.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GridPlanner {
    pub rotation: RotationPolicy,
}

impl GridPlanner {
    /// Planner with the default [`RotationPolicy::YieldProxy`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the rotation policy.
    pub fn rotation_policy(mut self, policy: RotationPolicy) -> Self {
        self.rotation = policy;
        self
    }

    /// Clamp, orient and fit `photo` onto `container`. Both are in pixels.
    pub fn plan(
        &self,
        container: PixelDimensions,
        photo: PixelDimensions,
    ) -> Result<GridFit, PlanError> {
        if !(is_positive(container.width) && is_positive(container.height)) {
            return Err(PlanError::InvalidContainer);
        }
        if !(is_positive(photo.width) && is_positive(photo.height)) {
            return Err(PlanError::InvalidPhoto);
        }

        // Step 1: a photo at least as large as the container on both axes
        // becomes the container.
        let clamped = photo.covers(&container);
        let photo = if clamped { container } else { photo };

        // Step 2: orientation. Skipped for a clamped photo, which already
        // fills the sheet.
        let orientation = if clamped {
            Orientation::AsGiven
        } else {
            Orientation::from_rotated(self.rotation.should_rotate(container, photo))
        };
        let container = orientation.apply(container);

        // Step 3: floor-divide each axis.
        let columns = fit_count(container.width, photo.width);
        let rows = fit_count(container.height, photo.height);

        Ok(GridFit {
            container,
            photo,
            orientation,
            clamped,
            columns,
            rows,
        })
    }
}

/// Plan with the default rotation policy.
pub fn plan(container: PixelDimensions, photo: PixelDimensions) -> Result<GridFit, PlanError> {
    GridPlanner::new().plan(container, photo)
}

/// Result of the first planning phase.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GridFit {
    /// Container after the orientation decision.
    pub container: PixelDimensions,
    /// Photo after the oversize clamp.
    pub photo: PixelDimensions,
    pub orientation: Orientation,
    /// Whether the photo was clamped down to the container.
    pub clamped: bool,
    pub columns: u32,
    pub rows: u32,
}

impl GridFit {
    /// Whole-pixel canvas to allocate.
    pub fn canvas_size(&self) -> Size {
        self.container.truncate()
    }

    /// Whole-pixel size to resample the photo to.
    pub fn tile_size(&self) -> Size {
        self.photo.truncate()
    }

    pub fn tile_count(&self) -> u64 {
        self.columns as u64 * self.rows as u64
    }

    /// Second phase: compute gaps for the tile the resampler produced.
    ///
    /// `gap = floor((container - tile·n) / (n + 1))` per axis, against the
    /// fractional container. Gaps go negative when `tile` is larger than
    /// this fit assumed.
    pub fn with_tile(&self, tile: Size) -> LayoutPlan {
        LayoutPlan {
            canvas: self.canvas_size(),
            tile,
            columns: self.columns,
            rows: self.rows,
            gap_x: gap(self.container.width, tile.width, self.columns),
            gap_y: gap(self.container.height, tile.height, self.rows),
            orientation: self.orientation,
        }
    }
}

/// Final grid: canvas size, tile size, counts and gaps in whole pixels.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct LayoutPlan {
    pub canvas: Size,
    pub tile: Size,
    pub columns: u32,
    pub rows: u32,
    /// Horizontal space before, between and after tiles.
    pub gap_x: i64,
    /// Vertical space before, between and after tiles.
    pub gap_y: i64,
    pub orientation: Orientation,
}

/// Where one tile lands on the canvas. Offsets may be negative or past the
/// canvas edge for infeasible plans.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Placement {
    pub column: u32,
    pub row: u32,
    pub x: i64,
    pub y: i64,
}

impl LayoutPlan {
    /// Top-left corner of the tile at `(column, row)`.
    pub fn offset(&self, column: u32, row: u32) -> (i64, i64) {
        let x = column as i64 * (self.tile.width as i64 + self.gap_x) + self.gap_x;
        let y = row as i64 * (self.tile.height as i64 + self.gap_y) + self.gap_y;
        (x, y)
    }

    /// Every tile position, column by column.
    pub fn placements(&self) -> impl Iterator<Item = Placement> + '_ {
        (0..self.columns).flat_map(move |column| {
            (0..self.rows).map(move |row| {
                let (x, y) = self.offset(column, row);
                Placement { column, row, x, y }
            })
        })
    }

    pub fn tile_count(&self) -> u64 {
        self.columns as u64 * self.rows as u64
    }

    /// Whether this plan produces a sheet with every tile in bounds.
    pub fn feasibility(&self) -> Feasibility {
        if self.columns == 0 || self.rows == 0 {
            Feasibility::Infeasible(Infeasibility::EmptyGrid {
                columns: self.columns,
                rows: self.rows,
            })
        } else if self.gap_x < 0 || self.gap_y < 0 {
            Feasibility::Infeasible(Infeasibility::NegativeGap {
                gap_x: self.gap_x,
                gap_y: self.gap_y,
            })
        } else {
            Feasibility::Feasible
        }
    }
}

/// Outcome of [`LayoutPlan::feasibility`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Feasibility {
    Feasible,
    /// The plan is still usable, but the sheet will be empty or have
    /// overlapping or clipped tiles.
    Infeasible(Infeasibility),
}

impl Feasibility {
    pub fn is_feasible(&self) -> bool {
        matches!(self, Self::Feasible)
    }

    pub fn into_result(self) -> Result<(), Infeasibility> {
        match self {
            Self::Feasible => Ok(()),
            Self::Infeasible(why) => Err(why),
        }
    }
}

/// Why a plan can't produce a clean sheet.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
pub enum Infeasibility {
    /// The photo doesn't fit even once along at least one axis.
    #[error("photo does not fit on the container ({columns}x{rows} grid)")]
    EmptyGrid { columns: u32, rows: u32 },
    /// The tiles need more room than the container has.
    #[error("tiles overlap or overflow the container (gaps {gap_x}x{gap_y} px)")]
    NegativeGap { gap_x: i64, gap_y: i64 },
}

// ============================================================================
// Internal arithmetic
// ============================================================================

/// `floor(space / tile)` as a count. Saturates at `u32::MAX`.
fn fit_count(space: f64, tile: f64) -> u32 {
    Float::floor(space / tile) as u32
}

fn gap(space: f64, tile: u32, count: u32) -> i64 {
    let used = tile as f64 * count as f64;
    Float::floor((space - used) / (count as f64 + 1.0)) as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::mm_to_px;

    fn px(w: f64, h: f64) -> PixelDimensions {
        PixelDimensions::new(w, h)
    }

    fn mm(dpi: f64, w: f64, h: f64) -> PixelDimensions {
        px(mm_to_px(dpi, w), mm_to_px(dpi, h))
    }

    // ── validation ──────────────────────────────────────────────────────

    #[test]
    fn zero_photo_rejected() {
        assert_eq!(
            plan(px(100.0, 100.0), px(0.0, 10.0)),
            Err(PlanError::InvalidPhoto)
        );
        assert_eq!(
            plan(px(100.0, 100.0), px(10.0, f64::NAN)),
            Err(PlanError::InvalidPhoto)
        );
    }

    #[test]
    fn bad_container_rejected() {
        assert_eq!(
            plan(px(0.0, 100.0), px(10.0, 10.0)),
            Err(PlanError::InvalidContainer)
        );
        assert_eq!(
            plan(px(f64::INFINITY, 100.0), px(10.0, 10.0)),
            Err(PlanError::InvalidContainer)
        );
    }

    // ── oversize clamp ──────────────────────────────────────────────────

    #[test]
    fn oversize_photo_clamps_to_container() {
        let fit = plan(px(1500.0, 1051.0), px(2000.0, 3000.0)).unwrap();
        assert!(fit.clamped);
        assert_eq!(fit.photo, px(1500.0, 1051.0));
        assert_eq!((fit.columns, fit.rows), (1, 1));
        assert_eq!(fit.tile_size(), fit.canvas_size());
    }

    #[test]
    fn equal_photo_counts_as_oversize() {
        let fit = plan(px(100.0, 50.0), px(100.0, 50.0)).unwrap();
        assert!(fit.clamped);
        assert_eq!((fit.columns, fit.rows), (1, 1));
    }

    #[test]
    fn clamp_never_rotates() {
        // (299/287)·(287/299) rounds above 1.0, which would turn the
        // sheet and leave a 0-wide grid.
        let fit = plan(px(299.0, 287.0), px(400.0, 400.0)).unwrap();
        assert_eq!(fit.orientation, Orientation::AsGiven);
        assert_eq!((fit.columns, fit.rows), (1, 1));
    }

    #[test]
    fn oversize_on_one_axis_only_is_not_clamped() {
        let fit = plan(px(100.0, 100.0), px(150.0, 50.0)).unwrap();
        assert!(!fit.clamped);
        assert_eq!((fit.columns, fit.rows), (0, 2));
    }

    // ── rotation ────────────────────────────────────────────────────────

    #[test]
    fn yield_proxy_follows_float_rounding() {
        // 25×35mm on 127×89mm at 300dpi: the proxy products differ only
        // in the last bit, and the rotated one wins.
        let fit = plan(mm(300.0, 127.0, 89.0), mm(300.0, 25.0, 35.0)).unwrap();
        assert_eq!(fit.orientation, Orientation::Rotated);
        assert_eq!(fit.canvas_size(), Size::new(1051, 1500));
        assert_eq!((fit.columns, fit.rows), (3, 3));
    }

    #[test]
    fn yield_proxy_keeps_orientation_on_exact_tie() {
        let fit = plan(px(1000.0, 450.0), px(300.0, 100.0)).unwrap();
        assert_eq!(fit.orientation, Orientation::AsGiven);
        assert_eq!((fit.columns, fit.rows), (3, 4));
    }

    #[test]
    fn tile_count_prefers_more_tiles() {
        // As given: 10×1 = 10. Rotated: 4×3 = 12.
        let planner = GridPlanner::new().rotation_policy(RotationPolicy::TileCount);
        let fit = planner.plan(px(1000.0, 450.0), px(100.0, 300.0)).unwrap();
        assert_eq!(fit.orientation, Orientation::Rotated);
        assert_eq!(fit.container, px(450.0, 1000.0));
        assert_eq!((fit.columns, fit.rows), (4, 3));
    }

    #[test]
    fn tile_count_tie_keeps_orientation() {
        // 4×2 either way.
        let planner = GridPlanner::new().rotation_policy(RotationPolicy::TileCount);
        let fit = planner.plan(px(200.0, 100.0), px(50.0, 50.0)).unwrap();
        assert_eq!(fit.orientation, Orientation::AsGiven);
        assert_eq!((fit.columns, fit.rows), (4, 2));
    }

    #[test]
    fn tile_count_on_reference_sheet() {
        let planner = GridPlanner::new().rotation_policy(RotationPolicy::TileCount);
        let fit = planner
            .plan(mm(300.0, 127.0, 89.0), mm(300.0, 25.0, 35.0))
            .unwrap();
        assert_eq!(fit.orientation, Orientation::AsGiven);
        assert_eq!((fit.columns, fit.rows), (5, 2));
    }

    // ── gaps ────────────────────────────────────────────────────────────

    #[test]
    fn gaps_fill_container() {
        let fit = plan(px(1000.0, 450.0), px(300.0, 100.0)).unwrap();
        let p = fit.with_tile(fit.tile_size());
        assert_eq!(p.canvas, Size::new(1000, 450));
        assert_eq!((p.gap_x, p.gap_y), (25, 10));
        assert_eq!(p.gap_x * 4 + 300 * 3, 1000);
        assert_eq!(p.gap_y * 5 + 100 * 4, 450);
        assert!(p.feasibility().is_feasible());
    }

    #[test]
    fn gaps_are_floored() {
        let fit = plan(mm(300.0, 127.0, 89.0), mm(300.0, 25.0, 35.0)).unwrap();
        let p = fit.with_tile(Size::new(295, 413));
        // (1051.18 - 885) / 4 = 41.5, (1500 - 1239) / 4 = 65.25
        assert_eq!((p.gap_x, p.gap_y), (41, 65));
    }

    #[test]
    fn larger_resampled_tile_gives_negative_gap() {
        let fit = plan(px(1000.0, 450.0), px(300.0, 100.0)).unwrap();
        let p = fit.with_tile(Size::new(340, 100));
        assert_eq!(p.gap_x, -5);
        assert_eq!(
            p.feasibility(),
            Feasibility::Infeasible(Infeasibility::NegativeGap {
                gap_x: -5,
                gap_y: 10
            })
        );
    }

    #[test]
    fn negative_fractional_gap_rounds_down() {
        // (1000 - 3·338) / 4 = -3.5: floor gives -4, not -3.
        let fit = plan(px(1000.0, 450.0), px(300.0, 100.0)).unwrap();
        let p = fit.with_tile(Size::new(338, 100));
        assert_eq!(p.gap_x, -4);
    }

    #[test]
    fn empty_grid_is_reported_not_fixed() {
        let fit = plan(px(100.0, 100.0), px(150.0, 50.0)).unwrap();
        let p = fit.with_tile(Size::new(150, 50));
        assert_eq!(p.gap_x, 100);
        assert_eq!(p.placements().count(), 0);
        assert_eq!(
            p.feasibility().into_result(),
            Err(Infeasibility::EmptyGrid {
                columns: 0,
                rows: 2
            })
        );
    }

    // ── placements ──────────────────────────────────────────────────────

    #[test]
    fn offsets_step_by_tile_plus_gap() {
        let fit = plan(px(1000.0, 450.0), px(300.0, 100.0)).unwrap();
        let p = fit.with_tile(Size::new(300, 100));
        assert_eq!(p.offset(0, 0), (25, 10));
        assert_eq!(p.offset(2, 3), (675, 340));
        // Last tile ends exactly one gap before the edge.
        assert_eq!(p.offset(2, 3).0 + 300 + p.gap_x, 1000);
    }

    #[test]
    fn placements_are_column_major() {
        let fit = plan(px(200.0, 100.0), px(50.0, 50.0)).unwrap();
        let p = fit.with_tile(Size::new(50, 50));
        let order: Vec<(u32, u32)> = p.placements().map(|pl| (pl.column, pl.row)).collect();
        assert_eq!(order[..3], [(0, 0), (0, 1), (1, 0)]);
        assert_eq!(order.len() as u64, p.tile_count());
    }

    #[test]
    fn infeasibility_messages() {
        assert_eq!(
            Infeasibility::EmptyGrid {
                columns: 0,
                rows: 2
            }
            .to_string(),
            "photo does not fit on the container (0x2 grid)"
        );
    }
}
