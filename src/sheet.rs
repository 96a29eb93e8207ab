//! Sheet production: request → plan → resampled tile → composited canvas →
//! JPEG next to the source.
//!
//! ```no_run
//! use photosheet::sheet::{LayoutRequest, layout};
//! use photosheet::units::PhysicalSize;
//!
//! let request = LayoutRequest::new(
//!     "example/James.jpg",
//!     PhysicalSize::new(127.0, 89.0),
//!     PhysicalSize::new(25.0, 35.0),
//!     300.0,
//!     "#000000",
//! );
//! let outcome = layout(&request)?;
//! assert!(outcome.output.ends_with("James_layout.jpeg"));
//! # Ok::<(), photosheet::sheet::SheetError>(())
//! ```

use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageError, ImageReader, RgbImage};
use tracing::{debug, info, warn};

use crate::color::{ColorError, Rgba8, parse_color};
use crate::compose::{composite, resize_tile};
use crate::grid::{
    Feasibility, GridFit, GridPlanner, Infeasibility, LayoutPlan, PlanError, RotationPolicy,
};
use crate::units::{PhysicalSize, Size, is_positive};

/// Appended to the source file name, cut at its first `.`.
pub const OUTPUT_SUFFIX: &str = "_layout.jpeg";

/// Quality used when none is configured.
pub const DEFAULT_JPEG_QUALITY: u8 = 75;

/// Largest canvas or tile side the JPEG encoder accepts.
pub const MAX_RASTER_SIDE: u32 = u16::MAX as u32;

/// Error producing a sheet.
#[derive(Debug, thiserror::Error)]
pub enum SheetError {
    #[error(transparent)]
    InvalidColor(#[from] ColorError),

    #[error("invalid request: {0}")]
    InvalidRequest(&'static str),

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error("sheet too small to rasterize: canvas {canvas} px, tile {tile} px")]
    EmptyRaster { canvas: Size, tile: Size },

    #[error("sheet too large to rasterize: canvas {canvas} px, tile {tile} px, limit 65535 px per side")]
    TooLarge { canvas: Size, tile: Size },

    #[error("cannot open {}: {source}", path.display())]
    SourceOpen { path: PathBuf, source: io::Error },

    #[error("cannot decode {}: {source}", path.display())]
    SourceDecode { path: PathBuf, source: ImageError },

    #[error("cannot create {}: {source}", path.display())]
    OutputCreate { path: PathBuf, source: io::Error },

    #[error("cannot encode {}: {source}", path.display())]
    OutputEncode { path: PathBuf, source: ImageError },

    #[error("infeasible layout: {0}")]
    Infeasible(Infeasibility),
}

/// One photo, one paper size, one resolution.
///
/// Dimensions stay in millimetres; conversion to pixels happens inside
/// [`layout`] and never writes back into the request.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutRequest {
    pub source: PathBuf,
    pub container: PhysicalSize,
    pub photo: PhysicalSize,
    pub dpi: f64,
    /// `#RGB` or `#RRGGBB`.
    pub background: String,
}

impl LayoutRequest {
    pub fn new(
        source: impl Into<PathBuf>,
        container: PhysicalSize,
        photo: PhysicalSize,
        dpi: f64,
        background: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            container,
            photo,
            dpi,
            background: background.into(),
        }
    }

    /// Check that every physical value is finite and greater than zero.
    pub fn validate(&self) -> Result<(), SheetError> {
        if !is_positive(self.dpi) {
            return Err(SheetError::InvalidRequest(
                "dpi must be finite and greater than zero",
            ));
        }
        if !self.container.is_valid() {
            return Err(SheetError::InvalidRequest(
                "container width and height must be finite and greater than zero",
            ));
        }
        if !self.photo.is_valid() {
            return Err(SheetError::InvalidRequest(
                "photo width and height must be finite and greater than zero",
            ));
        }
        Ok(())
    }

    pub fn container(mut self, container: PhysicalSize) -> Self {
        self.container = container;
        self
    }

    pub fn photo(mut self, photo: PhysicalSize) -> Self {
        self.photo = photo;
        self
    }

    pub fn dpi(mut self, dpi: f64) -> Self {
        self.dpi = dpi;
        self
    }

    /// Set the background, `#RGB` or `#RRGGBB`. Parsed when the sheet is
    /// produced.
    pub fn background(mut self, background: impl Into<String>) -> Self {
        self.background = background.into();
        self
    }
}

/// Knobs that don't change what the sheet is, only how it is decided and
/// written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SheetOptions {
    pub rotation: RotationPolicy,
    /// Fail with [`SheetError::Infeasible`] instead of writing an empty or
    /// overlapping sheet.
    pub strict: bool,
    /// JPEG quality, 1–100.
    pub quality: u8,
}

impl Default for SheetOptions {
    fn default() -> Self {
        Self {
            rotation: RotationPolicy::default(),
            strict: false,
            quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl SheetOptions {
    pub fn rotation(mut self, policy: RotationPolicy) -> Self {
        self.rotation = policy;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Set JPEG quality, clamped to 1–100.
    pub fn quality(mut self, quality: u8) -> Self {
        self.quality = quality.clamp(1, 100);
        self
    }
}

/// A composited sheet, still in memory.
#[derive(Clone, Debug)]
pub struct RenderedSheet {
    pub canvas: RgbImage,
    pub plan: LayoutPlan,
    pub feasibility: Feasibility,
}

/// What [`layout`] wrote.
#[derive(Clone, Debug, PartialEq)]
pub struct SheetOutcome {
    pub output: PathBuf,
    pub plan: LayoutPlan,
    pub feasibility: Feasibility,
}

/// Produce the sheet for `request` with default options.
pub fn layout(request: &LayoutRequest) -> Result<SheetOutcome, SheetError> {
    layout_with(request, &SheetOptions::default())
}

/// Produce the sheet for `request` and write it to [`output_path`].
#[tracing::instrument(skip_all, fields(source = %request.source.display()))]
pub fn layout_with(
    request: &LayoutRequest,
    options: &SheetOptions,
) -> Result<SheetOutcome, SheetError> {
    let (background, fit) = prepare(request, options)?;
    let photo = decode_source(&request.source)?;
    let sheet = render_fit(&fit, background, &photo, options)?;

    let output = output_path(&request.source);
    write_jpeg(&sheet.canvas, &output, options.quality)?;
    info!(
        output = %output.display(),
        tiles = sheet.plan.tile_count(),
        "sheet written"
    );

    Ok(SheetOutcome {
        output,
        plan: sheet.plan,
        feasibility: sheet.feasibility,
    })
}

/// Produce the sheet for `request` from an already decoded photo.
///
/// `request.source` is not read.
pub fn render_sheet(
    request: &LayoutRequest,
    options: &SheetOptions,
    photo: &DynamicImage,
) -> Result<RenderedSheet, SheetError> {
    let (background, fit) = prepare(request, options)?;
    render_fit(&fit, background, photo, options)
}

/// Where the sheet for `source` goes: same directory, file name up to its
/// first `.`, then [`OUTPUT_SUFFIX`].
///
/// `photos/James.jpg` → `photos/James_layout.jpeg`,
/// `a.b.jpg` → `a_layout.jpeg`.
pub fn output_path(source: &Path) -> PathBuf {
    let mut name = source
        .file_name()
        .map(before_first_dot)
        .unwrap_or_default()
        .to_os_string();
    name.push(OUTPUT_SUFFIX);
    source.with_file_name(name)
}

// Works on the OsStr so non-UTF-8 names survive unchanged. Stripping the
// last extension until none is left ends at the first dot.
fn before_first_dot(name: &OsStr) -> &OsStr {
    if name.as_encoded_bytes().first() == Some(&b'.') {
        return OsStr::new("");
    }
    let mut stem = name;
    while let Some(shorter) = Path::new(stem).file_stem().filter(|s| s.len() < stem.len()) {
        stem = shorter;
    }
    stem
}

// ============================================================================
// Steps
// ============================================================================

/// Everything that can fail before touching pixels.
fn prepare(
    request: &LayoutRequest,
    options: &SheetOptions,
) -> Result<(Rgba8, GridFit), SheetError> {
    let background = parse_color(&request.background)?;
    request.validate()?;

    let container = request.container.to_pixels(request.dpi);
    let photo = request.photo.to_pixels(request.dpi);
    debug!(?container, ?photo, dpi = request.dpi, "converted to pixels");

    let fit = GridPlanner::new()
        .rotation_policy(options.rotation)
        .plan(container, photo)?;
    debug!(
        orientation = ?fit.orientation,
        clamped = fit.clamped,
        columns = fit.columns,
        rows = fit.rows,
        "grid planned"
    );

    let (canvas, tile) = (fit.canvas_size(), fit.tile_size());
    if canvas.is_empty() || tile.is_empty() {
        return Err(SheetError::EmptyRaster { canvas, tile });
    }
    if !fits_raster(canvas) || !fits_raster(tile) {
        return Err(SheetError::TooLarge { canvas, tile });
    }
    Ok((background, fit))
}

/// Within the encoder's side limit, and the RGB8 buffer length fits `usize`.
fn fits_raster(size: Size) -> bool {
    size.width <= MAX_RASTER_SIDE
        && size.height <= MAX_RASTER_SIDE
        && (size.width as usize)
            .checked_mul(size.height as usize)
            .and_then(|n| n.checked_mul(3))
            .is_some()
}

fn render_fit(
    fit: &GridFit,
    background: Rgba8,
    photo: &DynamicImage,
    options: &SheetOptions,
) -> Result<RenderedSheet, SheetError> {
    let tile = resize_tile(photo, fit.tile_size());
    let plan = fit.with_tile(Size::new(tile.width(), tile.height()));
    debug!(gap_x = plan.gap_x, gap_y = plan.gap_y, tile = %plan.tile, "gaps computed");

    let feasibility = plan.feasibility();
    if let Feasibility::Infeasible(why) = feasibility {
        if options.strict {
            return Err(SheetError::Infeasible(why));
        }
        warn!(%why, "layout is infeasible, composing best-effort sheet");
    }

    let canvas = composite(&plan, background, &tile);
    Ok(RenderedSheet {
        canvas,
        plan,
        feasibility,
    })
}

fn decode_source(path: &Path) -> Result<DynamicImage, SheetError> {
    let open_err = |source| SheetError::SourceOpen {
        path: path.to_path_buf(),
        source,
    };
    let reader = ImageReader::open(path)
        .map_err(open_err)?
        .with_guessed_format()
        .map_err(open_err)?;
    let photo = reader.decode().map_err(|source| SheetError::SourceDecode {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(width = photo.width(), height = photo.height(), "source decoded");
    Ok(photo)
}

/// Encode to a sibling `.part` file, then rename over `output`.
///
/// A failed encode removes the partial file and leaves `output` untouched.
fn write_jpeg(canvas: &RgbImage, output: &Path, quality: u8) -> Result<(), SheetError> {
    let partial = output.with_extension("jpeg.part");
    let result = encode_jpeg(canvas, &partial, output, quality).and_then(|()| {
        fs::rename(&partial, output).map_err(|source| SheetError::OutputCreate {
            path: output.to_path_buf(),
            source,
        })
    });
    if result.is_err() {
        let _ = fs::remove_file(&partial);
    }
    result
}

fn encode_jpeg(
    canvas: &RgbImage,
    partial: &Path,
    output: &Path,
    quality: u8,
) -> Result<(), SheetError> {
    let encode_err = |source| SheetError::OutputEncode {
        path: output.to_path_buf(),
        source,
    };
    let file = File::create(partial).map_err(|source| SheetError::OutputCreate {
        path: output.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    JpegEncoder::new_with_quality(&mut writer, quality)
        .encode_image(canvas)
        .map_err(encode_err)?;
    writer
        .flush()
        .map_err(|e| encode_err(ImageError::IoError(e)))
}
