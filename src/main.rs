use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use photosheet::grid::RotationPolicy;
use photosheet::sheet::{DEFAULT_JPEG_QUALITY, LayoutRequest, SheetOptions, layout_with};
use photosheet::units::PhysicalSize;

#[derive(Parser)]
#[command(name = "photosheet")]
#[command(about = "Lay out copies of a photo on a sheet of photo paper, ready to print")]
struct Cli {
    /// Photo file
    #[arg(short, long)]
    file: PathBuf,

    /// Photo paper width (mm)
    #[arg(short = 'W', long)]
    ppwidth: f64,

    /// Photo paper height (mm)
    #[arg(short = 'H', long)]
    ppheight: f64,

    /// Photo width (mm)
    #[arg(long)]
    pw: f64,

    /// Photo height (mm)
    #[arg(long)]
    ph: f64,

    /// Background color (#RGB or #RRGGBB)
    #[arg(short, long)]
    color: String,

    /// Print resolution (dots per inch)
    #[arg(short, long)]
    dpi: f64,

    /// How to decide whether to turn the paper
    #[arg(long, value_enum, default_value_t = Rotation::Proxy)]
    rotation: Rotation,

    /// Fail instead of writing a sheet where the photo doesn't fit
    #[arg(long)]
    strict: bool,

    /// JPEG quality
    #[arg(long, default_value_t = DEFAULT_JPEG_QUALITY, value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: u8,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Rotation {
    /// Compare continuous yield estimates
    Proxy,
    /// Compare whole tile counts
    TileCount,
}

impl From<Rotation> for RotationPolicy {
    fn from(rotation: Rotation) -> Self {
        match rotation {
            Rotation::Proxy => RotationPolicy::YieldProxy,
            Rotation::TileCount => RotationPolicy::TileCount,
        }
    }
}

impl Cli {
    fn into_parts(self) -> (LayoutRequest, SheetOptions) {
        let request = LayoutRequest::new(
            self.file,
            PhysicalSize::new(self.ppwidth, self.ppheight),
            PhysicalSize::new(self.pw, self.ph),
            self.dpi,
            self.color,
        );
        let options = SheetOptions::default()
            .rotation(self.rotation.into())
            .strict(self.strict)
            .quality(self.quality);
        (request, options)
    }
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "photosheet=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    let (request, options) = Cli::parse().into_parts();
    match run(&request, &options) {
        Ok(output) => {
            println!("success, save to: {}", output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(request: &LayoutRequest, options: &SheetOptions) -> anyhow::Result<PathBuf> {
    let outcome = layout_with(request, options)?;
    if let Some(why) = outcome.feasibility.into_result().err() {
        eprintln!("warning: {why}");
    }
    Ok(outcome.output)
}
