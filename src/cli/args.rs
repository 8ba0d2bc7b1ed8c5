use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use siftile::InputFormat;

#[derive(Parser)]
#[command(name = "siftile", version, about = "SIF tile averaging CLI")]
pub struct CliArgs {
    /// Enable logging (RUST_LOG overrides the default debug level)
    #[arg(long, default_value_t = false, global = true)]
    pub log: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Average a single tile and print the outcome as JSON
    Average(AverageArgs),
    /// Average square sub-tiles of a single tile and print the outcomes as JSON
    Subtiles(SubtileArgs),
    /// Build an averaged dataset from a tile metadata CSV
    Build(BuildArgs),
}

#[derive(Args)]
pub struct TileArgs {
    /// Tile file (.npy, or .tif with the gdal feature)
    #[arg(short, long)]
    pub input: PathBuf,

    /// JSON file with build parameters (channel layout, coverage threshold, format);
    /// flags below override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Tile file format [default: auto]
    #[arg(long, value_enum)]
    pub format: Option<InputFormat>,

    /// Minimum summed land-cover fraction; 0 disables the check [default: 0.5]
    #[arg(long)]
    pub min_coverage: Option<f64>,
}

#[derive(Args)]
pub struct AverageArgs {
    #[command(flatten)]
    pub tile: TileArgs,
}

#[derive(Args)]
pub struct SubtileArgs {
    #[command(flatten)]
    pub tile: TileArgs,

    /// Side length of each sub-tile in pixels
    #[arg(long)]
    pub size: usize,
}

#[derive(Args)]
pub struct BuildArgs {
    /// Tile metadata CSV (lon, lat, date, tile_file, SIF[, cloud_fraction, num_soundings])
    #[arg(short, long)]
    pub metadata: PathBuf,

    /// Output dataset CSV
    #[arg(short, long)]
    pub output: PathBuf,

    /// JSON file with build parameters; flags below override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Tile file format
    #[arg(long, value_enum)]
    pub format: Option<InputFormat>,

    /// Minimum summed land-cover fraction; 0 disables the check
    #[arg(long)]
    pub min_coverage: Option<f64>,

    /// Minimum fraction of pixels with valid reflectance
    #[arg(long)]
    pub min_fraction_valid: Option<f64>,

    /// Maximum fraction of pixels missing reflectance
    #[arg(long)]
    pub max_missing: Option<f64>,

    /// Minimum SIF label
    #[arg(long)]
    pub min_sif: Option<f64>,

    /// Minimum number of soundings behind the SIF label
    #[arg(long)]
    pub min_soundings: Option<f64>,

    /// Also write per-column mean/std of the accepted rows to this CSV
    #[arg(long)]
    pub band_stats: Option<PathBuf>,

    /// Also write the accepted rows standardized against the band statistics
    #[arg(long, requires = "band_stats")]
    pub standardized: Option<PathBuf>,

    /// Write the JSON build report to this file
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Abort on the first unreadable tile instead of counting it as rejected
    #[arg(long, default_value_t = false)]
    pub fail_fast: bool,

    /// Average tiles on a single thread
    #[arg(long, default_value_t = false)]
    pub sequential: bool,
}
