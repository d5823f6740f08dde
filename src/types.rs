use clap::Parser;
use std::path::PathBuf;

/// Carve raster silhouettes into a command stream for a stepper-driven mill
///
/// Each IMAGE is carved one depth step deeper than the previous one.
#[derive(Parser, Debug, Clone, Default, PartialEq, Eq)]
#[command(name = "millpath")]
#[command(author, version, about, long_about = None)]
#[command(long_version = concat!(env!("CARGO_PKG_VERSION"), " (built ", env!("BUILD_DATE"), ")"))]
pub struct RunOptions {
    /// Configuration file (.toml or .json)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Command stream destination, stdout when omitted
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Write a PNG of the grid after every level
    #[arg(short, long, value_name = "DIR")]
    pub snapshot_dir: Option<PathBuf>,

    /// Parse the emitted stream back and check it
    #[arg(long)]
    pub verify: bool,

    /// Target silhouettes, shallowest level first
    #[arg(value_name = "IMAGE", required = true)]
    pub images: Vec<PathBuf>,
}
