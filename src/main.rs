// CLI entry for deepzoom
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueHint};
use deepzoom::{default_config, process, Config, Params, ResizeFilter, SourceFormat};
use log::info;

#[derive(Parser, Debug)]
#[command(
    name = "deepzoom",
    version,
    disable_version_flag = true,
    about = "Generate Deep Zoom (DZI) tile pyramids",
    after_help = "Example: deepzoom -s photos/test.jpg -d out/test.dzi"
)]
struct Cli {
    /// Source image file path
    #[arg(short = 's', long = "source", value_hint = ValueHint::FilePath)]
    source: PathBuf,

    /// Destination of the .dzi descriptor; tiles go to <name>_files/
    #[arg(short = 'd', long = "destination", value_hint = ValueHint::FilePath)]
    destination: PathBuf,

    /// Source image format, jpg or png
    #[arg(short = 'f', long = "format", default_value = "jpg")]
    format: String,

    /// Tile size in pixels
    #[arg(short = 't', long = "tile-size", default_value_t = 256)]
    tile_size: u32,

    /// Tile overlap in pixels
    #[arg(short = 'l', long = "overlap", default_value_t = 0)]
    overlap: u32,

    /// Output image quality (0.0 - 1.0)
    #[arg(short = 'q', long = "quality", default_value_t = 0.8)]
    quality: f32,

    /// Resampling filter: nearest, bilinear, bicubic or lanczos
    #[arg(short = 'r', long = "resize-filter", default_value = "nearest")]
    resize_filter: String,

    /// Number of threads (defaults to the number of CPUs)
    #[arg(short = 'j', long = "threads")]
    threads: Option<usize>,

    /// Print version
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    version: (),
}

fn build_config(cli: &Cli) -> Result<Config> {
    let mut cfg = default_config();
    cfg.format = cli.format.parse::<SourceFormat>()?;
    cfg.tile_size = cli.tile_size;
    cfg.overlap = cli.overlap;
    cfg.quality = cli.quality;
    cfg.resize_filter = ResizeFilter::from_name(&cli.resize_filter);
    if let Some(v) = cli.threads { cfg.threads = v; }
    cfg.validate()?;
    Ok(cfg)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let config = build_config(&cli)?;
    let params = Params {
        source: cli.source.clone(),
        destination: cli.destination.clone(),
        config,
    };
    let summary = process(params)
        .with_context(|| format!("failed to build pyramid for {}", cli.source.display()))?;
    info!("Successfully executed: {} levels, {} tiles", summary.levels, summary.tiles);
    Ok(())
}
