//! Deep Zoom pyramid generation.
//!
//! A source image is resampled once per zoom level and every level is cut
//! into `tile_size` square JPEG tiles, optionally sharing `overlap` pixels
//! with their neighbours. Output follows the DZI layout:
//!
//! ```text
//! image.dzi
//! image_files/<level>/<column>_<row>.<format>
//! ```

use std::path::PathBuf;

use log::info;

mod creator;
mod descriptor;
mod error;
mod filters;

pub use creator::{jpeg_quality, load_image, EmitSummary, ImageCreator};
pub use descriptor::{files_path, DescriptorRecord, PyramidDescriptor, SourceFormat, TileRect};
pub use error::{DeepZoomError, Result};
pub use filters::ResizeFilter;

#[derive(Debug, Clone)]
pub struct Config {
    pub format: SourceFormat,
    pub tile_size: u32,
    pub overlap: u32,
    /// JPEG quality in 0.0..=1.0.
    pub quality: f32,
    pub resize_filter: ResizeFilter,
    /// Worker threads used to encode the tiles of a level.
    pub threads: usize,
}

pub fn default_config() -> Config {
    Config {
        format: SourceFormat::Jpg,
        tile_size: 256,
        overlap: 0,
        quality: 0.8,
        resize_filter: ResizeFilter::Nearest,
        threads: num_cpus::get().max(1),
    }
}

impl Default for Config {
    fn default() -> Self {
        default_config()
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.tile_size == 0 {
            return Err(DeepZoomError::InvalidConfig("tile size must be positive".to_string()));
        }
        if self.overlap >= self.tile_size {
            return Err(DeepZoomError::InvalidConfig(format!("overlap {} must be smaller than tile size {}", self.overlap, self.tile_size)));
        }
        if !(0.0..=1.0).contains(&self.quality) {
            return Err(DeepZoomError::InvalidConfig(format!("quality must be within 0.0..=1.0, got {}", self.quality)));
        }
        if self.threads == 0 {
            return Err(DeepZoomError::InvalidConfig("threads must be at least 1".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct Params {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub config: Config,
}

/// Builds the pyramid for `params.source` and writes it next to `params.destination`.
pub fn process(params: Params) -> Result<EmitSummary> {
    let Params { source, destination, config } = params;
    info!("Starting deepzoom");
    info!("Source image: {} ({})", source.display(), config.format);
    info!("Destination: {}", destination.display());

    let creator = ImageCreator::open(&source, config)?;
    creator.create(&destination)
}
