use std::borrow::Cow;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Instant;

use image::codecs::jpeg::JpegEncoder;
use image::io::Reader as ImageReader;
use image::{imageops, ColorType, DynamicImage, RgbImage};
use log::{debug, info};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;

use crate::descriptor::{files_path, PyramidDescriptor, SourceFormat};
use crate::error::{DeepZoomError, Result};
use crate::Config;

/// Counts reported by a finished run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EmitSummary {
    pub levels: u32,
    pub tiles: usize,
}

/// Cuts one source raster into a Deep Zoom pyramid.
pub struct ImageCreator {
    descriptor: PyramidDescriptor,
    image: RgbImage,
    config: Config,
}

/// Maps a 0.0..=1.0 quality linearly onto the JPEG encoder's 0..=100 scale.
///
/// Rounds to the nearest step instead of truncating, so `0.29` gives 29
/// rather than the 28 that `0.29 * 100.0` truncates to. The encoder itself
/// treats 0 as 1.
pub fn jpeg_quality(quality: f32) -> u8 {
    (quality.clamp(0.0, 1.0) * 100.0).round() as u8
}

/// Decodes `path` with the decoder of the declared format.
pub fn load_image(path: &Path, format: SourceFormat) -> Result<DynamicImage> {
    let mut reader = ImageReader::open(path).map_err(|e| DeepZoomError::fs(path, e))?;
    reader.set_format(format.image_format());
    reader.decode().map_err(|source| DeepZoomError::Decode { path: path.to_path_buf(), source })
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| DeepZoomError::fs(path, e))
}

impl ImageCreator {
    pub fn new(image: RgbImage, config: Config) -> Result<Self> {
        config.validate()?;
        let (width, height) = image.dimensions();
        let descriptor = PyramidDescriptor::new(width, height, config.tile_size, config.overlap, config.format)?;
        Ok(Self { descriptor, image, config })
    }

    /// Loads the source file and builds a creator for it. Alpha is dropped.
    ///
    /// The config is checked before decoding so a bad config never pays for
    /// reading the source.
    pub fn open(source: &Path, config: Config) -> Result<Self> {
        config.validate()?;
        let image = load_image(source, config.format)?;
        Self::new(image.to_rgb8(), config)
    }

    pub fn descriptor(&self) -> &PyramidDescriptor {
        &self.descriptor
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn source(&self) -> &RgbImage {
        &self.image
    }

    /// Raster of `level`. The full-resolution level borrows the source;
    /// every other level is resampled from it with the configured filter.
    pub fn level_image(&self, level: u32) -> Result<Cow<'_, RgbImage>> {
        let (width, height) = self.descriptor.dimensions(level)?;
        if (width, height) == self.image.dimensions() {
            return Ok(Cow::Borrowed(&self.image));
        }
        let filter = self.config.resize_filter.filter_type();
        Ok(Cow::Owned(imageops::resize(&self.image, width, height, filter)))
    }

    /// Crops one tile out of an already resampled level raster.
    pub fn tile_image(&self, level_image: &RgbImage, level: u32, column: u32, row: u32) -> Result<RgbImage> {
        let bounds = self.descriptor.tile_bounds(level, column, row)?;
        Ok(imageops::crop_imm(level_image, bounds.x, bounds.y, bounds.width, bounds.height).to_image())
    }

    fn write_tile(&self, level_image: &RgbImage, files_dir: &Path, level: u32, column: u32, row: u32) -> Result<()> {
        let tile = self.tile_image(level_image, level, column, row)?;
        let path = self.descriptor.tile_path(files_dir, level, column, row);
        let file = File::create(&path).map_err(|e| DeepZoomError::fs(&path, e))?;
        let mut writer = BufWriter::new(file);
        JpegEncoder::new_with_quality(&mut writer, jpeg_quality(self.config.quality))
            .encode(tile.as_raw(), tile.width(), tile.height(), ColorType::Rgb8)
            .map_err(|source| DeepZoomError::Encode { path: path.clone(), source })?;
        writer.flush().map_err(|e| DeepZoomError::fs(&path, e))
    }

    /// Writes every tile of every level below `<destination stem>_files/`,
    /// then the descriptor itself to `destination`.
    ///
    /// The first failing tile aborts the run. Tiles written before it are
    /// left on disk and no descriptor is written.
    pub fn create(&self, destination: &Path) -> Result<EmitSummary> {
        let start = Instant::now();
        let files_dir = files_path(destination);
        create_dir(&files_dir)?;

        let pool = ThreadPoolBuilder::new().num_threads(self.config.threads).build()?;
        info!(
            "Pyramid: {}x{} source, {} levels, tile_size={}, overlap={}, filter={}, threads={}",
            self.descriptor.width(),
            self.descriptor.height(),
            self.descriptor.num_levels(),
            self.descriptor.tile_size(),
            self.descriptor.overlap(),
            self.config.resize_filter.name(),
            pool.current_num_threads(),
        );

        let mut tiles = 0usize;
        for level in 0..self.descriptor.num_levels() {
            create_dir(&files_dir.join(level.to_string()))?;
            let level_image = self.level_image(level)?;
            let coords = self.descriptor.tiles(level)?;
            pool.install(|| {
                coords
                    .par_iter()
                    .try_for_each(|&(column, row)| self.write_tile(&level_image, &files_dir, level, column, row))
            })?;
            debug!("Level {}: {}x{} px, {} tiles", level, level_image.width(), level_image.height(), coords.len());
            tiles += coords.len();
        }

        self.descriptor.save(destination)?;
        info!("Wrote {} tiles and {} in {:.3}s", tiles, destination.display(), start.elapsed().as_secs_f64());
        Ok(EmitSummary { levels: self.descriptor.num_levels(), tiles })
    }
}
