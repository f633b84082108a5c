use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{DeepZoomError, Result};

const DZI_NAMESPACE: &str = "http://schemas.microsoft.com/deepzoom/2008";

/// Raster formats accepted as input. The tile file extension and the
/// descriptor's `Format` attribute follow the source format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SourceFormat {
    #[default]
    Jpg,
    Png,
}

impl SourceFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpg => "jpg",
            Self::Png => "png",
        }
    }

    pub fn image_format(self) -> image::ImageFormat {
        match self {
            Self::Jpg => image::ImageFormat::Jpeg,
            Self::Png => image::ImageFormat::Png,
        }
    }
}

impl FromStr for SourceFormat {
    type Err = DeepZoomError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            // an empty format means the default, same as the CLI
            "" | "jpg" | "jpeg" => Ok(Self::Jpg),
            "png" => Ok(Self::Png),
            _ => Err(DeepZoomError::InvalidFormat(s.to_string())),
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Pixel rectangle of one tile inside its level raster.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TileRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl TileRect {
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }
}

/// The persisted form of a descriptor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DescriptorRecord {
    pub format: SourceFormat,
    pub overlap: u32,
    pub tile_size: u32,
    pub width: u32,
    pub height: u32,
}

impl DescriptorRecord {
    pub fn to_xml(&self) -> String {
        format!(
            r#"<?xml version="1.0" ?><Image Format="{format}" Overlap="{overlap}" TileSize="{tile_size}" xmlns="{DZI_NAMESPACE}"><Size Height="{height}" Width="{width}"/></Image>"#,
            format = self.format,
            overlap = self.overlap,
            tile_size = self.tile_size,
            height = self.height,
            width = self.width,
        )
    }
}

/// Geometry of a Deep Zoom pyramid.
///
/// Level 0 is the coarsest level (one or two pixels on its long side) and
/// `num_levels() - 1` is the full source resolution. Every level halves the
/// one above it, rounding up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PyramidDescriptor {
    format: SourceFormat,
    overlap: u32,
    tile_size: u32,
    width: u32,
    height: u32,
    num_levels: u32,
}

impl PyramidDescriptor {
    pub fn new(width: u32, height: u32, tile_size: u32, overlap: u32, format: SourceFormat) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(DeepZoomError::InvalidConfig(format!("image dimensions must be positive, got {}x{}", width, height)));
        }
        if tile_size == 0 {
            return Err(DeepZoomError::InvalidConfig("tile size must be positive".to_string()));
        }
        if overlap >= tile_size {
            return Err(DeepZoomError::InvalidConfig(format!("overlap {} must be smaller than tile size {}", overlap, tile_size)));
        }
        // floor(log2(max)) + 1 is the bit length of max
        let max_dimension = width.max(height);
        let num_levels = u32::BITS - max_dimension.leading_zeros();
        Ok(Self { format, overlap, tile_size, width, height, num_levels })
    }

    pub fn format(&self) -> SourceFormat {
        self.format
    }

    pub fn overlap(&self) -> u32 {
        self.overlap
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn num_levels(&self) -> u32 {
        self.num_levels
    }

    pub fn max_level(&self) -> u32 {
        self.num_levels - 1
    }

    fn check_level(&self, level: u32) -> Result<()> {
        if level >= self.num_levels {
            return Err(DeepZoomError::InvalidLevel { level, num_levels: self.num_levels });
        }
        Ok(())
    }

    /// Scale of `level` relative to the source, a power of two no larger than 1.
    pub fn scale(&self, level: u32) -> Result<f64> {
        self.check_level(level)?;
        Ok(0.5f64.powi((self.max_level() - level) as i32))
    }

    /// Pixel dimensions of `level`, `ceil(size * scale)` on each axis.
    pub fn dimensions(&self, level: u32) -> Result<(u32, u32)> {
        self.check_level(level)?;
        // dividing by the power of two keeps the top level exact
        let divisor = 1u64 << (self.max_level() - level);
        let width = (self.width as u64).div_ceil(divisor) as u32;
        let height = (self.height as u64).div_ceil(divisor) as u32;
        Ok((width, height))
    }

    /// Number of tiles as (columns, rows).
    pub fn tile_count(&self, level: u32) -> Result<(u32, u32)> {
        let (width, height) = self.dimensions(level)?;
        Ok((width.div_ceil(self.tile_size), height.div_ceil(self.tile_size)))
    }

    /// Bounds of tile (`column`, `row`) in the level raster, overlap included.
    ///
    /// A tile grows by `overlap` towards every neighbouring tile and is then
    /// clipped at the level's right and bottom edges.
    pub fn tile_bounds(&self, level: u32, column: u32, row: u32) -> Result<TileRect> {
        let (columns, rows) = self.tile_count(level)?;
        if column >= columns || row >= rows {
            return Err(DeepZoomError::InvalidTileCoordinate { level, column, row, columns, rows });
        }
        let (level_width, level_height) = self.dimensions(level)?;
        let (x, width) = self.axis_span(column, level_width);
        let (y, height) = self.axis_span(row, level_height);
        Ok(TileRect { x, y, width, height })
    }

    fn axis_span(&self, index: u32, extent: u32) -> (u32, u32) {
        // overlap < tile_size, so a leading overlap never reaches past the level origin
        let (lead, sides) = if index == 0 { (0, 1) } else { (self.overlap, 2) };
        let start = index as u64 * self.tile_size as u64 - lead as u64;
        let span = (self.tile_size as u64 + sides * self.overlap as u64).min(extent as u64 - start);
        (start as u32, span as u32)
    }

    /// Every (column, row) pair of `level`, column-major.
    pub fn tiles(&self, level: u32) -> Result<Vec<(u32, u32)>> {
        let (columns, rows) = self.tile_count(level)?;
        Ok((0..columns).flat_map(|c| (0..rows).map(move |r| (c, r))).collect())
    }

    pub fn serialize(&self) -> DescriptorRecord {
        DescriptorRecord {
            format: self.format,
            overlap: self.overlap,
            tile_size: self.tile_size,
            width: self.width,
            height: self.height,
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, self.serialize().to_xml()).map_err(|e| DeepZoomError::fs(path, e))
    }

    /// Output path of one tile below the `_files` directory.
    pub fn tile_path(&self, files_dir: &Path, level: u32, column: u32, row: u32) -> PathBuf {
        files_dir.join(level.to_string()).join(format!("{}_{}.{}", column, row, self.format.extension()))
    }
}

/// Tile directory for a descriptor path: `out/image.dzi` becomes `out/image_files`.
pub fn files_path(destination: &Path) -> PathBuf {
    let stem = destination.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    destination.with_file_name(format!("{}_files", stem))
}
