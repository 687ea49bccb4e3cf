pub mod error;
pub mod image;
pub mod matrix;
pub mod raster;
pub mod sink;

use std::path::Path;

use crate::error::QrPngError;
use crate::matrix::{EcLevel, ModuleMatrix};
use crate::sink::PngFile;

/// Largest image side accepted by the PNG header.
pub const MAX_IMAGE_SIDE: u32 = (1 << 31) - 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RasterParams {
    /// Pixels per module side, at least 1
    pub scale: u32,
    /// Quiet zone in modules on every side
    pub margin: u32,
}

impl RasterParams {
    pub const DEFAULT_SCALE: u32 = 10;
    pub const DEFAULT_MARGIN: u32 = 4;

    pub fn new(scale: u32, margin: u32) -> Self {
        Self {
            scale: scale.max(1),
            margin,
        }
    }

    /// Raises values below the floors (scale 1, margin 0) to the floor.
    pub fn clamped(scale: i64, margin: i64) -> Self {
        Self {
            scale: scale.clamp(1, u32::MAX as i64) as u32,
            margin: margin.clamp(0, u32::MAX as i64) as u32,
        }
    }

    /// Pixel side of the image for a matrix `width` modules wide.
    pub fn image_side(&self, width: usize) -> Result<u32, QrPngError> {
        let width = u32::try_from(width).map_err(|_| QrPngError::ImageTooLarge)?;

        let side = self
            .margin
            .checked_mul(2)
            .and_then(|margin| margin.checked_add(width))
            .and_then(|modules| modules.checked_mul(self.scale))
            .ok_or(QrPngError::ImageTooLarge)?;

        if side > MAX_IMAGE_SIDE {
            return Err(QrPngError::ImageTooLarge);
        }

        Ok(side)
    }
}

impl Default for RasterParams {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SCALE, Self::DEFAULT_MARGIN)
    }
}

/// Encodes `data` and writes it to `path` as a grayscale PNG. Returns the image side.
///
/// Nothing is created on disk when encoding fails or the image would be too large.
pub fn write_png(
    data: impl AsRef<[u8]>,
    path: impl AsRef<Path>,
    ec_level: EcLevel,
    params: RasterParams,
) -> Result<u32, QrPngError> {
    let matrix = ModuleMatrix::encode(data, ec_level)?;
    let side = params.image_side(matrix.width())?;

    let sink = PngFile::create(path)?;
    raster::rasterize(&matrix, params, sink)?;

    Ok(side)
}
