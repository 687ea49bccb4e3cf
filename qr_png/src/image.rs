use image::GrayImage;

use crate::error::QrPngError;
use crate::matrix::ModuleMatrix;
use crate::raster::{rasterize, RasterSink, RowWriter};
use crate::RasterParams;

/// Collects the rows into an in-memory [`GrayImage`].
#[derive(Debug, Default)]
pub struct GrayImageSink;

pub struct GrayImageRows {
    width: u32,
    height: u32,
    buf: Vec<u8>,
}

impl RasterSink for GrayImageSink {
    type Rows = GrayImageRows;

    fn declare_header(self, width: u32, height: u32) -> Result<GrayImageRows, QrPngError> {
        let len = (width as usize)
            .checked_mul(height as usize)
            .ok_or(QrPngError::ImageTooLarge)?;

        Ok(GrayImageRows {
            width,
            height,
            buf: Vec::with_capacity(len),
        })
    }
}

impl RowWriter for GrayImageRows {
    type Output = GrayImage;

    fn write_row(&mut self, row: &[u8]) -> Result<(), QrPngError> {
        if row.len() != self.width as usize {
            return Err(QrPngError::IncompleteImage);
        }
        self.buf.extend_from_slice(row);
        Ok(())
    }

    fn finalize(self) -> Result<GrayImage, QrPngError> {
        GrayImage::from_raw(self.width, self.height, self.buf).ok_or(QrPngError::IncompleteImage)
    }
}

/// Renders `matrix` into a buffer instead of a file.
pub fn render_gray_image(
    matrix: &ModuleMatrix,
    params: RasterParams,
) -> Result<GrayImage, QrPngError> {
    rasterize(matrix, params, GrayImageSink)
}
