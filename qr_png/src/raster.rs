use log::{debug, trace};

use crate::error::QrPngError;
use crate::matrix::ModuleMatrix;
use crate::RasterParams;

pub const DARK: u8 = 0;
pub const LIGHT: u8 = 255;

/// Destination that has not seen a header yet.
///
/// Declaring the header consumes the sink, so rows can only be written after
/// it and the header can only be declared once.
pub trait RasterSink {
    type Rows: RowWriter;

    /// Declares an 8-bit single-channel image of `width` x `height` pixels.
    fn declare_header(self, width: u32, height: u32) -> Result<Self::Rows, QrPngError>;
}

/// Destination accepting pixel rows, top to bottom.
pub trait RowWriter {
    type Output;

    fn write_row(&mut self, row: &[u8]) -> Result<(), QrPngError>;

    fn finalize(self) -> Result<Self::Output, QrPngError>;
}

/// Streams `matrix` into `sink`, magnified by `params.scale` and surrounded by
/// `params.margin` light modules.
///
/// Only one pixel row is buffered at a time. The first sink error aborts the run.
pub fn rasterize<S: RasterSink>(
    matrix: &ModuleMatrix,
    params: RasterParams,
    sink: S,
) -> Result<<S::Rows as RowWriter>::Output, QrPngError> {
    let side = params.image_side(matrix.width())?;
    let scale = params.scale as usize;
    // cannot overflow, it is a part of `side`
    let border = (params.margin * params.scale) as usize;

    debug!(
        "rasterizing {}x{} modules at scale {} with margin {} into {}x{} pixels",
        matrix.width(),
        matrix.width(),
        params.scale,
        params.margin,
        side,
        side
    );

    let mut rows = sink.declare_header(side, side)?;
    let mut row = vec![LIGHT; side as usize];

    for _ in 0..border {
        rows.write_row(&row)?;
    }
    trace!("wrote {} top border rows", border);

    for y in 0..matrix.width() {
        fill_module_row(&mut row, matrix, y, border, scale);

        for _ in 0..scale {
            rows.write_row(&row)?;
        }
    }
    trace!("wrote {} module rows", matrix.width() * scale);

    row.fill(LIGHT);
    for _ in 0..border {
        rows.write_row(&row)?;
    }
    trace!("wrote {} bottom border rows", border);

    rows.finalize()
}

fn fill_module_row(row: &mut [u8], matrix: &ModuleMatrix, y: usize, border: usize, scale: usize) {
    let (left, rest) = row.split_at_mut(border);
    let (modules, right) = rest.split_at_mut(matrix.width() * scale);

    left.fill(LIGHT);
    for (x, block) in modules.chunks_exact_mut(scale).enumerate() {
        block.fill(if matrix.is_dark(x, y) { DARK } else { LIGHT });
    }
    right.fill(LIGHT);
}
