use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::QrPngError;
use crate::raster::{RasterSink, RowWriter};

/// PNG file that has been opened but has no header yet.
pub struct PngFile {
    path: PathBuf,
    fd: File,
}

impl PngFile {
    /// Creates or truncates `path`.
    pub fn create(path: impl AsRef<Path>) -> Result<Self, QrPngError> {
        let path = path.as_ref().to_path_buf();
        let fd = File::create(&path)?;

        Ok(Self { path, fd })
    }
}

impl RasterSink for PngFile {
    type Rows = PngRows;

    fn declare_header(self, width: u32, height: u32) -> Result<PngRows, QrPngError> {
        let mut encoder = png::Encoder::new(self.fd, width, height);
        encoder.set_color(png::ColorType::Grayscale);
        encoder.set_depth(png::BitDepth::Eight);

        let stream = encoder.write_header()?.into_stream_writer()?;
        debug!("{}: wrote header for {}x{} gray8", self.path.display(), width, height);

        Ok(PngRows {
            path: self.path,
            stream,
        })
    }
}

/// Row stream into the PNG encoder. The file closes when this is dropped.
pub struct PngRows {
    path: PathBuf,
    stream: png::StreamWriter<'static, File>,
}

impl RowWriter for PngRows {
    type Output = ();

    fn write_row(&mut self, row: &[u8]) -> Result<(), QrPngError> {
        self.stream.write_all(row)?;
        Ok(())
    }

    fn finalize(self) -> Result<(), QrPngError> {
        self.stream.finish()?;
        debug!("{}: finished", self.path.display());
        Ok(())
    }
}
