use std::fmt;
use std::str::FromStr;

use log::debug;
use qrcode::{Color, QrCode};

use crate::error::QrPngError;

/// Error correction level handed to the encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EcLevel {
    /// ~7% of codewords can be restored
    L,
    /// ~15% of codewords can be restored
    #[default]
    M,
    /// ~25% of codewords can be restored
    Q,
    /// ~30% of codewords can be restored
    H,
}

impl From<EcLevel> for qrcode::EcLevel {
    fn from(level: EcLevel) -> Self {
        match level {
            EcLevel::L => qrcode::EcLevel::L,
            EcLevel::M => qrcode::EcLevel::M,
            EcLevel::Q => qrcode::EcLevel::Q,
            EcLevel::H => qrcode::EcLevel::H,
        }
    }
}

impl FromStr for EcLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "L" => Ok(EcLevel::L),
            "M" => Ok(EcLevel::M),
            "Q" => Ok(EcLevel::Q),
            "H" => Ok(EcLevel::H),
            _ => Err(format!("unknown error correction level `{s}` (expected L, M, Q or H)")),
        }
    }
}

impl fmt::Display for EcLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EcLevel::L => "L",
            EcLevel::M => "M",
            EcLevel::Q => "Q",
            EcLevel::H => "H",
        };
        f.write_str(name)
    }
}

/// Square grid of dark/light modules, stored row-major.
///
/// The storage layout stays private; the rasterizer only goes through
/// [`ModuleMatrix::is_dark`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleMatrix {
    width: usize,
    modules: Vec<bool>,
}

impl ModuleMatrix {
    /// Encodes `data` as-is, letting the encoder pick the smallest version
    /// and the segment modes. The bytes do not have to be UTF-8.
    pub fn encode(data: impl AsRef<[u8]>, ec_level: EcLevel) -> Result<Self, QrPngError> {
        let data = data.as_ref();
        // an empty payload is refused rather than rendered as an empty symbol
        if data.is_empty() {
            return Err(QrPngError::EmptyInput);
        }

        let code = QrCode::with_error_correction_level(data, ec_level.into())?;
        let width = code.width();

        debug!(
            "encoded {} bytes at level {} as {:?} ({}x{} modules)",
            data.len(),
            ec_level,
            code.version(),
            width,
            width
        );

        let modules = code
            .to_colors()
            .into_iter()
            .map(|color| color == Color::Dark)
            .collect();

        Ok(Self { width, modules })
    }

    /// Builds a matrix from `width * width` row-major cells, `true` meaning dark.
    pub fn from_modules(width: usize, modules: Vec<bool>) -> Result<Self, QrPngError> {
        if width == 0 || width.checked_mul(width) != Some(modules.len()) {
            return Err(QrPngError::InvalidMatrix);
        }

        Ok(Self { width, modules })
    }

    /// Side length in modules.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Coordinates outside the grid read as light.
    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        if x >= self.width || y >= self.width {
            return false;
        }
        self.modules[y * self.width + x]
    }
}
