use std::process::ExitCode;

use qr_png::error::QrPngError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Usage(#[from] clap::Error),
    #[error("Failed to generate QR code: {0}")]
    Encode(QrPngError),
    #[error("Failed to save PNG file: {0}")]
    Save(QrPngError),
}

impl From<QrPngError> for CliError {
    fn from(err: QrPngError) -> Self {
        if err.is_encode_failure() {
            CliError::Encode(err)
        } else {
            CliError::Save(err)
        }
    }
}

impl CliError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            // --help and --version come through here too
            CliError::Usage(err) if !err.use_stderr() => ExitCode::SUCCESS,
            _ => ExitCode::FAILURE,
        }
    }
}
