use thiserror::Error;

#[derive(Error, Debug)]
pub enum QrPngError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("png error: {0}")]
    Png(#[from] png::EncodingError),
    #[error("qr error: {0}")]
    Qr(#[from] qrcode::types::QrError),
    #[error("nothing to encode")]
    EmptyInput,
    #[error("invalid module matrix")]
    InvalidMatrix,
    #[error("image too large")]
    ImageTooLarge,
    #[error("incomplete image")]
    IncompleteImage,
}

impl QrPngError {
    /// True when no module matrix could be produced, i.e. nothing was written.
    pub fn is_encode_failure(&self) -> bool {
        matches!(
            self,
            QrPngError::Qr(_) | QrPngError::EmptyInput | QrPngError::InvalidMatrix
        )
    }
}
