//! Error types for report deck generation.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while turning a report into a deck.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to read or write a file.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The request body did not have the expected shape.
    #[error("Invalid report payload: {0}")]
    InvalidPayload(String),

    /// The request carried neither `slides` nor legacy `rows`.
    #[error("No data provided. Please send either \"slides\" or \"rows\".")]
    NoData,

    /// A slide declared a type this renderer does not know.
    #[error("Unsupported slide type '{kind}' at index {index}")]
    UnsupportedSlide { index: usize, kind: String },

    /// Fetching a remote asset failed.
    #[error("Fetch error: {0}")]
    FetchError(String),

    /// Image bytes could not be decoded or recognized.
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    /// ZIP archive error (for PPTX).
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML generation or parsing error (for PPTX).
    #[error("XML error: {0}")]
    XmlError(String),
}

impl Error {
    /// Whether the error was caused by the caller's input rather than by
    /// rendering.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidPayload(_) | Error::NoData | Error::UnsupportedSlide { .. }
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::InvalidPayload(e.to_string())
    }
}
