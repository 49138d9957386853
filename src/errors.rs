// ABOUTME: Error types for the banana-slides client
// ABOUTME: Separates local validation, transport and server-reported failures

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SlideshowError {
    /// Rejected locally before any request was issued.
    #[error("{0}")]
    ValidationError(String),

    /// The exchange with the server could not be completed at all.
    #[error("{message}")]
    TransportError {
        message: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("{message}")]
    ApplicationError { status: u16, message: String },

    #[error("Failed to decode server response: {0}")]
    DecodeError(String),

    #[error("Image unavailable: {0}")]
    ImageError(String),

    #[error("File operation failed: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Archive error: {0}")]
    ArchiveError(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Another request is already in progress")]
    Busy,
}

impl SlideshowError {
    /// Wrap a transport failure with the generic message shown to the user.
    pub fn transport(source: reqwest::Error) -> Self {
        SlideshowError::TransportError {
            message: "Failed to reach the slideshow server".to_string(),
            source,
        }
    }
}

impl From<zip::result::ZipError> for SlideshowError {
    fn from(err: zip::result::ZipError) -> Self {
        SlideshowError::ArchiveError(format!("ZIP operation failed: {}", err))
    }
}

impl From<url::ParseError> for SlideshowError {
    fn from(err: url::ParseError) -> Self {
        SlideshowError::ConfigError(format!("Invalid server URL: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, SlideshowError>;
