//! Error types for scidown library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for scidown operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while scraping, downloading or trimming.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when listing directories or reading/writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Transport-level failure while fetching a page.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The table-of-contents page could not be retrieved.
    #[error("Table of contents not found at {url} (status {status})")]
    TocNotFound {
        /// Requested URL
        url: String,
        /// HTTP status code returned by the server
        status: u16,
    },

    /// The download directory does not exist.
    #[error("Download path does not exist: {}", .0.display())]
    DirectoryMissing(PathBuf),

    /// The file format is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// The PDF structure could not be read or written.
    #[error("Malformed PDF: {0}")]
    MalformedPdf(String),

    /// Browser automation failed.
    #[error("Browser error: {0}")]
    Browser(String),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            _ => Error::MalformedPdf(err.to_string()),
        }
    }
}
