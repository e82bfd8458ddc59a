//! Error types for the PDF tools MCP server.

use thiserror::Error;

/// Errors that can occur while serving a PDF tool call.
#[derive(Debug, Error)]
pub enum PdfToolsError {
    /// Input path does not exist or cannot be read.
    #[error("PDF not found: {path}")]
    NotFound { path: String },

    /// File exists but MuPDF could not parse it as a PDF.
    #[error("Invalid PDF document {path}: {reason}")]
    InvalidDocument { path: String, reason: String },

    /// Document is encrypted.
    #[error("Password required for {path}")]
    PasswordRequired { path: String },

    /// Page index, page list or rectangle out of bounds.
    #[error("Invalid range: {0}")]
    InvalidRange(String),

    /// Non-positive or oversized scale factor.
    #[error("Invalid scale {scale}: {reason}")]
    InvalidScale { scale: f32, reason: String },

    /// Pages differ in size when a common rectangle was requested.
    #[error(
        "Inconsistent page size: page {page} is {}x{} but page 0 is {}x{}",
        found.0, found.1, expected.0, expected.1
    )]
    InconsistentPageSize {
        page: i32,
        expected: (f32, f32),
        found: (f32, f32),
    },

    /// Output file could not be created or written.
    #[error("Failed to write {path}: {source}")]
    IoWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// MuPDF library error.
    #[error("MuPDF error: {0}")]
    Engine(#[from] mupdf::Error),

    /// PNG encoding or pixel buffer error.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PdfToolsError {
    /// Create an invalid range error with a message.
    pub fn invalid_range(msg: impl Into<String>) -> Self {
        Self::InvalidRange(msg.into())
    }
}

/// Result type for PDF tool operations.
pub type Result<T> = std::result::Result<T, PdfToolsError>;
