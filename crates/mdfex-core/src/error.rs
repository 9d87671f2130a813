//! Error types for the mdfex-core library.

use thiserror::Error;

/// Main error type for the mdfex library.
#[derive(Error, Debug)]
pub enum MdfexError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Persistence error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,
}

/// Errors related to record persistence.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The backing store rejected the operation.
    #[error("database error: {0}")]
    Database(String),

    /// The store schema could not be prepared.
    #[error("schema error: {0}")]
    Schema(String),
}

/// Result type for the mdfex library.
pub type Result<T> = std::result::Result<T, MdfexError>;
