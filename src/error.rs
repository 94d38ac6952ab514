//! Error types for encoding and decoding.

use std::path::PathBuf;

use thiserror::Error;

/// Error variants for Huffman compression.
#[derive(Debug, Error)]
pub enum HuffmanError {
    /// The source held zero bytes, so there is nothing to build a tree from.
    #[error("input is empty")]
    EmptyInput,

    /// Opening, reading or writing a file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// One of the three header lines could not be parsed.
    #[error("malformed header: {0}")]
    MalformedHeader(String),

    /// The serialized tree on the second header line is not well formed.
    #[error("malformed tree at byte {offset}: {reason}")]
    MalformedTree { offset: usize, reason: &'static str },

    /// The payload ended in the middle of a code.
    #[error("payload ends in the middle of a code")]
    TruncatedPayload,

    /// The name line would be empty or contain a newline.
    #[error("invalid source name for the container header")]
    InvalidName,

    /// Overwriting was disabled and the destination already exists.
    #[error("output already exists: {}", .0.display())]
    OutputExists(PathBuf),

    /// A byte seen while packing had no code; the source changed between passes.
    #[error("byte {0:#04x} has no code; was the input modified during compression?")]
    MissingCode(u8),
}

/// A specialized Result type for Huffman operations.
pub type Result<T> = std::result::Result<T, HuffmanError>;
