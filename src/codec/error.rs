//! Error types for the codec layer.
//!
//! Malformed frames never reach this module: the decoder drops them and
//! keeps reading. What remains are failures that make the byte stream itself
//! untrustworthy, such as a peer that never terminates a frame.
//!
//! - [`FramingError`]: Wire-level issues in frame structure.
//! - [`CodecError`]: Top-level enum wrapping framing and I/O errors.

use std::io;

use thiserror::Error;

/// Framing-level errors occurring during frame boundary detection.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FramingError {
    /// Buffered or declared frame size exceeds the configured maximum.
    #[error("frame exceeds max length: {size} > {max}")]
    OversizedFrame {
        /// Bytes buffered or declared by `content-length`.
        size: usize,
        /// Maximum allowed frame size.
        max: usize,
    },

    /// Frame could not be encoded because its command is empty.
    #[error("frame has an empty command")]
    EmptyCommand,
}

/// Top-level codec error taxonomy.
///
/// # Examples
///
/// ```
/// use stompframe::codec::{CodecError, FramingError};
///
/// let err = CodecError::Framing(FramingError::OversizedFrame {
///     size: 2000,
///     max: 1024,
/// });
/// assert_eq!(err.error_type(), "framing");
/// let io_err: std::io::Error = err.into();
/// assert_eq!(io_err.kind(), std::io::ErrorKind::InvalidData);
/// ```
#[derive(Debug, Error)]
pub enum CodecError {
    /// Framing layer error.
    #[error("framing error: {0}")]
    Framing(#[from] FramingError),

    /// Transport layer I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl CodecError {
    /// Returns the error category as a string for logging and metrics.
    ///
    /// One of `"framing"` or `"io"`.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Framing(_) => "framing",
            Self::Io(_) => "io",
        }
    }
}

impl From<CodecError> for io::Error {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Io(e) => e,
            CodecError::Framing(e) => io::Error::new(io::ErrorKind::InvalidData, e),
        }
    }
}
