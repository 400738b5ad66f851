//! Error types for the grpc-web codec layer.
//!
//! Every variant is terminal for the parser that produced it. A
//! [`FrameParser`](super::FrameParser) stores the first error it reports and
//! hands back a clone of it on every later call, so the type is `Clone` and
//! comparable.

use std::io;

use thiserror::Error;

/// Failure to turn a grpc-web byte stream into frames.
///
/// Positions are absolute offsets into the stream the parser has seen,
/// counted across every chunk rather than per call.
///
/// # Examples
///
/// ```
/// use grpcweb::codec::{FrameParser, ParseError};
///
/// let mut parser = FrameParser::new();
/// let err = parser.parse(&[0x01, 0x00]).unwrap_err();
/// assert_eq!(err, ParseError::InvalidTag { tag: 0x01, position: 0 });
/// ```
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The leading byte of a frame was neither `0x00` nor `0x80`.
    #[error("invalid frame tag {tag:#04x} at stream position {position}")]
    InvalidTag {
        /// Offending tag byte.
        tag: u8,
        /// Absolute position of the tag byte.
        position: u64,
    },

    /// A length prefix declared a payload above the configured limit.
    #[error("frame length {length} exceeds limit {max} at stream position {position}")]
    FrameTooLarge {
        /// Declared payload length.
        length: u32,
        /// Configured maximum payload length.
        max: u32,
        /// Absolute position of the last length byte.
        position: u64,
    },

    /// `grpc-web-text` input was not valid base64.
    #[error("invalid base64 at text position {position}: {reason}")]
    InvalidBase64 {
        /// Offset of the first undecodable character group.
        position: u64,
        /// Decoder diagnostic.
        reason: String,
    },

    /// A fully buffered body ended in the middle of a frame.
    #[error("stream ended inside a frame at position {position}")]
    Truncated {
        /// Total number of bytes consumed.
        position: u64,
    },
}

/// Outgoing payload is too long for the 32-bit length prefix.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("payload of {length} bytes does not fit a 32-bit frame length")]
pub struct PayloadTooLarge {
    /// Length of the rejected payload.
    pub length: usize,
}

impl ParseError {
    /// Returns the error category as a string for logging and metrics.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::InvalidTag { .. } => "invalid_tag",
            Self::FrameTooLarge { .. } => "frame_too_large",
            Self::InvalidBase64 { .. } => "invalid_base64",
            Self::Truncated { .. } => "truncated",
        }
    }
}

impl From<ParseError> for io::Error {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::Truncated { .. } => io::Error::new(io::ErrorKind::UnexpectedEof, err),
            _ => io::Error::new(io::ErrorKind::InvalidData, err),
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
