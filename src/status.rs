//! gRPC status codes and the terminal status of a call.
//!
//! A [`Status`] is built from the trailer frame's header block, from
//! trailers-only response headers, or synthesised from a transport failure
//! when no trailer arrived.

use std::fmt;

use thiserror::Error;

use crate::metadata::Metadata;

/// Trailer key holding the numeric status code.
pub const GRPC_STATUS: &str = "grpc-status";

/// Trailer key holding the human-readable status message.
pub const GRPC_MESSAGE: &str = "grpc-message";

/// gRPC status codes (<https://grpc.github.io/grpc/core/md_doc_statuscodes.html>).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StatusCode {
    Ok = 0,
    Cancelled = 1,
    Unknown = 2,
    InvalidArgument = 3,
    DeadlineExceeded = 4,
    NotFound = 5,
    AlreadyExists = 6,
    PermissionDenied = 7,
    ResourceExhausted = 8,
    FailedPrecondition = 9,
    Aborted = 10,
    OutOfRange = 11,
    Unimplemented = 12,
    Internal = 13,
    Unavailable = 14,
    DataLoss = 15,
    Unauthenticated = 16,
}

impl StatusCode {
    /// Map a numeric code, treating anything outside `0..=16` as `Unknown`.
    #[must_use]
    pub fn from_i32(value: i32) -> Self {
        match value {
            0 => Self::Ok,
            1 => Self::Cancelled,
            2 => Self::Unknown,
            3 => Self::InvalidArgument,
            4 => Self::DeadlineExceeded,
            5 => Self::NotFound,
            6 => Self::AlreadyExists,
            7 => Self::PermissionDenied,
            8 => Self::ResourceExhausted,
            9 => Self::FailedPrecondition,
            10 => Self::Aborted,
            11 => Self::OutOfRange,
            12 => Self::Unimplemented,
            13 => Self::Internal,
            14 => Self::Unavailable,
            15 => Self::DataLoss,
            16 => Self::Unauthenticated,
            _ => Self::Unknown,
        }
    }

    /// Numeric wire value.
    #[must_use]
    pub const fn as_i32(self) -> i32 { self as i32 }

    /// Derive a status code from an HTTP response status.
    ///
    /// # Examples
    ///
    /// ```
    /// use grpcweb::status::StatusCode;
    ///
    /// assert_eq!(StatusCode::from_http_status(404), StatusCode::NotFound);
    /// assert_eq!(StatusCode::from_http_status(418), StatusCode::Unknown);
    /// ```
    #[must_use]
    pub fn from_http_status(status: u16) -> Self {
        match status {
            200 => Self::Ok,
            400 => Self::InvalidArgument,
            401 => Self::Unauthenticated,
            403 => Self::PermissionDenied,
            404 => Self::NotFound,
            409 => Self::Aborted,
            412 => Self::FailedPrecondition,
            429 => Self::ResourceExhausted,
            499 => Self::Cancelled,
            501 => Self::Unimplemented,
            503 => Self::Unavailable,
            504 => Self::DeadlineExceeded,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ok => "OK",
            Self::Cancelled => "CANCELLED",
            Self::Unknown => "UNKNOWN",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::DeadlineExceeded => "DEADLINE_EXCEEDED",
            Self::NotFound => "NOT_FOUND",
            Self::AlreadyExists => "ALREADY_EXISTS",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::ResourceExhausted => "RESOURCE_EXHAUSTED",
            Self::FailedPrecondition => "FAILED_PRECONDITION",
            Self::Aborted => "ABORTED",
            Self::OutOfRange => "OUT_OF_RANGE",
            Self::Unimplemented => "UNIMPLEMENTED",
            Self::Internal => "INTERNAL",
            Self::Unavailable => "UNAVAILABLE",
            Self::DataLoss => "DATA_LOSS",
            Self::Unauthenticated => "UNAUTHENTICATED",
        };
        f.write_str(name)
    }
}

/// Terminal outcome of a call.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{code}: {details}")]
pub struct Status {
    /// Status code.
    pub code: StatusCode,
    /// Human-readable details; empty when the server sent none.
    pub details: String,
    /// Trailing metadata other than the status keys.
    pub metadata: Option<Metadata>,
}

impl Status {
    /// Build a status without metadata.
    #[must_use]
    pub fn new(code: StatusCode, details: impl Into<String>) -> Self {
        Self {
            code,
            details: details.into(),
            metadata: None,
        }
    }

    /// Attach trailing metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Whether the call succeeded.
    #[must_use]
    pub fn is_ok(&self) -> bool { self.code == StatusCode::Ok }

    /// Build a status from a parsed trailer block.
    ///
    /// A missing `grpc-status` means OK; an unparsable one means UNKNOWN. A
    /// missing `grpc-message` leaves `details` empty. Remaining entries become
    /// the status metadata.
    ///
    /// # Examples
    ///
    /// ```
    /// use grpcweb::{
    ///     metadata::parse_header_block,
    ///     status::{Status, StatusCode},
    /// };
    ///
    /// let status = Status::from_trailers(parse_header_block(b"grpc-status:10\r\n"));
    /// assert_eq!(status.code, StatusCode::Aborted);
    /// assert_eq!(status.details, "");
    /// ```
    #[must_use]
    pub fn from_trailers(mut trailers: Metadata) -> Self {
        let code = trailers
            .remove(GRPC_STATUS)
            .map_or(StatusCode::Ok, |raw| parse_code(&raw));
        let details = trailers.remove(GRPC_MESSAGE).unwrap_or_default();
        Self {
            code,
            details,
            metadata: (!trailers.is_empty()).then_some(trailers),
        }
    }

    /// Build a status from response headers of a trailers-only response.
    ///
    /// Returns `None` unless the headers carry `grpc-status`.
    #[must_use]
    pub fn from_headers(headers: &Metadata) -> Option<Self> {
        headers.contains_key(GRPC_STATUS).then(|| {
            let code = headers.get(GRPC_STATUS).map_or(StatusCode::Ok, parse_code);
            let details = headers.get(GRPC_MESSAGE).unwrap_or_default().to_owned();
            Self::new(code, details)
        })
    }
}

fn parse_code(raw: &str) -> StatusCode {
    raw.trim()
        .parse::<i32>()
        .map_or(StatusCode::Unknown, StatusCode::from_i32)
}
