//! Wire format selection.
//!
//! grpc-web defines a binary and a base64 text encoding of the same frame
//! stream. The JSON variant sends one unframed document each way.

/// Encoding used on the wire for requests and responses.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WireFormat {
    /// `application/grpc-web-text`: base64 of the frame stream.
    #[default]
    Text,
    /// `application/grpc-web`: raw frame bytes.
    Binary,
    /// `application/json`: a single unframed message.
    Json,
}

impl WireFormat {
    /// Value sent in the `Content-Type` and `Accept` headers.
    #[must_use]
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Text => "application/grpc-web-text",
            Self::Binary => "application/grpc-web",
            Self::Json => "application/json",
        }
    }

    /// Whether bodies carry grpc-web frames.
    #[must_use]
    pub const fn is_framed(self) -> bool { !matches!(self, Self::Json) }
}
