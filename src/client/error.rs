//! Error types for starting grpc-web calls.
//!
//! Once a call has started, failures are reported through the stream's
//! `error` callback as a [`Status`](crate::status::Status) instead.

use crate::{codec::PayloadTooLarge, transport::TransportError};

/// Boxed error returned by message serializers and deserializers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors emitted by [`GrpcWebClient`](super::GrpcWebClient) before a call
/// is under way.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Failed to serialize the request message.
    #[error("failed to serialize request")]
    Serialize(#[source] BoxError),
    /// The serialized request does not fit a grpc-web frame.
    #[error(transparent)]
    PayloadTooLarge(#[from] PayloadTooLarge),
    /// The transport refused to start the request.
    #[error("failed to start request: {0}")]
    Transport(#[from] TransportError),
}
