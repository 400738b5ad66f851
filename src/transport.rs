//! Capability interface for the HTTP transport underneath a call.
//!
//! grpc-web rides on a browser-style request object: the request is sent in
//! one go, the response body grows as bytes arrive, and completion is
//! signalled separately. [`Transport`] names exactly the operations the
//! response controller needs from such an object. Adapters for a concrete
//! environment implement it; the environment's event loop then calls
//! [`ResponseStream::on_transport_progress`] and
//! [`ResponseStream::on_transport_complete`] as notifications arrive.
//!
//! [`ResponseStream::on_transport_progress`]: crate::client::ResponseStream::on_transport_progress
//! [`ResponseStream::on_transport_complete`]: crate::client::ResponseStream::on_transport_complete

use std::{fmt, io};

use bytes::Bytes;
use thiserror::Error;

use crate::{
    metadata::Metadata,
    status::{Status, StatusCode},
};

/// An outgoing HTTP request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportRequest {
    /// Full request URL.
    pub url: String,
    /// HTTP method; always `POST` for grpc-web.
    pub method: &'static str,
    /// Encoded request body.
    pub body: Bytes,
    /// Request headers.
    pub headers: Metadata,
}

/// A transport refused to start a request.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The adapter rejected the request before sending it.
    #[error("transport rejected request: {0}")]
    Rejected(String),
    /// An I/O error prevented the request from being sent.
    #[error("transport I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Why a transport finished without a usable response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportFailure {
    /// The request was torn down without an error being recorded.
    Cancelled,
    /// The request was explicitly aborted.
    Aborted,
    /// The request timed out.
    Timeout,
    /// The server answered with a non-success HTTP status.
    Http(u16),
    /// Any other network-level failure.
    Network(String),
}

impl TransportFailure {
    /// gRPC status code reported for this failure.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Cancelled => StatusCode::Cancelled,
            Self::Aborted => StatusCode::Aborted,
            Self::Timeout => StatusCode::DeadlineExceeded,
            Self::Http(status) => StatusCode::from_http_status(*status),
            Self::Network(_) => StatusCode::Unavailable,
        }
    }

    /// Synthesise the terminal status for a call that ended with this
    /// failure and no trailer.
    ///
    /// # Examples
    ///
    /// ```
    /// use grpcweb::{status::StatusCode, transport::TransportFailure};
    ///
    /// let status = TransportFailure::Http(401).to_status();
    /// assert_eq!(status.code, StatusCode::Unauthenticated);
    /// ```
    #[must_use]
    pub fn to_status(&self) -> Status { Status::new(self.status_code(), self.to_string()) }
}

impl fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancelled => f.write_str("request cancelled"),
            Self::Aborted => f.write_str("request aborted"),
            Self::Timeout => f.write_str("request timed out"),
            Self::Http(status) => write!(f, "HTTP status {status}"),
            Self::Network(reason) => write!(f, "network error: {reason}"),
        }
    }
}

/// Operations the response controller needs from the HTTP transport.
pub trait Transport {
    /// Start the request.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if the request cannot be started.
    fn send(&mut self, request: TransportRequest) -> Result<(), TransportError>;

    /// Everything received so far. The body only ever grows.
    fn response_body(&self) -> Bytes;

    /// Response headers, empty until they arrive.
    fn response_headers(&self) -> Metadata;

    /// HTTP status, once known.
    fn http_status(&self) -> Option<u16>;

    /// Failure recorded by the transport, if the request did not succeed.
    fn last_failure(&self) -> Option<TransportFailure>;

    /// Abort the request.
    fn abort(&mut self);
}

/// Creates one transport per call.
pub trait TransportFactory {
    /// Transport type produced.
    type Transport: Transport;

    /// Create a fresh transport for a new call.
    fn create(&self) -> Self::Transport;
}

impl<F, T> TransportFactory for F
where
    F: Fn() -> T,
    T: Transport,
{
    type Transport = T;

    fn create(&self) -> T { self() }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::TransportFailure;
    use crate::status::StatusCode;

    #[rstest]
    #[case::cancelled(TransportFailure::Cancelled, StatusCode::Cancelled)]
    #[case::aborted(TransportFailure::Aborted, StatusCode::Aborted)]
    #[case::timeout(TransportFailure::Timeout, StatusCode::DeadlineExceeded)]
    #[case::http_not_found(TransportFailure::Http(404), StatusCode::NotFound)]
    #[case::http_server_error(TransportFailure::Http(500), StatusCode::Unknown)]
    #[case::http_teapot(TransportFailure::Http(418), StatusCode::Unknown)]
    #[case::network(TransportFailure::Network("reset".into()), StatusCode::Unavailable)]
    fn failure_maps_to_status_code(#[case] failure: TransportFailure, #[case] expected: StatusCode) {
        assert_eq!(failure.to_status().code, expected);
    }

    #[test]
    fn failure_status_details_describe_failure() {
        let status = TransportFailure::Network("connection reset".into()).to_status();
        assert_eq!(status.details, "network error: connection reset");
    }
}
