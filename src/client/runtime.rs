//! grpc-web client runtime.

use std::time::Instant;

use tracing::Span;

use super::{
    CallOptions,
    ClientConfig,
    ClientError,
    MethodDescriptor,
    ResponseStream,
    request::build_request,
    tracing_helpers::{streaming_span, unary_span},
    unary,
};
use crate::{
    metadata::Metadata,
    status::Status,
    transport::{Transport, TransportFactory},
};

/// Issues grpc-web calls over transports produced by a [`TransportFactory`].
///
/// Use [`GrpcWebClientBuilder`](super::GrpcWebClientBuilder) to change the
/// wire format or other settings.
///
/// Each call gets a fresh transport, frame parser and callback table; calls
/// share nothing but the client's configuration.
///
/// # Examples
///
/// ```
/// use bytes::Bytes;
/// use grpcweb::{
///     client::GrpcWebClient,
///     metadata::Metadata,
///     transport::{Transport, TransportError, TransportFailure, TransportRequest},
/// };
///
/// struct Offline;
///
/// impl Transport for Offline {
///     fn send(&mut self, _request: TransportRequest) -> Result<(), TransportError> {
///         Err(TransportError::Rejected("offline".into()))
///     }
///     fn response_body(&self) -> Bytes { Bytes::new() }
///     fn response_headers(&self) -> Metadata { Metadata::new() }
///     fn http_status(&self) -> Option<u16> { None }
///     fn last_failure(&self) -> Option<TransportFailure> { None }
///     fn abort(&mut self) {}
/// }
///
/// let client = GrpcWebClient::new(|| Offline);
/// assert_eq!(client.config().user_agent(), grpcweb::client::DEFAULT_USER_AGENT);
/// ```
#[derive(Debug)]
pub struct GrpcWebClient<F> {
    factory: F,
    config: ClientConfig,
}

impl<F: TransportFactory> GrpcWebClient<F> {
    /// Create a client with default settings.
    #[must_use]
    pub fn new(factory: F) -> Self { Self::with_config(factory, ClientConfig::default()) }

    /// Create a client with explicit settings.
    #[must_use]
    pub fn with_config(factory: F, config: ClientConfig) -> Self { Self { factory, config } }

    /// Settings applied to every call.
    #[must_use]
    pub fn config(&self) -> &ClientConfig { &self.config }

    /// Issue a unary call.
    ///
    /// `callback` receives the single response message, or the status of a
    /// failed call. It runs at most once, from inside the stream's
    /// notification handlers. The returned stream must be driven by the
    /// transport's event loop; it also allows the call to be cancelled.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] if the request cannot be serialized or the
    /// transport refuses to send it. `callback` is not invoked in that case.
    pub fn rpc_call<Req, Resp>(
        &self,
        url: &str,
        request: &Req,
        metadata: &Metadata,
        descriptor: &MethodDescriptor<Req, Resp>,
        options: CallOptions,
        callback: impl FnOnce(Result<Resp, Status>) + 'static,
    ) -> Result<ResponseStream<F::Transport, Resp>, ClientError>
    where
        Resp: 'static,
    {
        let span = unary_span(&self.config.tracing, descriptor.name());
        let timing = self.config.tracing.unary_timing;
        let mut stream = self.start_call(url, request, metadata, descriptor, options, span, timing)?;
        unary::attach(&mut stream, callback);
        Ok(stream)
    }

    /// Issue a server-streaming call.
    ///
    /// Register callbacks on the returned stream before the transport's
    /// first notification is delivered to it.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] if the request cannot be serialized or the
    /// transport refuses to send it.
    pub fn server_streaming<Req, Resp>(
        &self,
        url: &str,
        request: &Req,
        metadata: &Metadata,
        descriptor: &MethodDescriptor<Req, Resp>,
        options: CallOptions,
    ) -> Result<ResponseStream<F::Transport, Resp>, ClientError> {
        let span = streaming_span(&self.config.tracing, descriptor.name());
        let timing = self.config.tracing.streaming_timing;
        self.start_call(url, request, metadata, descriptor, options, span, timing)
    }

    #[expect(
        clippy::too_many_arguments,
        reason = "internal entry point shared by both call kinds"
    )]
    fn start_call<Req, Resp>(
        &self,
        url: &str,
        request: &Req,
        metadata: &Metadata,
        descriptor: &MethodDescriptor<Req, Resp>,
        options: CallOptions,
        span: Span,
        timing: bool,
    ) -> Result<ResponseStream<F::Transport, Resp>, ClientError> {
        let started = Instant::now();
        let payload = {
            let _entered = span.enter();
            descriptor
                .serialize_request(request)
                .map_err(ClientError::Serialize)?
        };
        let transport_request = build_request(&self.config, url, &payload, metadata, options)?;
        let mut transport = self.factory.create();
        {
            let _entered = span.enter();
            tracing::debug!(
                url,
                request.bytes = payload.len(),
                format = ?self.config.format,
                "sending grpc-web request"
            );
            if let Err(err) = transport.send(transport_request) {
                tracing::warn!(error = %err, "transport refused request");
                return Err(err.into());
            }
        }
        Ok(ResponseStream::new(
            transport,
            self.config.format,
            self.config.max_frame_length,
            descriptor.response_deserializer(),
            span,
            timing.then_some(started),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{TransportError, TransportFailure, TransportRequest};

    #[derive(Default)]
    struct Refusing;

    impl Transport for Refusing {
        fn send(&mut self, _request: TransportRequest) -> Result<(), TransportError> {
            Err(TransportError::Rejected("no network".into()))
        }

        fn response_body(&self) -> bytes::Bytes { bytes::Bytes::new() }

        fn response_headers(&self) -> Metadata { Metadata::new() }

        fn http_status(&self) -> Option<u16> { None }

        fn last_failure(&self) -> Option<TransportFailure> { None }

        fn abort(&mut self) {}
    }

    fn descriptor() -> MethodDescriptor<Vec<u8>, Vec<u8>> {
        MethodDescriptor::new(
            "test.Service/Method",
            |request: &Vec<u8>| Ok(request.clone()),
            |payload: &[u8]| Ok(Some(payload.to_vec())),
        )
    }

    #[test]
    fn refused_send_is_reported_to_the_caller() {
        let client = GrpcWebClient::new(Refusing::default);
        let called = std::rc::Rc::new(std::cell::Cell::new(false));
        let flag = std::rc::Rc::clone(&called);
        let err = client
            .rpc_call(
                "/test.Service/Method",
                &vec![1, 2, 3],
                &Metadata::new(),
                &descriptor(),
                CallOptions::default(),
                move |_| flag.set(true),
            )
            .expect_err("transport refuses");
        assert!(matches!(err, ClientError::Transport(TransportError::Rejected(_))));
        assert!(!called.get());
    }

    #[test]
    fn serializer_failure_is_reported_to_the_caller() {
        let client = GrpcWebClient::new(Refusing::default);
        let failing = MethodDescriptor::<(), ()>::new(
            "test.Service/Broken",
            |(): &()| Err("cannot encode".into()),
            |_: &[u8]| Ok(None),
        );
        let err = client
            .server_streaming(
                "/test.Service/Broken",
                &(),
                &Metadata::new(),
                &failing,
                CallOptions::default(),
            )
            .expect_err("serializer fails");
        assert!(matches!(err, ClientError::Serialize(_)));
    }
}
