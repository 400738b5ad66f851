//! Response stream controller.
//!
//! [`ResponseStream`] turns transport notifications into application events.
//! The environment's event loop calls [`on_transport_progress`] whenever the
//! response body grows and [`on_transport_complete`] once the request has
//! finished. Each notification is handled synchronously: new bytes go
//! through the frame parser, data frames are deserialized and handed to the
//! `data` callback, and the trailer frame becomes a [`Status`] for the
//! `status` callback.
//!
//! Exactly one terminal event fires per call: `end` (possibly preceded by
//! `status`) or `error`. After it, or after [`cancel`], the stream is closed
//! and further notifications are ignored.
//!
//! [`on_transport_progress`]: ResponseStream::on_transport_progress
//! [`on_transport_complete`]: ResponseStream::on_transport_complete
//! [`cancel`]: ResponseStream::cancel

use std::{borrow::Cow, fmt, time::Instant};

use tracing::Span;

use super::{
    callbacks::{StreamCallbacks, StreamEvent},
    method::ResponseDeserializer,
    tracing_helpers::emit_timing_event,
};
use crate::{
    codec::{Frame, FrameParser, ParseError, TextDecoder},
    config::WireFormat,
    metadata::parse_header_block,
    metrics::{self, Outcome},
    status::{Status, StatusCode},
    transport::{Transport, TransportFailure},
};

/// Streaming view of one call's response.
///
/// Created by [`GrpcWebClient::server_streaming`] and
/// [`GrpcWebClient::rpc_call`]. The stream owns the call's transport and
/// frame parser.
///
/// # Examples
///
/// ```
/// use bytes::Bytes;
/// use grpcweb::{
///     client::{CallOptions, GrpcWebClientBuilder, MethodDescriptor},
///     config::WireFormat,
///     metadata::Metadata,
///     transport::{Transport, TransportError, TransportFailure, TransportRequest},
/// };
///
/// #[derive(Default)]
/// struct Canned {
///     body: Vec<u8>,
/// }
///
/// impl Transport for Canned {
///     fn send(&mut self, _request: TransportRequest) -> Result<(), TransportError> {
///         self.body = vec![0x00, 0, 0, 0, 2, b'h', b'i', 0x80, 0, 0, 0, 15];
///         self.body.extend_from_slice(b"grpc-status:0\r\n");
///         Ok(())
///     }
///     fn response_body(&self) -> Bytes { Bytes::copy_from_slice(&self.body) }
///     fn response_headers(&self) -> Metadata { Metadata::new() }
///     fn http_status(&self) -> Option<u16> { Some(200) }
///     fn last_failure(&self) -> Option<TransportFailure> { None }
///     fn abort(&mut self) {}
/// }
///
/// let client = GrpcWebClientBuilder::new()
///     .format(WireFormat::Binary)
///     .build(Canned::default);
/// let descriptor = MethodDescriptor::<(), String>::new(
///     "echo.Echo/Stream",
///     |_: &()| Ok(Vec::new()),
///     |payload: &[u8]| Ok(Some(String::from_utf8(payload.to_vec())?)),
/// );
/// let mut stream = client
///     .server_streaming(
///         "/echo.Echo/Stream",
///         &(),
///         &Metadata::new(),
///         &descriptor,
///         CallOptions::default(),
///     )
///     .expect("call starts");
/// stream.on_data(|message| assert_eq!(message, "hi"));
/// stream.on_transport_progress();
/// stream.on_transport_complete();
/// assert!(stream.is_closed());
/// ```
///
/// [`GrpcWebClient::server_streaming`]: super::GrpcWebClient::server_streaming
/// [`GrpcWebClient::rpc_call`]: super::GrpcWebClient::rpc_call
pub struct ResponseStream<T: Transport, R> {
    transport: T,
    format: WireFormat,
    parser: FrameParser,
    text: TextDecoder,
    deserialize: ResponseDeserializer<R>,
    callbacks: StreamCallbacks<R>,
    consumed: usize,
    closed: bool,
    status: Option<Status>,
    frames_received: usize,
    span: Span,
    started: Option<Instant>,
}

impl<T: Transport, R> ResponseStream<T, R> {
    pub(crate) fn new(
        transport: T,
        format: WireFormat,
        max_frame_length: Option<u32>,
        deserialize: ResponseDeserializer<R>,
        span: Span,
        started: Option<Instant>,
    ) -> Self {
        let parser = max_frame_length.map_or_else(FrameParser::new, FrameParser::with_max_frame_length);
        Self {
            transport,
            format,
            parser,
            text: TextDecoder::new(),
            deserialize,
            callbacks: StreamCallbacks::default(),
            consumed: 0,
            closed: false,
            status: None,
            frames_received: 0,
            span,
            started,
        }
    }

    /// Register the callback for response messages.
    ///
    /// Messages that deserialize to nothing are not delivered.
    pub fn on_data(&mut self, callback: impl FnMut(R) + 'static) -> &mut Self {
        self.callbacks.data = Some(Box::new(callback));
        self
    }

    /// Register the callback for the trailer status.
    pub fn on_status(&mut self, callback: impl FnMut(Status) + 'static) -> &mut Self {
        self.callbacks.status = Some(Box::new(callback));
        self
    }

    /// Register the callback for call failure.
    pub fn on_error(&mut self, callback: impl FnMut(Status) + 'static) -> &mut Self {
        self.callbacks.error = Some(Box::new(callback));
        self
    }

    /// Register the callback for normal stream end.
    pub fn on_end(&mut self, callback: impl FnMut() + 'static) -> &mut Self {
        self.callbacks.end = Some(Box::new(callback));
        self
    }

    /// Whether a callback is registered for `event`.
    #[must_use]
    pub fn has_listener(&self, event: StreamEvent) -> bool { self.callbacks.is_registered(event) }

    /// Drop the callback registered for `event`.
    pub fn remove_listener(&mut self, event: StreamEvent) -> &mut Self {
        self.callbacks.clear(event);
        self
    }

    /// Whether the stream has reached a terminal event or been cancelled.
    #[must_use]
    pub fn is_closed(&self) -> bool { self.closed }

    /// Number of data frames parsed so far.
    #[must_use]
    pub fn frames_received(&self) -> usize { self.frames_received }

    /// Status delivered by the trailer or trailers-only headers, if any.
    #[must_use]
    pub fn status(&self) -> Option<&Status> { self.status.as_ref() }

    /// The transport carrying this call.
    #[must_use]
    pub fn transport(&self) -> &T { &self.transport }

    /// Abort the call.
    ///
    /// The transport is aborted immediately and every callback is released;
    /// later notifications are ignored.
    pub fn cancel(&mut self) {
        if self.closed {
            return;
        }
        let span = self.span.clone();
        let _entered = span.enter();
        self.transport.abort();
        self.close(Outcome::Cancelled);
        tracing::debug!(
            stream.frames_received = self.frames_received,
            "stream cancelled"
        );
    }

    /// Handle growth of the response body.
    ///
    /// Only the bytes appended since the previous notification are parsed.
    pub fn on_transport_progress(&mut self) {
        if self.closed {
            tracing::trace!("progress ignored on closed stream");
            return;
        }
        let span = self.span.clone();
        let _entered = span.enter();
        self.consume_body();
    }

    /// Handle completion of the transport.
    ///
    /// Any unread body bytes are parsed first. If no status has been
    /// delivered and the transport failed, `error` fires with a status
    /// derived from the failure; otherwise `end` fires.
    pub fn on_transport_complete(&mut self) {
        if self.closed {
            return;
        }
        let span = self.span.clone();
        let _entered = span.enter();
        self.consume_body();
        if self.closed {
            return;
        }
        if self.format == WireFormat::Json {
            self.deliver_json_body();
            if self.closed {
                return;
            }
        }
        if self.status.is_none() && self.resolve_missing_status() {
            return;
        }
        if !self.parser.is_idle() {
            tracing::debug!(
                position = self.parser.position(),
                "response ended inside a frame"
            );
        }
        self.finish();
    }

    fn consume_body(&mut self) {
        let body = self.transport.response_body();
        let Some(delta) = body.get(self.consumed..) else {
            tracing::warn!(
                consumed = self.consumed,
                body.bytes = body.len(),
                "transport body shrank; ignoring"
            );
            return;
        };
        if delta.is_empty() {
            return;
        }
        self.consumed = body.len();
        if !self.format.is_framed() {
            return;
        }

        let chunk = if self.format == WireFormat::Text {
            match self.text.feed(delta) {
                Ok(decoded) => Cow::Owned(decoded),
                Err(err) => return self.fail_parse(&err),
            }
        } else {
            Cow::Borrowed(delta)
        };
        match self.parser.parse(&chunk) {
            Ok(frames) => self.dispatch(frames),
            Err(err) => self.fail_parse(&err),
        }
    }

    fn dispatch(&mut self, frames: Vec<Frame>) {
        for frame in frames {
            if self.closed {
                break;
            }
            metrics::inc_frames(frame.tag());
            match frame {
                Frame::Data(payload) => self.dispatch_data(&payload),
                Frame::Trailer(payload) => self.dispatch_trailer(&payload),
            }
        }
    }

    fn dispatch_data(&mut self, payload: &[u8]) {
        self.frames_received = self.frames_received.saturating_add(1);
        tracing::debug!(
            frame.bytes = payload.len(),
            stream.frames_received = self.frames_received,
            "stream frame received"
        );
        match (self.deserialize)(payload) {
            Ok(Some(message)) => {
                if let Some(callback) = self.callbacks.data.as_mut() {
                    callback(message);
                }
            }
            Ok(None) => tracing::trace!("empty message skipped"),
            Err(err) => self.fail(Status::new(
                StatusCode::Internal,
                format!("failed to deserialize response: {err}"),
            )),
        }
    }

    fn dispatch_trailer(&mut self, payload: &[u8]) {
        if self.status.is_some() {
            tracing::debug!("duplicate trailer frame ignored");
            return;
        }
        let status = Status::from_trailers(parse_header_block(payload));
        self.deliver_status(status);
    }

    fn deliver_status(&mut self, status: Status) {
        self.span.record("status.code", status.code.as_i32());
        tracing::debug!(status.code = %status.code, "stream status received");
        self.status = Some(status.clone());
        if let Some(callback) = self.callbacks.status.as_mut() {
            callback(status);
        }
    }

    fn deliver_json_body(&mut self) {
        let succeeded = self.transport.last_failure().is_none()
            && self
                .transport
                .http_status()
                .is_none_or(|status| (200..300).contains(&status));
        let body = self.transport.response_body();
        if !succeeded || body.is_empty() {
            return;
        }
        self.dispatch_data(&body);
    }

    /// Settle a call that completed without a trailer. Returns `true` if the
    /// stream was closed with an error.
    fn resolve_missing_status(&mut self) -> bool {
        let failure = self.transport.last_failure().or_else(|| {
            self.transport
                .http_status()
                .filter(|status| !(200..300).contains(status))
                .map(TransportFailure::Http)
        });
        if let Some(failure) = failure.as_ref().filter(|f| !matches!(f, TransportFailure::Http(_))) {
            self.fail(failure.to_status());
            return true;
        }
        if let Some(status) = Status::from_headers(&self.transport.response_headers()) {
            self.deliver_status(status);
            return false;
        }
        if let Some(failure) = failure {
            self.fail(failure.to_status());
            return true;
        }
        false
    }

    fn fail_parse(&mut self, err: &ParseError) {
        self.fail(Status::new(
            StatusCode::Internal,
            format!("malformed response body: {err}"),
        ));
    }

    fn fail(&mut self, status: Status) {
        self.span.record("status.code", status.code.as_i32());
        tracing::warn!(
            status.code = %status.code,
            status.details = %status.details,
            stream.frames_received = self.frames_received,
            "stream failed"
        );
        let mut callbacks = self.close(Outcome::Error);
        if let Some(callback) = callbacks.error.as_mut() {
            callback(status);
        }
    }

    fn finish(&mut self) {
        tracing::debug!(
            stream.frames_received = self.frames_received,
            "stream ended"
        );
        let mut callbacks = self.close(Outcome::Ok);
        if let Some(callback) = callbacks.end.as_mut() {
            callback();
        }
    }

    /// Mark the stream closed and hand back the released callbacks.
    fn close(&mut self, outcome: Outcome) -> StreamCallbacks<R> {
        self.closed = true;
        metrics::inc_streams_finished(outcome);
        emit_timing_event(self.started.take());
        std::mem::take(&mut self.callbacks)
    }
}

impl<T: Transport, R> fmt::Debug for ResponseStream<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseStream")
            .field("format", &self.format)
            .field("parser", &self.parser.state())
            .field("consumed", &self.consumed)
            .field("closed", &self.closed)
            .field("status", &self.status)
            .field("frames_received", &self.frames_received)
            .field("callbacks", &self.callbacks)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "response_stream_tests.rs"]
mod tests;
