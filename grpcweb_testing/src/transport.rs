//! In-memory [`Transport`] with a test-side control handle.

use std::{cell::RefCell, rc::Rc};

use bytes::{Bytes, BytesMut};
use grpcweb::{
    metadata::Metadata,
    transport::{Transport, TransportError, TransportFailure, TransportRequest},
};
use rstest::fixture;

#[derive(Debug, Default)]
struct MockState {
    body: BytesMut,
    headers: Metadata,
    http_status: Option<u16>,
    failure: Option<TransportFailure>,
    refusal: Option<String>,
    sent: Vec<TransportRequest>,
    aborts: usize,
}

/// Transport whose response is scripted through a [`MockHandle`].
#[derive(Debug, Clone)]
pub struct MockTransport {
    state: Rc<RefCell<MockState>>,
}

impl Transport for MockTransport {
    fn send(&mut self, request: TransportRequest) -> Result<(), TransportError> {
        let mut state = self.state.borrow_mut();
        if let Some(reason) = state.refusal.clone() {
            return Err(TransportError::Rejected(reason));
        }
        state.sent.push(request);
        Ok(())
    }

    fn response_body(&self) -> Bytes { Bytes::copy_from_slice(&self.state.borrow().body) }

    fn response_headers(&self) -> Metadata { self.state.borrow().headers.clone() }

    fn http_status(&self) -> Option<u16> { self.state.borrow().http_status }

    fn last_failure(&self) -> Option<TransportFailure> { self.state.borrow().failure.clone() }

    fn abort(&mut self) { self.state.borrow_mut().aborts += 1; }
}

/// Test-side view of every [`MockTransport`] it creates.
///
/// All transports created by one handle share its state, so a handle is
/// meant for one call at a time.
#[derive(Debug, Clone)]
pub struct MockHandle {
    state: Rc<RefCell<MockState>>,
}

impl Default for MockHandle {
    fn default() -> Self { Self::new() }
}

impl MockHandle {
    /// Create a handle for a transport that answers HTTP 200.
    #[must_use]
    pub fn new() -> Self {
        let state = MockState {
            http_status: Some(200),
            ..MockState::default()
        };
        Self {
            state: Rc::new(RefCell::new(state)),
        }
    }

    /// A transport bound to this handle.
    #[must_use]
    pub fn transport(&self) -> MockTransport {
        MockTransport {
            state: Rc::clone(&self.state),
        }
    }

    /// Factory suitable for [`GrpcWebClient::new`](grpcweb::client::GrpcWebClient::new).
    #[must_use]
    pub fn factory(&self) -> impl Fn() -> MockTransport + use<> {
        let handle = self.clone();
        move || handle.transport()
    }

    /// Append bytes to the response body.
    pub fn push_body(&self, bytes: impl AsRef<[u8]>) {
        self.state.borrow_mut().body.extend_from_slice(bytes.as_ref());
    }

    /// Set the HTTP status reported by the transport.
    pub fn set_http_status(&self, status: Option<u16>) { self.state.borrow_mut().http_status = status; }

    /// Add a response header.
    pub fn set_header(&self, key: &str, value: &str) {
        self.state.borrow_mut().headers.insert(key, value);
    }

    /// Record a transport failure.
    pub fn fail(&self, failure: TransportFailure) { self.state.borrow_mut().failure = Some(failure); }

    /// Make every later `send` fail with `reason`.
    pub fn refuse_send(&self, reason: &str) {
        self.state.borrow_mut().refusal = Some(reason.to_owned());
    }

    /// Requests sent so far.
    #[must_use]
    pub fn sent(&self) -> Vec<TransportRequest> { self.state.borrow().sent.clone() }

    /// Number of times `abort` was called.
    #[must_use]
    pub fn aborts(&self) -> usize { self.state.borrow().aborts }
}

/// Fresh [`MockHandle`] for rstest cases.
#[allow(
    unused_braces,
    reason = "rustc false positive for single line rstest fixtures"
)]
#[fixture]
pub fn mock_handle() -> MockHandle { MockHandle::new() }
