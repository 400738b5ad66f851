//! Utilities for driving a [`ResponseStream`](grpcweb::client::ResponseStream)
//! without a network during tests.
//!
//! [`MockTransport`] stands in for a browser-style request object. The test
//! keeps a [`MockHandle`] to the same state, appends response bytes with it,
//! then notifies the stream exactly as an event loop would.
//!
//! ```rust
//! use grpcweb::{
//!     client::{CallOptions, GrpcWebClientBuilder, MethodDescriptor},
//!     config::WireFormat,
//!     metadata::Metadata,
//! };
//! use grpcweb_testing::{EventLog, MockHandle, data_frame, trailer_frame};
//!
//! let handle = MockHandle::new();
//! let client = GrpcWebClientBuilder::new()
//!     .format(WireFormat::Binary)
//!     .build(handle.factory());
//! let descriptor = MethodDescriptor::<(), Vec<u8>>::new(
//!     "test.Service/Stream",
//!     |(): &()| Ok(Vec::new()),
//!     |payload: &[u8]| Ok(Some(payload.to_vec())),
//! );
//! let mut stream = client
//!     .server_streaming("/test.Service/Stream", &(), &Metadata::new(), &descriptor, CallOptions::default())
//!     .expect("call starts");
//! let log = EventLog::attach(&mut stream);
//!
//! handle.push_body(data_frame(b"hi"));
//! handle.push_body(trailer_frame(0, ""));
//! stream.on_transport_progress();
//! stream.on_transport_complete();
//! assert_eq!(log.len(), 3);
//! ```

pub mod frames;
pub mod recorder;
pub mod transport;

pub use frames::{data_frame, text_body, trailer_block, trailer_frame};
pub use recorder::{Event, EventLog};
pub use transport::{MockHandle, MockTransport, mock_handle};
