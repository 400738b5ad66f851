//! Optional convenience imports for common grpc-web workflows.
//!
//! This module is intentionally small and focused on high-frequency types.
//! Prefer importing specialised APIs directly from their owning modules.
//!
//! # Examples
//!
//! ```rust
//! use grpcweb::prelude::*;
//!
//! let frames = FrameParser::new().parse(&encode_frame(b"hi")).expect("valid frame");
//! assert_eq!(frames, vec![Frame::Data("hi".into())]);
//! ```

pub use crate::{
    client::{CallOptions, ClientError, GrpcWebClient, MethodDescriptor, ResponseStream},
    codec::{Frame, FrameParser, encode_frame},
    config::WireFormat,
    message::Message,
    metadata::Metadata,
    status::{Status, StatusCode},
    transport::{Transport, TransportFailure, TransportRequest},
};
