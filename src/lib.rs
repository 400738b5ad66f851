#![doc(html_root_url = "https://docs.rs/grpcweb/latest")]
//! Public API for the `grpcweb` library.
//!
//! This crate implements the client side of gRPC-Web: the length-prefixed
//! frame codec, an incremental frame parser that tolerates arbitrary chunk
//! boundaries, and a response stream controller that turns transport
//! notifications into `data`/`status`/`error`/`end` events.
//!
//! The HTTP transport itself is supplied by the embedding environment
//! through the [`transport::Transport`] trait.

pub mod byte_order;
pub mod client;
pub mod codec;
pub mod config;
pub mod message;
pub mod metadata;
pub mod metrics;
pub mod prelude;
pub mod status;
pub mod transport;

pub use client::{
    CallOptions,
    ClientError,
    GrpcWebClient,
    GrpcWebClientBuilder,
    MethodDescriptor,
    ResponseStream,
    StreamEvent,
};
pub use codec::{Frame, FrameParser, FrameTag, GrpcWebCodec, ParseError, encode_frame};
pub use config::WireFormat;
pub use metadata::Metadata;
pub use metrics::{FRAMES_DECODED, PARSE_ERRORS, STREAMS_FINISHED};
pub use status::{Status, StatusCode};
pub use transport::{Transport, TransportFactory, TransportFailure};
